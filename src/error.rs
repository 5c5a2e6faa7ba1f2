use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid length: {len} is not a multiple of {unit}")]
    InvalidLength { len: usize, unit: usize },
    #[error("buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },
    #[error("unable to allocate {0} bytes")]
    AllocationFailure(usize),
    #[error("pixel ({x}, {y}) is outside of the buffer")]
    PixelOutOfBounds { x: usize, y: usize },
    #[error("offset {offset:#x} is out of range for {len} bytes")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    #[error("{0}")]
    IOError(#[from] std::io::Error),
}
