use std::{fs, ops::Range, path::Path};

use log::{info, warn};

use crate::{
    chr::{self, TILE_SIZE},
    error::Error,
    frame::Frame,
};

/// A CHR-ROM image held in memory, with a movable editing window.
///
/// The window covers one tile, or two tiles in long sprite mode, starting at
/// `offset`. Frames loaded from the window are written back with `commit`
/// before the window moves.
#[derive(Debug)]
pub struct ChrFile {
    data: Vec<u8>,
    offset: usize,
    long: bool,
}

impl ChrFile {
    pub fn open(path: &Path) -> Result<ChrFile, Error> {
        let data = fs::read(path)?;
        info!("Loaded {} bytes from {}", data.len(), path.display());
        Ok(ChrFile::from_bytes(data))
    }

    pub fn from_bytes(data: Vec<u8>) -> ChrFile {
        ChrFile {
            data,
            offset: 0,
            long: false,
        }
    }

    /// Packs an unpacked pixel file (64 bytes per tile).
    pub fn from_pixels(pixels: &[u8]) -> Result<ChrFile, Error> {
        Ok(ChrFile::from_bytes(chr::encode(pixels)?))
    }

    /// Starting offset as given on the command line. Offsets that leave no
    /// room for the window fall back to 0.
    pub fn with_offset(mut self, offset: usize, long: bool) -> ChrFile {
        self.long = long;
        if self.fits(offset) {
            self.offset = offset;
        } else {
            warn!("offset {:#x} is past the end of the file, starting at 0", offset);
            self.offset = 0;
        }
        self
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn tile_count(&self) -> usize {
        self.data.len() / TILE_SIZE
    }

    /// Bytes after the last whole tile.
    pub fn trailing_bytes(&self) -> usize {
        self.data.len() % TILE_SIZE
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_long(&self) -> bool {
        self.long
    }

    pub fn window_len(&self) -> usize {
        if self.long {
            2 * TILE_SIZE
        } else {
            TILE_SIZE
        }
    }

    fn fits(&self, offset: usize) -> bool {
        offset
            .checked_add(self.window_len())
            .is_some_and(|end| end <= self.data.len())
    }

    fn window(&self) -> Result<Range<usize>, Error> {
        if !self.fits(self.offset) {
            return Err(Error::OffsetOutOfRange {
                offset: self.offset,
                len: self.data.len(),
            });
        }
        Ok(self.offset..self.offset + self.window_len())
    }

    pub fn seek(&mut self, offset: usize) -> Result<(), Error> {
        if !self.fits(offset) {
            return Err(Error::OffsetOutOfRange {
                offset,
                len: self.data.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    /// Switches between single and double height windows. The offset is
    /// reset to 0 when the new window no longer fits.
    pub fn set_long(&mut self, long: bool) {
        self.long = long;
        if !self.fits(self.offset) {
            warn!("window does not fit at {:#x}, moving to 0", self.offset);
            self.offset = 0;
        }
    }

    /// Decodes the current window.
    pub fn load(&self) -> Result<Frame, Error> {
        let range = self.window()?;
        Frame::from_pixels(chr::decode(&self.data[range])?)
    }

    /// Encodes `frame` over the current window.
    pub fn commit(&mut self, frame: &Frame) -> Result<(), Error> {
        let range = self.window()?;
        chr::encode_into(frame.data(), &mut self.data[range])?;
        Ok(())
    }

    /// Commits `frame`, advances one window and loads it. Wraps to the start
    /// of the file after the last window.
    pub fn next_tile(&mut self, frame: &Frame) -> Result<Frame, Error> {
        self.commit(frame)?;
        let offset = self.offset + self.window_len();
        if self.fits(offset) {
            self.offset = offset;
        } else {
            warn!("reached end of file, wrapping to 0");
            self.offset = 0;
        }
        self.load()
    }

    /// Commits `frame`, steps back one window and loads it. Wraps to the
    /// last window of the file before the start.
    pub fn prev_tile(&mut self, frame: &Frame) -> Result<Frame, Error> {
        self.commit(frame)?;
        match self.offset.checked_sub(self.window_len()) {
            Some(offset) => self.offset = offset,
            None => {
                warn!("reached start of file, wrapping to the end");
                self.offset = self.data.len().saturating_sub(self.window_len());
            }
        }
        self.load()
    }

    /// Unpacks the whole file to one byte per pixel.
    pub fn decode_all(&self) -> Result<Vec<u8>, Error> {
        chr::decode(&self.data)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        fs::write(path, &self.data)?;
        info!("Saved {} bytes to {}", self.data.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chr::tests::{TEST_TILE, TEST_TILE_DECODED};

    fn rom(tiles: usize) -> ChrFile {
        let mut data = Vec::new();
        for i in 0..tiles {
            data.extend_from_slice(&TEST_TILE);
            // tag each tile so windows can be told apart
            data[i * TILE_SIZE] = i as u8;
        }
        ChrFile::from_bytes(data)
    }

    #[test]
    fn test_counts() {
        let mut data = TEST_TILE.repeat(3);
        data.extend_from_slice(&[1, 2, 3]);
        let file = ChrFile::from_bytes(data);
        assert_eq!(file.len(), 51);
        assert_eq!(file.tile_count(), 3);
        assert_eq!(file.trailing_bytes(), 3);
        assert!(!file.is_empty());
    }

    #[test]
    fn test_load_window() {
        let file = ChrFile::from_bytes(TEST_TILE.repeat(2));
        let frame = file.load().unwrap();
        assert_eq!(frame.height(), 8);
        assert_eq!(frame.data(), &TEST_TILE_DECODED);

        let file = file.with_offset(0, true);
        let frame = file.load().unwrap();
        assert_eq!(frame.height(), 16);
        assert_eq!(frame.get_pixel(5, 10).unwrap(), 3);
    }

    #[test]
    fn test_unaligned_offset() {
        let file = rom(3).with_offset(8, false);
        assert_eq!(file.offset(), 8);
        let frame = file.load().unwrap();
        let expected = chr::decode(&file.data()[8..24]).unwrap();
        assert_eq!(frame.data(), expected.as_slice());
    }

    #[test]
    fn test_offset_sanity_check() {
        let file = rom(2).with_offset(0x40, false);
        assert_eq!(file.offset(), 0);
        let file = rom(2).with_offset(16, true);
        assert_eq!(file.offset(), 0);
        let file = rom(2).with_offset(16, false);
        assert_eq!(file.offset(), 16);
    }

    #[test]
    fn test_seek() {
        let mut file = rom(2);
        file.seek(16).unwrap();
        assert_eq!(file.offset(), 16);
        assert!(matches!(
            file.seek(17),
            Err(Error::OffsetOutOfRange { offset: 17, len: 32 })
        ));
        assert_eq!(file.offset(), 16);
    }

    #[test]
    fn test_commit() {
        let mut file = rom(2).with_offset(16, false);
        let mut frame = file.load().unwrap();
        frame.write_pixel(0, 0, 3).unwrap();
        file.commit(&frame).unwrap();

        // plane bits for pixel (0, 0) are the MSBs of bytes 0 and 8
        assert_eq!(file.data()[16] & 0x80, 0x80);
        assert_eq!(file.data()[24] & 0x80, 0x80);
        assert_eq!(&file.data()[..16], &rom(2).data()[..16]);
        assert_eq!(file.load().unwrap(), frame);
    }

    #[test]
    fn test_commit_oversized_frame() {
        let mut file = rom(2);
        let frame = Frame::new(2);
        assert!(matches!(
            file.commit(&frame),
            Err(Error::BufferTooSmall {
                required: 32,
                actual: 16
            })
        ));
        assert_eq!(file.data(), rom(2).data());
    }

    #[test]
    fn test_next_and_prev_wrap() {
        let mut file = rom(3);
        let frame = file.load().unwrap();

        let frame = file.next_tile(&frame).unwrap();
        assert_eq!(file.offset(), 16);
        let frame = file.next_tile(&frame).unwrap();
        assert_eq!(file.offset(), 32);
        let frame = file.next_tile(&frame).unwrap();
        assert_eq!(file.offset(), 0);

        let frame = file.prev_tile(&frame).unwrap();
        assert_eq!(file.offset(), 32);
        let frame = file.prev_tile(&frame).unwrap();
        assert_eq!(file.offset(), 16);
        let expected = chr::decode(&rom(3).data()[16..32]).unwrap();
        assert_eq!(frame.data(), expected.as_slice());

        // untouched frames leave the file as it was
        assert_eq!(file.data(), rom(3).data());
    }

    #[test]
    fn test_next_commits_edits() {
        let mut file = rom(2);
        let mut frame = file.load().unwrap();
        frame.fill(0);
        let _ = file.next_tile(&frame).unwrap();
        assert!(file.data()[..16].iter().all(|&b| b == 0));
        assert_eq!(&file.data()[16..], &rom(2).data()[16..]);
    }

    #[test]
    fn test_long_mode_steps() {
        let mut file = rom(5).with_offset(0, true);
        let frame = file.load().unwrap();
        let frame = file.next_tile(&frame).unwrap();
        assert_eq!(file.offset(), 32);
        let frame = file.next_tile(&frame).unwrap();
        assert_eq!(file.offset(), 0);
        let _ = file.prev_tile(&frame).unwrap();
        assert_eq!(file.offset(), 48);
    }

    #[test]
    fn test_set_long() {
        let mut file = rom(2).with_offset(16, false);
        file.set_long(true);
        assert!(file.is_long());
        assert_eq!(file.offset(), 0);
        assert_eq!(file.load().unwrap().tile_count(), 2);
    }

    #[test]
    fn test_empty_file() {
        let file = ChrFile::from_bytes(Vec::new()).with_offset(0, false);
        assert!(file.is_empty());
        assert!(matches!(
            file.load(),
            Err(Error::OffsetOutOfRange { offset: 0, len: 0 })
        ));
    }

    #[test]
    fn test_decode_all() {
        let file = ChrFile::from_bytes(TEST_TILE.repeat(2));
        let pixels = file.decode_all().unwrap();
        assert_eq!(pixels, TEST_TILE_DECODED.repeat(2));
        assert_eq!(ChrFile::from_pixels(&pixels).unwrap().data(), file.data());

        let mut truncated = TEST_TILE.to_vec();
        truncated.push(0);
        assert!(matches!(
            ChrFile::from_bytes(truncated).decode_all(),
            Err(Error::InvalidLength { len: 17, unit: 16 })
        ));
    }

    #[test]
    fn test_save_and_open() {
        let path = std::env::temp_dir().join(format!("famisprite-{}.chr", std::process::id()));
        let file = rom(2);
        file.save(&path).unwrap();
        let reopened = ChrFile::open(&path).unwrap();
        assert_eq!(reopened.data(), file.data());
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(ChrFile::open(&path), Err(Error::IOError(_))));
    }
}
