//! Planar 2bpp CHR tile codec.
//!
//! A packed tile is 16 bytes: eight bytes of plane 1 (the low bit of every
//! pixel) followed by eight bytes of plane 2 (the high bit). Each plane byte
//! holds one row, with the leftmost pixel in the most significant bit. A
//! decoded tile is 64 bytes, one color index (0-3) per pixel, row-major.

use log::debug;

use crate::error::Error;

/// Bits per pixel.
pub const BPP: usize = 2;
/// Pixels per tile row (and rows per tile).
pub const TILE_LEN: usize = 8;
/// Decoded bytes per tile.
pub const TILE_PIXELS: usize = TILE_LEN * TILE_LEN;
/// Packed bytes per tile.
pub const TILE_SIZE: usize = TILE_PIXELS * BPP / 8;
/// Highest color index; also the mask applied to stored indices.
pub const MAX_COLOR_INDEX: u8 = 3;

/// Extracts the color index of column `index` from a pair of plane bytes.
#[inline]
pub fn decode_pixel(p1: u8, p2: u8, index: usize) -> u8 {
    let shift = TILE_LEN - 1 - index;
    ((p1 >> shift) & 1) | (((p2 >> shift) & 1) << 1)
}

/// Shifts both planes left once and appends `color` to them.
#[inline]
pub fn encode_pixel(p1: &mut u8, p2: &mut u8, color: u8) {
    *p1 = (*p1 << 1) | (color & 0x1);
    *p2 = (*p2 << 1) | ((color & 0x2) >> 1);
}

fn decode_tile_slice(src: &[u8], dst: &mut [u8]) {
    for row in 0..TILE_LEN {
        let p1 = src[row];
        let p2 = src[row + TILE_LEN];
        for col in 0..TILE_LEN {
            dst[row * TILE_LEN + col] = decode_pixel(p1, p2, col);
        }
    }
}

fn encode_tile_slice(src: &[u8], dst: &mut [u8]) {
    for (row, pixels) in src.chunks_exact(TILE_LEN).enumerate() {
        let mut p1 = 0;
        let mut p2 = 0;
        for &color in pixels {
            encode_pixel(&mut p1, &mut p2, color);
        }
        dst[row] = p1;
        dst[row + TILE_LEN] = p2;
    }
}

/// Decodes a single tile, returning the number of pixels written.
pub fn decode_tile(src: &[u8; TILE_SIZE], dst: &mut [u8; TILE_PIXELS]) -> usize {
    decode_tile_slice(src, dst);
    TILE_PIXELS
}

/// Encodes a single tile, returning the number of bytes written.
///
/// Only the low two bits of each pixel are used.
pub fn encode_tile(src: &[u8; TILE_PIXELS], dst: &mut [u8; TILE_SIZE]) -> usize {
    encode_tile_slice(src, dst);
    TILE_SIZE
}

/// Size of the pixel buffer that `len` packed bytes decode to.
pub fn decoded_len(len: usize) -> Result<usize, Error> {
    if len % TILE_SIZE != 0 {
        return Err(Error::InvalidLength {
            len,
            unit: TILE_SIZE,
        });
    }
    Ok(len / TILE_SIZE * TILE_PIXELS)
}

/// Size of the packed buffer that `len` pixels encode to.
pub fn encoded_len(len: usize) -> Result<usize, Error> {
    if len % TILE_PIXELS != 0 {
        return Err(Error::InvalidLength {
            len,
            unit: TILE_PIXELS,
        });
    }
    Ok(len / TILE_PIXELS * TILE_SIZE)
}

/// Decodes every tile of `src` into the front of `dst`.
///
/// Nothing is written unless `src` is a whole number of tiles and `dst` is
/// large enough to hold all of them. Returns the decoded length.
pub fn decode_into(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    let required = decoded_len(src.len())?;
    if dst.len() < required {
        return Err(Error::BufferTooSmall {
            required,
            actual: dst.len(),
        });
    }

    debug!("decoding {} tiles", src.len() / TILE_SIZE);
    for (packed, pixels) in src
        .chunks_exact(TILE_SIZE)
        .zip(dst.chunks_exact_mut(TILE_PIXELS))
    {
        decode_tile_slice(packed, pixels);
    }

    Ok(required)
}

/// Encodes every tile of `src` into the front of `dst`.
///
/// Same contract as [`decode_into`], in the other direction. Returns the
/// encoded length.
pub fn encode_into(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    let required = encoded_len(src.len())?;
    if dst.len() < required {
        return Err(Error::BufferTooSmall {
            required,
            actual: dst.len(),
        });
    }

    debug!("encoding {} tiles", src.len() / TILE_PIXELS);
    for (pixels, packed) in src
        .chunks_exact(TILE_PIXELS)
        .zip(dst.chunks_exact_mut(TILE_SIZE))
    {
        encode_tile_slice(pixels, packed);
    }

    Ok(required)
}

fn alloc(len: usize) -> Result<Vec<u8>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure(len))?;
    v.resize(len, 0);
    Ok(v)
}

/// Decodes `src` into a newly allocated pixel buffer.
pub fn decode(src: &[u8]) -> Result<Vec<u8>, Error> {
    let mut dst = alloc(decoded_len(src.len())?)?;
    decode_into(src, &mut dst)?;
    Ok(dst)
}

/// Encodes `src` into a newly allocated packed buffer.
pub fn encode(src: &[u8]) -> Result<Vec<u8>, Error> {
    let mut dst = alloc(encoded_len(src.len())?)?;
    encode_into(src, &mut dst)?;
    Ok(dst)
}

fn pixel_index(len: usize, x: usize, y: usize) -> Result<usize, Error> {
    if x >= TILE_LEN {
        return Err(Error::PixelOutOfBounds { x, y });
    }
    y.checked_mul(TILE_LEN)
        .and_then(|i| i.checked_add(x))
        .filter(|&i| i < len)
        .ok_or(Error::PixelOutOfBounds { x, y })
}

/// Reads the pixel at `x`/`y` of a decoded buffer eight pixels wide.
pub fn get_pixel(data: &[u8], x: usize, y: usize) -> Result<u8, Error> {
    Ok(data[pixel_index(data.len(), x, y)?])
}

/// Stores `index` at `x`/`y`, keeping only its low two bits.
pub fn set_pixel(data: &mut [u8], x: usize, y: usize, index: u8) -> Result<(), Error> {
    let i = pixel_index(data.len(), x, y)?;
    data[i] = index & MAX_COLOR_INDEX;
    Ok(())
}

/// Sets every pixel of `data` to `index`, keeping only its low two bits.
pub fn fill(data: &mut [u8], index: u8) {
    data.fill(index & MAX_COLOR_INDEX);
}
