use itertools::Itertools;

use crate::{
    chr::{self, MAX_COLOR_INDEX, TILE_LEN, TILE_PIXELS},
    error::Error,
    pal::Pal,
};

/// Characters drawn for color indices 0-3.
pub const GLYPHS: [char; 4] = ['.', '+', '#', '%'];

/// A decoded window of one or more vertically stacked tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Vec<u8>,
    height: usize,
}

impl Frame {
    /// An all-zero frame. `tiles` is 1 for a regular sprite and 2 for a
    /// long one; frames of arbitrary size go through `from_pixels`.
    pub fn new(tiles: usize) -> Self {
        let data = vec![0u8; tiles * TILE_PIXELS];
        Self {
            data,
            height: tiles * TILE_LEN,
        }
    }

    pub fn from_pixels(data: Vec<u8>) -> Result<Self, Error> {
        if data.len() % TILE_PIXELS != 0 {
            return Err(Error::InvalidLength {
                len: data.len(),
                unit: TILE_PIXELS,
            });
        }
        let height = data.len() / TILE_LEN;
        Ok(Self { data, height })
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    pub fn width(&self) -> usize {
        TILE_LEN
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.height / TILE_LEN
    }

    pub fn clear(&mut self) {
        self.fill(0);
    }

    pub fn fill(&mut self, c: u8) {
        chr::fill(&mut self.data, c);
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Result<u8, Error> {
        chr::get_pixel(&self.data, x, y)
    }

    pub fn write_pixel(&mut self, x: usize, y: usize, c: u8) -> Result<(), Error> {
        chr::set_pixel(&mut self.data, x, y, c)
    }

    /// Renders one line of text per pixel row, two characters per pixel.
    ///
    /// With `color` set, each cell is wrapped in a 24-bit ANSI foreground
    /// escape carrying the palette entry as stored.
    pub fn render(&self, pal: &Pal, color: bool) -> Vec<String> {
        self.data
            .chunks_exact(TILE_LEN)
            .map(|row| row.iter().map(|&c| cell(c, pal, color)).join(""))
            .collect()
    }
}

fn cell(c: u8, pal: &Pal, color: bool) -> String {
    let glyph = GLYPHS[(c & MAX_COLOR_INDEX) as usize];
    if !color {
        return format!("{glyph}{glyph}");
    }
    let rgb = pal.get(c);
    format!(
        "\x1b[38;2;{};{};{}m{glyph}{glyph}\x1b[0m",
        rgb.r, rgb.g, rgb.b
    )
}
