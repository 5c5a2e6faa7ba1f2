use std::{fmt, str::FromStr};

use crate::{chr::MAX_COLOR_INDEX, error::Error};

pub const MAX_COLORS: usize = MAX_COLOR_INDEX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses `RRGGBB`, with or without a leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.into()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
                .map_err(|_| Error::InvalidColor(s.into()))
        };

        Ok(Color::new(channel(0)?, channel(1)?, channel(2)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Every slot starts out with this color.
pub const DEFAULT_COLOR: Color = Color::new(0x00, 0xFF, 0x7F);

/// Four colors addressed by a 2-bit color index.
///
/// Indices are masked to their low two bits instead of being rejected, so
/// `set(c, 4)` writes slot 0. Lookups therefore never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pal([Color; MAX_COLORS]);

impl Pal {
    pub fn new() -> Self {
        Pal([DEFAULT_COLOR; MAX_COLORS])
    }

    pub fn reset(&mut self) {
        self.0 = [DEFAULT_COLOR; MAX_COLORS];
    }

    pub fn get(&self, index: u8) -> Color {
        self.0[(index & MAX_COLOR_INDEX) as usize]
    }

    pub fn set(&mut self, color: Color, index: u8) {
        self.0[(index & MAX_COLOR_INDEX) as usize] = color;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.0.iter()
    }
}

impl Default for Pal {
    fn default() -> Self {
        Self::new()
    }
}
