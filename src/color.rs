//! Display colors
//!
//! Colors are stored as validated RGB triples and always render as
//! `#RRGGBB`. Hex strings with a missing leading `#` are accepted and
//! normalized, anything else is rejected when the registry is built.

use std::fmt;
use std::str::FromStr;

use colored::Colorize;

use crate::error::ColorError;

/// An RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Neutral gray used when a metric has no colors at all
pub const NEUTRAL_COLOR: Color = Color::rgb(0x80, 0x80, 0x80);

impl Color {
    /// Create a color from its components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive, surrounding whitespace ignored)
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if hex.len() != 6 {
            return Err(ColorError::Length(hex.len()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Hex(input.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorError::Hex(input.to_string()))
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Normalized `#RRGGBB` form
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Wrap `text` in a 24-bit ANSI foreground color when `enabled`.
pub fn colorize(text: &str, color: Color, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    text.truecolor(color.r, color.g, color.b).to_string()
}
