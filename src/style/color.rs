use crate::{core::constants::DEFAULT_MARKER_COLOR, MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque RGB colour parsed from a `#rrggbb` hex string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Unit-count badge fill
    pub const BADGE: Color = Color::rgb(254, 104, 29);
    /// Marker label text
    pub const LABEL: Color = Color::rgb(0x33, 0x33, 0x33);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or the short `#rgb` form
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || MapError::Validation(format!("invalid hex colour '{}'", hex));

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 if digits.is_ascii() => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 if digits.is_ascii() => {
                let short = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid().into()),
        }
    }

    /// Parses a dataset colour, falling back to the default marker colour
    pub fn from_dataset(hex: Option<&str>) -> Self {
        hex.filter(|h| !h.is_empty())
            .and_then(|h| match Self::from_hex(h) {
                Ok(color) => Some(color),
                Err(e) => {
                    log::warn!("{}; using default marker colour", e);
                    None
                }
            })
            .unwrap_or_else(Self::default)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba(r, g, b, a)` string
    pub fn rgba(&self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }
}

impl Default for Color {
    fn default() -> Self {
        // Constant is a valid literal
        Self::from_hex(DEFAULT_MARKER_COLOR).unwrap_or(Self::rgb(0x34, 0x98, 0xdb))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
