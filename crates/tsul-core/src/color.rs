//! # Color Shader
//!
//! `#RRGGBB` parsing, percentage shading, and the accent palette cycle.
//!
//! ## Shading
//! ```text
//! p > 0:  channel → channel + (255 - channel) × p / 100     (toward white)
//! p < 0:  channel → channel + (0   - channel) × |p| / 100   (toward black)
//!
//! each result rounded to nearest, then clamped to 0..=255
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// The five accent colors, in cycle order.
pub const PALETTE: [Rgb; 5] = [
    Rgb::new(0x30, 0x82, 0xFF),
    Rgb::new(0xC7, 0x7D, 0xFF),
    Rgb::new(0x5E, 0xF0, 0x8F),
    Rgb::new(0xFF, 0x8C, 0x42),
    Rgb::new(0xFF, 0x4A, 0x64),
];

// =============================================================================
// Rgb
// =============================================================================

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Moves every channel `percent` of the way toward white (positive) or
    /// black (negative). `percent` is clamped to `-100.0..=100.0`.
    ///
    /// ```rust
    /// use tsul_core::color::Rgb;
    ///
    /// let c: Rgb = "#3082FF".parse().unwrap();
    /// assert_eq!(c.shade(0.0), c);
    /// assert_eq!(c.shade(100.0), Rgb::WHITE);
    /// assert_eq!(c.shade(-100.0), Rgb::BLACK);
    /// ```
    pub fn shade(&self, percent: f64) -> Rgb {
        let p = percent.clamp(-100.0, 100.0);
        let (target, amount) = if p < 0.0 { (0.0, -p) } else { (255.0, p) };
        let channel = |c: u8| {
            let c = f64::from(c);
            ((target - c) * amount / 100.0 + c).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(channel(self.r), channel(self.g), channel(self.b))
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidColor(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Lowercase `#rrggbb`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

// =============================================================================
// Accent Cycle
// =============================================================================

/// Cycles the page accent color through a palette, one step per click.
#[derive(Debug, Clone)]
pub struct AccentCycle {
    palette: Vec<Rgb>,
    index: usize,
}

impl AccentCycle {
    /// Starts at the first palette entry.
    pub fn new(palette: Vec<Rgb>) -> CoreResult<Self> {
        if palette.is_empty() {
            return Err(CoreError::EmptyPalette);
        }
        Ok(AccentCycle { palette, index: 0 })
    }

    /// The current accent.
    pub fn current(&self) -> Rgb {
        self.palette[self.index]
    }

    /// Advances one step (wrapping) and returns the new accent.
    pub fn advance(&mut self) -> Rgb {
        self.index = (self.index + 1) % self.palette.len();
        self.current()
    }
}

impl Default for AccentCycle {
    fn default() -> Self {
        AccentCycle {
            palette: PALETTE.to_vec(),
            index: 0,
        }
    }
}
