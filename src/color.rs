//! Color parsing and brightness calculation utilities.
//!
//! This module provides functions for:
//! - Parsing computed-style background colors (`rgb()`, `rgba()`, `#rrggbb`)
//! - Calculating a perceptually weighted brightness score
//! - Deciding whether a color is light enough to warrant the dark icon

use std::fmt;
use std::str::FromStr;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;

/// Threshold above which a background counts as light, on a 0-255 scale.
///
/// Only near-white backgrounds pass, so light-gray themes keep the default icon.
pub const LIGHT_THRESHOLD: u32 = 240;

/// Brightness weights, in thousandths.
const WEIGHT_R: u32 = 299;
const WEIGHT_G: u32 = 587;
const WEIGHT_B: u32 = 114;

static INTEGER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[0-9]+").expect("integer token pattern is valid"));

/// RGB color representation with red, green, and blue components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RGB {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl RGB {
    /// Create a new RGB color from individual components.
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Brightness scaled by 1000, kept integral so threshold checks are exact.
    fn weighted_sum(self) -> u32 {
        WEIGHT_R * u32::from(self.r) + WEIGHT_G * u32::from(self.g) + WEIGHT_B * u32::from(self.b)
    }

    /// Perceptual brightness of the color, between 0.0 (black) and 255.0 (white).
    ///
    /// # Formula
    ///
    /// B = 0.299 × R + 0.587 × G + 0.114 × B
    #[must_use]
    pub fn brightness(self) -> f64 {
        f64::from(self.weighted_sum()) / 1000.0
    }

    /// Whether the brightness is strictly above [`LIGHT_THRESHOLD`].
    #[must_use]
    pub fn is_light(self) -> bool {
        self.weighted_sum() > LIGHT_THRESHOLD * 1000
    }
}

impl fmt::Display for RGB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for RGB {
    type Err = Error;

    /// Parse a color sample as reported by `getComputedStyle`.
    ///
    /// Supported encodings:
    /// - `rgb(R, G, B)` - the first three integers are taken
    /// - `rgba(R, G, B, A)` - alpha is ignored
    /// - `#RRGGBB` - exactly six hex digits
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedColorEncoding`] for `transparent`, empty
    /// input, short or alpha-suffixed hex, fewer than three integers, integers
    /// above 255, and any other encoding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unrecognized = || Error::UnrecognizedColorEncoding(s.to_string());

        if s.is_empty() || s == "transparent" {
            return Err(unrecognized());
        }

        if s.starts_with("rgb(") || s.starts_with("rgba(") {
            let mut tokens = INTEGER_TOKEN.find_iter(s).map(|m| m.as_str().parse::<u8>());
            let mut next = || tokens.next().and_then(Result::ok).ok_or_else(unrecognized);
            let r = next()?;
            let g = next()?;
            let b = next()?;
            return Ok(Self::new(r, g, b));
        }

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
                return Err(unrecognized());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| unrecognized());
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        Err(unrecognized())
    }
}

/// Parse a color sample, returning `None` when it carries no usable color.
///
/// # Examples
///
/// ```
/// # use altfront::color::{RGB, parse_color};
/// assert_eq!(parse_color("rgb(255, 128, 0)"), Some(RGB::new(255, 128, 0)));
/// assert_eq!(parse_color("rgba(255, 128, 0, 0.5)"), Some(RGB::new(255, 128, 0)));
/// assert_eq!(parse_color("#ff8000"), Some(RGB::new(255, 128, 0)));
/// assert_eq!(parse_color("transparent"), None);
/// ```
#[must_use]
pub fn parse_color(s: &str) -> Option<RGB> {
    match s.parse() {
        Ok(rgb) => Some(rgb),
        Err(e) => {
            debug!("{e}");
            None
        }
    }
}
