//! Opaque RGB colors parsed from the textual forms a color picker emits.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::ExportError;

/// An opaque RGB color.
///
/// Parses `#rgb`, `#rrggbb` (case-insensitive) and `rgb(r, g, b)`.
///
/// # Example
///
/// ```rust
/// use qrcompose::Color;
///
/// let white: Color = "#FFF".parse().unwrap();
/// assert_eq!(white, Color::WHITE);
/// assert_eq!(white.to_string(), "#ffffff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// The color as a fully opaque `image` pixel.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }

    fn parse_hex(digits: &str, original: &str) -> Result<Self, ExportError> {
        let invalid = || ExportError::InvalidColor(format!("'{}' is not a hex color", original));
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                // #abc expands to #aabbcc
                let expand = |i: usize| channel(digits[i..i + 1].repeat(2).as_str());
                Ok(Color::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Color::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    fn parse_rgb_function(args: &str, original: &str) -> Result<Self, ExportError> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ExportError::InvalidColor(format!(
                "'{}' must have exactly three channels",
                original
            )));
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            *slot = part.parse::<u8>().map_err(|_| {
                ExportError::InvalidColor(format!("'{}' has a channel outside 0..=255", original))
            })?;
        }
        Ok(Color::rgb(channels[0], channels[1], channels[2]))
    }
}

impl FromStr for Color {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(digits) = trimmed.strip_prefix('#') {
            return Color::parse_hex(digits, s);
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Color::parse_rgb_function(args, s);
        }
        Err(ExportError::InvalidColor(format!("unrecognized color '{}'", s)))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
