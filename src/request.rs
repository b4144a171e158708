//! Immutable per-export inputs.

use crate::color::Color;
use crate::config::ExportConfig;
use crate::error::ExportError;

/// What to render: the text plus its visual parameters.
///
/// A request is captured by value when an export is triggered, so later edits
/// to the inputs never leak into an export that is already running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    text: String,
    size: u32,
    background: Color,
    foreground: Color,
}

impl QrRequest {
    /// Creates a request.
    ///
    /// # Arguments
    ///
    /// * `text` - The content to encode. May be empty, in which case every
    ///   export is a no-op.
    /// * `size` - Side of the rendered QR code in pixels, padding excluded.
    /// * `background` - Fill for light modules and for the padding border.
    /// * `foreground` - Fill for dark modules.
    pub fn new(text: impl Into<String>, size: u32, background: Color, foreground: Color) -> Self {
        Self {
            text: text.into(),
            size,
            background,
            foreground,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    /// True when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Checks `size` against the configured bounds.
    pub fn validate(&self, config: &ExportConfig) -> Result<(), ExportError> {
        if self.size < config.min_size || self.size > config.max_size {
            return Err(ExportError::InvalidRequest(format!(
                "size {} is outside {}..={}",
                self.size, config.min_size, config.max_size
            )));
        }
        Ok(())
    }
}

/// Border width in pixels, applied on every side of the QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding(pub u32);

impl Padding {
    pub fn pixels(self) -> u32 {
        self.0
    }

    /// Side of a canvas holding a `size`-pixel QR code with this padding.
    pub fn padded_side(self, size: u32) -> Result<u32, ExportError> {
        self.0
            .checked_mul(2)
            .and_then(|border| border.checked_add(size))
            .ok_or_else(|| {
                ExportError::ResourceLimit(format!("size {} with padding {} overflows", size, self.0))
            })
    }

    pub fn validate(self, config: &ExportConfig) -> Result<(), ExportError> {
        if self.0 > config.max_padding {
            return Err(ExportError::InvalidRequest(format!(
                "padding {} exceeds the maximum of {}",
                self.0, config.max_padding
            )));
        }
        Ok(())
    }
}
