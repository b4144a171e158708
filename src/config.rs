//! Export configuration.
//!
//! All tunable limits live in [`ExportConfig`]. The defaults are usable as-is;
//! a JSON file can override any subset of fields.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use qrcode::EcLevel;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Largest `max_size` a configuration may declare.
pub const SIZE_CEILING: u32 = 4096;
/// Largest `max_padding` a configuration may declare.
pub const PADDING_CEILING: u32 = 1024;

/// QR error correction level handed to the matrix provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    #[default]
    Low,
    Medium,
    Quartile,
    High,
}

impl ErrorCorrection {
    pub(crate) fn ec_level(self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::Quartile => EcLevel::Q,
            Self::High => EcLevel::H,
        }
    }
}

/// Resampling filter used to fit a logo into its square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl LogoFilter {
    pub(crate) fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Limits applied while decoding a user-supplied logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoLimits {
    /// Largest accepted logo file, in bytes.
    pub max_file_size: u64,
    /// Largest accepted `width * height`, read from the image header before
    /// the full decode.
    pub max_decoded_pixels: u64,
}

impl Default for LogoLimits {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_decoded_pixels: 16_000_000,
        }
    }
}

/// Configuration for an [`Exporter`](crate::Exporter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the [`DirectorySink`](crate::DirectorySink) writes into.
    pub output_dir: PathBuf,
    pub error_correction: ErrorCorrection,
    /// Smallest accepted QR side, in pixels.
    pub min_size: u32,
    /// Largest accepted QR side, in pixels.
    pub max_size: u32,
    /// Largest accepted padding, in pixels.
    pub max_padding: u32,
    pub logo: LogoLimits,
    /// Resampling filter used to fit a logo into its square.
    pub logo_filter: LogoFilter,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            error_correction: ErrorCorrection::default(),
            min_size: 1,
            max_size: SIZE_CEILING,
            max_padding: PADDING_CEILING,
            logo: LogoLimits::default(),
            logo_filter: LogoFilter::default(),
        }
    }
}

impl ExportConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// A missing file yields the default configuration. Fields absent from the
    /// file keep their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Config`] if the file is not valid JSON or the
    /// resulting configuration fails [`validate`](Self::validate).
    pub fn load_from_path(path: &Path) -> Result<Self, ExportError> {
        if !path.exists() {
            log::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: ExportConfig = serde_json::from_str(&content).map_err(|e| {
            ExportError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the size bounds describe a non-empty range of positive sizes
    /// and stay within [`SIZE_CEILING`] and [`PADDING_CEILING`].
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.min_size == 0 {
            return Err(ExportError::Config("min_size must be at least 1".to_string()));
        }
        if self.min_size > self.max_size {
            return Err(ExportError::Config(format!(
                "min_size ({}) is greater than max_size ({})",
                self.min_size, self.max_size
            )));
        }
        if self.max_size > SIZE_CEILING {
            return Err(ExportError::Config(format!(
                "max_size ({}) exceeds {}",
                self.max_size, SIZE_CEILING
            )));
        }
        if self.max_padding > PADDING_CEILING {
            return Err(ExportError::Config(format!(
                "max_padding ({}) exceeds {}",
                self.max_padding, PADDING_CEILING
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "max_size": 1024, "error_correction": "high", "logo_filter": "catmull_rom" }"#,
        )
        .unwrap();

        let config = ExportConfig::load_from_path(&path).unwrap();
        assert_eq!(config.max_size, 1024);
        assert_eq!(config.error_correction, ErrorCorrection::High);
        assert_eq!(config.logo_filter, LogoFilter::CatmullRom);
        assert_eq!(config.logo.max_file_size, LogoLimits::default().max_file_size);
        assert_eq!(config.output_dir, PathBuf::from("generated"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ExportConfig::load_from_path(&path),
            Err(ExportError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = ExportConfig::default();
        config.min_size = 512;
        config.max_size = 256;
        assert!(matches!(config.validate(), Err(ExportError::Config(_))));

        config.min_size = 0;
        config.max_size = 256;
        assert!(matches!(config.validate(), Err(ExportError::Config(_))));
    }

    #[test]
    fn test_oversized_bounds_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "max_size": 100000 }"#).unwrap();
        assert!(matches!(
            ExportConfig::load_from_path(&path),
            Err(ExportError::Config(_))
        ));

        let mut config = ExportConfig::default();
        config.max_padding = PADDING_CEILING + 1;
        assert!(matches!(config.validate(), Err(ExportError::Config(_))));

        config.max_padding = PADDING_CEILING;
        config.max_size = SIZE_CEILING;
        assert!(config.validate().is_ok());
    }
}
