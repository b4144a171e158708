//! Finished export payloads.

pub const PNG_FILENAME: &str = "qrcode.png";
pub const PNG_WITH_LOGO_FILENAME: &str = "qrcode_with_logo.png";
pub const SVG_FILENAME: &str = "qrcode.svg";

/// PNG artifacts are offered as a generic binary stream so the consumer
/// prompts for a save location instead of displaying the image.
pub const PNG_MIME: &str = "image/octet-stream";
pub const SVG_MIME: &str = "image/svg+xml";

/// Bytes ready for download, with their MIME type and suggested filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub filename: &'static str,
}

impl ExportArtifact {
    pub(crate) fn png(bytes: Vec<u8>, with_logo: bool) -> Self {
        Self {
            bytes,
            mime: PNG_MIME,
            filename: if with_logo { PNG_WITH_LOGO_FILENAME } else { PNG_FILENAME },
        }
    }

    pub(crate) fn svg(markup: &str) -> Self {
        Self {
            bytes: markup.as_bytes().to_vec(),
            mime: SVG_MIME,
            filename: SVG_FILENAME,
        }
    }
}
