//! Error type shared by every stage of the export pipeline.

/// Errors raised while rendering, composing or exporting a QR code.
///
/// An empty request text is not an error: every export entry point treats it
/// as a no-op and returns `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Size, padding or surface dimensions outside the accepted range.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// The text could not be encoded into any QR version.
    #[error("QR encoding failed: {0}")]
    Encode(String),

    /// The logo bytes could not be decoded.
    #[error("logo failed to load: {0}")]
    Logo(String),

    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<qrcode::types::QrError> for ExportError {
    fn from(error: qrcode::types::QrError) -> Self {
        ExportError::Encode(error.to_string())
    }
}
