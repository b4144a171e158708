//! Vector export.

use crate::artifact::ExportArtifact;
use crate::render::VectorDocument;

/// Serializes a rendered vector document into a `qrcode.svg` artifact.
///
/// The markup is exported exactly as rendered: no padding and no logo are
/// applied, whatever the raster export settings are. Returns `None` when
/// nothing was rendered.
///
/// # Example
///
/// ```rust
/// use qrcompose::{export_vector, Color, MatrixProvider, QrRequest, QrcodeProvider};
///
/// let request = QrRequest::new("hello", 256, Color::WHITE, Color::BLACK);
/// let rendered = QrcodeProvider::default().render(&request).unwrap();
/// let artifact = export_vector(rendered.as_ref().map(|r| &r.vector)).unwrap();
/// assert_eq!(artifact.filename, "qrcode.svg");
/// ```
pub fn export_vector(document: Option<&VectorDocument>) -> Option<ExportArtifact> {
    let document = document?;
    log::debug!("exporting {}px vector document", document.size());
    Some(ExportArtifact::svg(document.as_str()))
}
