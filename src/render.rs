//! QR matrix provider.
//!
//! Encoding text into modules is delegated to the `qrcode` crate. This module
//! turns the resulting matrix into the two presentation forms the exporters
//! consume: an `size × size` raster surface and an SVG document.

use image::RgbaImage;
use qrcode::{Color as Module, EcLevel, QrCode};

use crate::color::Color;
use crate::error::ExportError;
use crate::request::QrRequest;

/// A square grid of QR modules, `true` meaning dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Encodes `text` with the given error correction level. No quiet zone is
    /// included.
    pub fn encode(text: &str, ec_level: EcLevel) -> Result<Self, ExportError> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), ec_level)?;
        let modules = code
            .to_colors()
            .into_iter()
            .map(|module| module == Module::Dark)
            .collect();
        Ok(Self {
            width: code.width(),
            modules,
        })
    }

    /// Builds a matrix from row-major module states.
    ///
    /// # Panics
    ///
    /// Panics if `modules.len()` is not `width * width`.
    pub fn from_modules(width: usize, modules: Vec<bool>) -> Self {
        assert_eq!(modules.len(), width * width, "matrix must be square");
        Self { width, modules }
    }

    /// Number of modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the module at `(x, y)`. Out-of-range coordinates are light.
    pub fn get_module(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }
}

/// SVG markup for a rendered QR code, with its pixel size baked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorDocument {
    markup: String,
    size: u32,
}

impl VectorDocument {
    pub fn as_str(&self) -> &str {
        &self.markup
    }

    /// The `width`/`height` attribute of the document.
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Both presentation forms of one request.
#[derive(Debug, Clone)]
pub struct RenderedQr {
    pub raster: RgbaImage,
    pub vector: VectorDocument,
}

/// Produces rendered QR codes for requests.
pub trait MatrixProvider {
    /// Renders `request`, or returns `Ok(None)` when its text is empty.
    fn render(&self, request: &QrRequest) -> Result<Option<RenderedQr>, ExportError>;
}

/// [`MatrixProvider`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy)]
pub struct QrcodeProvider {
    ec_level: EcLevel,
}

impl QrcodeProvider {
    pub fn new(ec_level: EcLevel) -> Self {
        Self { ec_level }
    }
}

impl Default for QrcodeProvider {
    fn default() -> Self {
        Self::new(EcLevel::L)
    }
}

impl MatrixProvider for QrcodeProvider {
    fn render(&self, request: &QrRequest) -> Result<Option<RenderedQr>, ExportError> {
        if request.is_empty() {
            return Ok(None);
        }
        let matrix = QrMatrix::encode(request.text(), self.ec_level)?;
        log::debug!(
            "encoded {} bytes into a {}x{} module matrix",
            request.text().len(),
            matrix.width(),
            matrix.width()
        );
        Ok(Some(RenderedQr {
            raster: render_raster(&matrix, request.size(), request.background(), request.foreground()),
            vector: render_vector(&matrix, request.size(), request.background(), request.foreground()),
        }))
    }
}

/// Rasterizes `matrix` onto a `size × size` surface.
///
/// Each pixel takes the color of the module under it, so the output has hard
/// module edges even when `size` is not a multiple of the module count.
///
/// # Example
///
/// ```rust
/// use qrcompose::{render_raster, Color, QrMatrix};
///
/// let matrix = QrMatrix::from_modules(2, vec![true, false, false, true]);
/// let img = render_raster(&matrix, 4, Color::WHITE, Color::BLACK);
/// assert_eq!(img.dimensions(), (4, 4));
/// assert_eq!(img.get_pixel(0, 0), &Color::BLACK.to_rgba());
/// assert_eq!(img.get_pixel(3, 0), &Color::WHITE.to_rgba());
/// ```
pub fn render_raster(matrix: &QrMatrix, size: u32, background: Color, foreground: Color) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let n = matrix.width() as u64;
    let size = u64::from(size);
    let (dark, light) = (foreground.to_rgba(), background.to_rgba());

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let module_x = (u64::from(x) * n / size) as usize;
        let module_y = (u64::from(y) * n / size) as usize;
        *pixel = if matrix.get_module(module_x, module_y) { dark } else { light };
    }

    img
}

/// Returns an SVG document depicting `matrix` at `size × size` pixels.
///
/// The viewBox is measured in modules; dark modules are merged into
/// horizontal runs. The string always uses Unix newlines.
pub fn render_vector(matrix: &QrMatrix, size: u32, background: Color, foreground: Color) -> VectorDocument {
    let n = matrix.width();
    let mut path = String::new();
    for y in 0..n {
        let mut x = 0;
        while x < n {
            if !matrix.get_module(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            while x < n && matrix.get_module(x, y) {
                x += 1;
            }
            path += &format!("M{},{}h{}v1H{}z", start, y, x - start, start);
        }
    }

    let mut markup = String::new();
    markup += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {1} {1}\">\n",
        size, n
    );
    markup += &format!(
        "\t<path fill=\"{}\" d=\"M0,0h{1}v{1}H0z\" shape-rendering=\"crispEdges\"/>\n",
        background, n
    );
    markup += &format!(
        "\t<path fill=\"{}\" d=\"{}\" shape-rendering=\"crispEdges\"/>\n",
        foreground, path
    );
    markup += "</svg>\n";

    VectorDocument { markup, size }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: usize) -> QrMatrix {
        let modules = (0..width * width).map(|i| (i % width + i / width) % 2 == 0).collect();
        QrMatrix::from_modules(width, modules)
    }

    #[test]
    fn test_encode_hello_is_version_one() {
        let matrix = QrMatrix::encode("hello", EcLevel::L).unwrap();
        assert_eq!(matrix.width(), 21);
        // Top-left finder pattern corner is always dark.
        assert!(matrix.get_module(0, 0));
        assert!(!matrix.get_module(21, 0));
    }

    #[test]
    fn test_empty_text_renders_nothing() {
        let request = QrRequest::new("", 256, Color::WHITE, Color::BLACK);
        assert!(QrcodeProvider::default().render(&request).unwrap().is_none());
    }

    #[test]
    fn test_provider_renders_requested_size() {
        let request = QrRequest::new("hello", 256, Color::WHITE, Color::BLACK);
        let rendered = QrcodeProvider::default().render(&request).unwrap().unwrap();
        assert_eq!(rendered.raster.dimensions(), (256, 256));
        assert_eq!(rendered.vector.size(), 256);
        assert!(rendered.vector.as_str().contains("viewBox=\"0 0 21 21\""));
    }

    #[test]
    fn test_raster_uses_nearest_module() {
        let matrix = checker(3);
        let red = Color::rgb(255, 0, 0);
        let img = render_raster(&matrix, 7, Color::WHITE, red);
        // 7 px over 3 modules: columns 0..=2 -> module 0, 3..=4 -> 1, 5..=6 -> 2
        assert_eq!(img.get_pixel(2, 0), &red.to_rgba());
        assert_eq!(img.get_pixel(3, 0), &Color::WHITE.to_rgba());
        assert_eq!(img.get_pixel(5, 0), &red.to_rgba());
        assert_eq!(img.get_pixel(6, 6), &red.to_rgba());
    }

    #[test]
    fn test_vector_merges_runs_and_bakes_colors() {
        let matrix = QrMatrix::from_modules(3, vec![
            true, true, false,
            false, false, false,
            true, false, true,
        ]);
        let doc = render_vector(&matrix, 120, Color::rgb(0xee, 0xee, 0xee), Color::rgb(0x11, 0x22, 0x33));
        let svg = doc.as_str();

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"120\" height=\"120\""));
        assert!(svg.contains("fill=\"#eeeeee\" d=\"M0,0h3v3H0z\""));
        assert!(svg.contains("fill=\"#112233\" d=\"M0,0h2v1H0zM0,2h1v1H0zM2,2h1v1H2z\""));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_overlong_text_is_encode_error() {
        let text = "x".repeat(8000);
        assert!(matches!(
            QrMatrix::encode(&text, EcLevel::H),
            Err(ExportError::Encode(_))
        ));
    }
}
