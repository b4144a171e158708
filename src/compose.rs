//! Raster composition.
//!
//! Builds the padded PNG from a rendered QR surface:
//!
//! 1. allocate a fresh `(size + 2 * padding)²` canvas
//! 2. fill it with the background color
//! 3. draw the QR surface at `(padding, padding)`
//! 4. await the logo, if any, and draw it clipped to a circle at the center
//! 5. encode to PNG

use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

use image::{imageops, ImageFormat, Pixel, RgbaImage};

use crate::artifact::ExportArtifact;
use crate::config::LogoFilter;
use crate::error::ExportError;
use crate::logo::Logo;
use crate::request::{Padding, QrRequest};

/// Where the logo goes on a padded canvas.
///
/// The logo square has side `size / 4` and is centered on the canvas; the
/// visible part is the circle inscribed in that square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPlacement {
    /// Left edge of the logo square.
    pub x: f64,
    /// Top edge of the logo square.
    pub y: f64,
    pub side: f64,
}

impl LogoPlacement {
    pub fn for_canvas(size: u32, padding: Padding) -> Self {
        let padded = f64::from(size) + 2.0 * f64::from(padding.pixels());
        let side = f64::from(size) / 4.0;
        let origin = padded / 2.0 - side / 2.0;
        Self {
            x: origin,
            y: origin,
            side,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.side / 2.0, self.y + self.side / 2.0)
    }

    pub fn radius(&self) -> f64 {
        self.side / 2.0
    }

    /// True when the center of pixel `(px, py)` lies strictly inside the clip
    /// circle.
    pub fn contains(&self, px: u32, py: u32) -> bool {
        let (cx, cy) = self.center();
        let dx = f64::from(px) + 0.5 - cx;
        let dy = f64::from(py) + 0.5 - cy;
        dx * dx + dy * dy < self.radius() * self.radius()
    }
}

/// Fills a fresh canvas with the background and draws the QR surface on it.
fn base_canvas(surface: &RgbaImage, request: &QrRequest, padding: Padding) -> Result<RgbaImage, ExportError> {
    let size = request.size();
    if surface.dimensions() != (size, size) {
        return Err(ExportError::InvalidRequest(format!(
            "QR surface is {}x{}, expected {}x{}",
            surface.width(),
            surface.height(),
            size,
            size
        )));
    }

    let side = padding.padded_side(size)?;
    let mut canvas = RgbaImage::from_pixel(side, side, request.background().to_rgba());
    let offset = i64::from(padding.pixels());
    imageops::overlay(&mut canvas, surface, offset, offset);
    Ok(canvas)
}

/// Draws `logo` stretched over `placement`, keeping only the pixels inside
/// its inscribed circle.
fn draw_logo(canvas: &mut RgbaImage, logo: &Logo, placement: LogoPlacement, filter: LogoFilter) {
    let source = logo.image();
    if source.width() == 0 || source.height() == 0 {
        return;
    }

    let n = placement.side.round().max(1.0) as u32;
    let fitted = imageops::resize(source, n, n, filter.filter_type());
    let last = i64::from(n) - 1;
    let sample = |canvas_coord: u32, edge: f64| -> u32 {
        let t = (f64::from(canvas_coord) + 0.5 - edge) / placement.side;
        ((t * f64::from(n)).floor() as i64).clamp(0, last) as u32
    };

    let x0 = placement.x.floor().max(0.0) as u32;
    let y0 = placement.y.floor().max(0.0) as u32;
    let x1 = ((placement.x + placement.side).ceil().max(0.0) as u32).min(canvas.width());
    let y1 = ((placement.y + placement.side).ceil().max(0.0) as u32).min(canvas.height());

    for py in y0..y1 {
        for px in x0..x1 {
            if !placement.contains(px, py) {
                continue;
            }
            let src = fitted.get_pixel(sample(px, placement.x), sample(py, placement.y));
            canvas.get_pixel_mut(px, py).blend(src);
        }
    }
}

/// Composes the final canvas synchronously.
///
/// # Arguments
///
/// * `surface` - The rendered QR code, exactly `size × size` pixels.
/// * `request` - Supplies `size` and the background color.
/// * `padding` - Border drawn around the QR code on every side.
/// * `logo` - Optional logo drawn into the central circle.
/// * `filter` - Resampling filter used to fit the logo.
///
/// # Errors
///
/// Returns [`ExportError::InvalidRequest`] if the surface does not match
/// `request.size()`.
pub fn compose_canvas(
    surface: &RgbaImage,
    request: &QrRequest,
    padding: Padding,
    logo: Option<&Logo>,
    filter: LogoFilter,
) -> Result<RgbaImage, ExportError> {
    let mut canvas = base_canvas(surface, request, padding)?;
    if let Some(logo) = logo {
        draw_logo(&mut canvas, logo, LogoPlacement::for_canvas(request.size(), padding), filter);
    }
    Ok(canvas)
}

/// PNG-encodes a canvas. The output is deterministic for a given canvas.
pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Composes and encodes the PNG artifact for one export.
///
/// The background and QR code are drawn first; a pending logo is then awaited
/// exactly once, so encoding never starts before the logo is available. With
/// no logo the canvas is encoded straight away.
///
/// If the logo resolves to an error, the export falls back to the plain
/// composition and is named `qrcode.png`.
///
/// Returns `Ok(None)` without producing anything when `surface` is absent.
pub async fn compose_raster<F>(
    surface: Option<&RgbaImage>,
    request: &QrRequest,
    padding: Padding,
    logo: Option<F>,
    filter: LogoFilter,
) -> Result<Option<ExportArtifact>, ExportError>
where
    F: Future<Output = Result<Arc<Logo>, ExportError>>,
{
    let Some(surface) = surface else {
        log::debug!("no QR surface rendered, skipping PNG export");
        return Ok(None);
    };

    let compose_start = Instant::now();
    let mut canvas = base_canvas(surface, request, padding)?;

    let logo = match logo {
        Some(pending) => match pending.await {
            Ok(logo) => Some(logo),
            Err(err) => {
                log::warn!("{}, exporting without logo", err);
                None
            }
        },
        None => None,
    };
    if let Some(logo) = &logo {
        draw_logo(&mut canvas, logo, LogoPlacement::for_canvas(request.size(), padding), filter);
    }
    let compose_elapsed = compose_start.elapsed();

    let encode_start = Instant::now();
    let bytes = encode_png(&canvas)?;
    log::debug!(
        "composed {}x{} canvas (logo={}) compose={}ms encode={}ms",
        canvas.width(),
        canvas.height(),
        logo.is_some(),
        compose_elapsed.as_millis(),
        encode_start.elapsed().as_millis()
    );

    Ok(Some(ExportArtifact::png(bytes, logo.is_some())))
}
