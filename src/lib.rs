//! # qrcompose
//!
//! A Rust library for exporting styled QR codes as PNG or SVG files.
//!
//! `qrcompose` takes a text and its visual parameters (size, colors, padding and
//! an optional logo), renders the QR code through the `qrcode` crate, and
//! produces download-ready artifacts: a padded PNG with the logo clipped into a
//! circle at its center, or the plain SVG document.
//!
//! ## Features
//!
//! - Render QR codes as `size × size` raster surfaces and SVG documents.
//! - Compose padded PNGs with a uniform background border.
//! - Overlay a circular logo, decoded asynchronously on tokio's blocking pool.
//! - Save artifacts through a pluggable [`ExportSink`].
//! - Configure limits and defaults with a JSON file.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrcompose = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Export a padded PNG with a logo, then the SVG:
//!
//! ```rust,no_run
//! use qrcompose::{Color, ExportConfig, Exporter, Padding, QrRequest};
//!
//! # async fn demo() -> Result<(), qrcompose::ExportError> {
//! let exporter = Exporter::from_config(ExportConfig::default())?;
//! exporter.logo().load(std::fs::read("logo.png")?);
//!
//! let request = QrRequest::new("https://example.com", 256, "#ffffff".parse()?, Color::BLACK);
//! exporter.download_png(&request, Padding(10)).await?; // generated/qrcode_with_logo.png
//! exporter.download_svg(&request).await?; // generated/qrcode.svg
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`render`]: QR matrix provider producing raster and vector forms.
//! - [`compose`]: Padded, logo-overlaid PNG composition.
//! - [`logo`]: Asynchronous logo decoding and the logo slot.
//! - [`vector`]: SVG export.
//! - [`sink`]: Delivery of finished artifacts.
//! - [`export`]: The [`Exporter`] tying the pipeline together.

pub mod artifact;
pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod logo;
pub mod render;
pub mod request;
pub mod sink;
pub mod vector;

pub use artifact::ExportArtifact;
pub use color::Color;
pub use compose::{compose_canvas, compose_raster, encode_png, LogoPlacement};
pub use config::{ErrorCorrection, ExportConfig, LogoFilter, LogoLimits, PADDING_CEILING, SIZE_CEILING};
pub use error::ExportError;
pub use export::Exporter;
pub use logo::{decode_logo, load_logo, Logo, LogoSlot, PendingLogo};
pub use render::{render_raster, render_vector, MatrixProvider, QrMatrix, QrcodeProvider, RenderedQr, VectorDocument};
pub use request::{Padding, QrRequest};
pub use sink::{DirectorySink, ExportSink};
pub use vector::export_vector;
