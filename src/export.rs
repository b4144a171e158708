//! Export entry points.
//!
//! [`Exporter`] owns the matrix provider, the sink and the logo slot, and runs
//! the two export paths:
//!
//! ```text
//! QrRequest ─► MatrixProvider ─┬─ raster ─► compose_raster (awaits logo) ─► ExportSink
//!                              └─ vector ─► export_vector ───────────────► ExportSink
//! ```
//!
//! Exports are serialized: a second export waits until the first has been
//! handed to the sink. The request and padding are captured when the export
//! is triggered, and so is the logo: a PNG export waits for the load that was
//! current at that moment, even if another logo is chosen meanwhile.

use std::time::Instant;

use tokio::sync::Mutex;

use crate::artifact::ExportArtifact;
use crate::compose::compose_raster;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::logo::{LogoSlot, PendingLogo};
use crate::render::{MatrixProvider, QrcodeProvider, RenderedQr};
use crate::request::{Padding, QrRequest};
use crate::sink::{DirectorySink, ExportSink};
use crate::vector::export_vector;

/// Runs PNG and SVG exports against one provider and one sink.
pub struct Exporter<P = QrcodeProvider, S = DirectorySink> {
    config: ExportConfig,
    provider: P,
    sink: S,
    logo: LogoSlot,
    export_lock: Mutex<()>,
}

impl Exporter {
    /// Creates an exporter that encodes with the `qrcode` crate and saves into
    /// `config.output_dir`.
    pub fn from_config(config: ExportConfig) -> Result<Self, ExportError> {
        let provider = QrcodeProvider::new(config.error_correction.ec_level());
        let sink = DirectorySink::new(config.output_dir.clone());
        Exporter::new(config, provider, sink)
    }
}

impl<P: MatrixProvider, S: ExportSink> Exporter<P, S> {
    pub fn new(config: ExportConfig, provider: P, sink: S) -> Result<Self, ExportError> {
        config.validate()?;
        let logo = LogoSlot::new(config.logo.clone());
        Ok(Self {
            config,
            provider,
            sink,
            logo,
            export_lock: Mutex::new(()),
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The logo used by PNG exports. Load a file with [`LogoSlot::load`].
    pub fn logo(&self) -> &LogoSlot {
        &self.logo
    }

    /// Validates `request` and renders it. Returns `Ok(None)` for empty text.
    pub fn render(&self, request: &QrRequest) -> Result<Option<RenderedQr>, ExportError> {
        if request.is_empty() {
            return Ok(None);
        }
        request.validate(&self.config)?;
        self.provider.render(request)
    }

    /// Exports the padded PNG, with the current logo when one is chosen.
    ///
    /// Returns the suggested filename of the triggered download, or `None`
    /// when the request text is empty.
    pub async fn download_png(
        &self,
        request: &QrRequest,
        padding: Padding,
    ) -> Result<Option<&'static str>, ExportError> {
        if request.is_empty() {
            log::debug!("PNG export skipped: empty text");
            return Ok(None);
        }
        let pending_logo = self.logo.pending();
        let _guard = self.export_lock.lock().await;
        let total_start = Instant::now();

        padding.validate(&self.config)?;
        let render_start = Instant::now();
        let rendered = self.render(request)?;
        let render_elapsed = render_start.elapsed();

        let compose_start = Instant::now();
        let artifact = compose_raster(
            rendered.as_ref().map(|r| &r.raster),
            request,
            padding,
            pending_logo.map(PendingLogo::wait),
            self.config.logo_filter,
        )
        .await?;
        let compose_elapsed = compose_start.elapsed();

        let Some(artifact) = artifact else {
            return Ok(None);
        };
        let filename = self.deliver(artifact)?;

        log::info!(
            "PNG export done - {} render={}ms compose={}ms total={}ms",
            filename,
            render_elapsed.as_millis(),
            compose_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );
        Ok(Some(filename))
    }

    /// Exports the SVG exactly as rendered, ignoring padding and logo.
    pub async fn download_svg(&self, request: &QrRequest) -> Result<Option<&'static str>, ExportError> {
        let _guard = self.export_lock.lock().await;

        let rendered = self.render(request)?;
        let Some(artifact) = export_vector(rendered.as_ref().map(|r| &r.vector)) else {
            log::debug!("SVG export skipped: empty text");
            return Ok(None);
        };
        let filename = self.deliver(artifact)?;

        log::info!("SVG export done - {}", filename);
        Ok(Some(filename))
    }

    fn deliver(&self, artifact: ExportArtifact) -> Result<&'static str, ExportError> {
        self.sink
            .trigger_download(&artifact.bytes, artifact.mime, artifact.filename)?;
        Ok(artifact.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingSink {
        downloads: StdMutex<Vec<(Vec<u8>, String, String)>>,
    }

    impl ExportSink for RecordingSink {
        fn trigger_download(&self, bytes: &[u8], mime: &str, filename: &str) -> Result<(), ExportError> {
            self.downloads
                .lock()
                .unwrap()
                .push((bytes.to_vec(), mime.to_string(), filename.to_string()));
            Ok(())
        }
    }

    struct FailingSink;

    impl ExportSink for FailingSink {
        fn trigger_download(&self, _: &[u8], _: &str, _: &str) -> Result<(), ExportError> {
            Err(ExportError::Io(std::io::Error::other("disk full")))
        }
    }

    #[derive(Default)]
    struct EventSink {
        events: StdMutex<Vec<String>>,
    }

    impl ExportSink for EventSink {
        fn trigger_download(&self, _: &[u8], _: &str, filename: &str) -> Result<(), ExportError> {
            self.events.lock().unwrap().push(format!("enter {filename}"));
            std::thread::sleep(std::time::Duration::from_millis(5));
            self.events.lock().unwrap().push(format!("exit {filename}"));
            Ok(())
        }
    }

    fn logo_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(32, 32, image::Rgba([0, 0, 255, 255]));
        crate::compose::encode_png(&img).unwrap()
    }

    fn exporter() -> Exporter<QrcodeProvider, RecordingSink> {
        Exporter::new(ExportConfig::default(), QrcodeProvider::default(), RecordingSink::default()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_text_triggers_nothing() {
        let exporter = exporter();
        let request = QrRequest::new("", 256, Color::WHITE, Color::BLACK);

        assert_eq!(exporter.download_png(&request, Padding(10)).await.unwrap(), None);
        assert_eq!(exporter.download_svg(&request).await.unwrap(), None);
        assert!(exporter.sink().downloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_inputs_are_rejected() {
        let exporter = exporter();
        let request = QrRequest::new("hello", 0, Color::WHITE, Color::BLACK);
        assert!(matches!(
            exporter.download_png(&request, Padding(0)).await,
            Err(ExportError::InvalidRequest(_))
        ));

        let request = QrRequest::new("hello", 256, Color::WHITE, Color::BLACK);
        assert!(matches!(
            exporter.download_png(&request, Padding(5000)).await,
            Err(ExportError::InvalidRequest(_))
        ));
        assert!(exporter.sink().downloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_png_and_svg_reach_sink() {
        let exporter = exporter();
        let request = QrRequest::new("hello", 128, Color::WHITE, Color::BLACK);

        assert_eq!(exporter.download_png(&request, Padding(8)).await.unwrap(), Some("qrcode.png"));
        assert_eq!(exporter.download_svg(&request).await.unwrap(), Some("qrcode.svg"));

        let downloads = exporter.sink().downloads.lock().unwrap();
        assert_eq!(downloads.len(), 2);
        assert_eq!(downloads[0].1, "image/octet-stream");
        assert_eq!(downloads[1].1, "image/svg+xml");
        let svg = String::from_utf8(downloads[1].0.clone()).unwrap();
        assert!(svg.contains("width=\"128\" height=\"128\""));
    }

    #[tokio::test]
    async fn test_sink_failure_propagates() {
        let exporter = Exporter::new(ExportConfig::default(), QrcodeProvider::default(), FailingSink).unwrap();
        let request = QrRequest::new("hello", 64, Color::WHITE, Color::BLACK);

        assert!(matches!(
            exporter.download_svg(&request).await,
            Err(ExportError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ExportConfig::default();
        config.min_size = 0;
        assert!(Exporter::new(config, QrcodeProvider::default(), RecordingSink::default()).is_err());
    }

    #[tokio::test]
    async fn test_exports_are_serialized() {
        let exporter = Exporter::new(ExportConfig::default(), QrcodeProvider::default(), EventSink::default()).unwrap();
        let request = QrRequest::new("hello", 64, Color::WHITE, Color::BLACK);

        // The PNG export holds the lock while its logo is still decoding.
        exporter.logo().load(logo_png());
        let (png, svg) = tokio::join!(exporter.download_png(&request, Padding(4)), async {
            tokio::task::yield_now().await;
            exporter.download_svg(&request).await
        });

        assert_eq!(png.unwrap(), Some("qrcode_with_logo.png"));
        assert_eq!(svg.unwrap(), Some("qrcode.svg"));
        assert_eq!(
            *exporter.sink().events.lock().unwrap(),
            vec![
                "enter qrcode_with_logo.png",
                "exit qrcode_with_logo.png",
                "enter qrcode.svg",
                "exit qrcode.svg",
            ]
        );
    }
}
