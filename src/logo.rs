//! Logo loading.
//!
//! Logo bytes are decoded on tokio's blocking pool. [`LogoSlot`] holds the
//! most recently chosen logo and lets an export wait for a load that is still
//! in flight.
//!
//! Every [`LogoSlot::load`] gets its own [`PendingLogo`] handle. The slot only
//! points at the latest handle, so an export that snapshots it when triggered
//! gets the logo chosen at that moment, regardless of which decode finishes
//! first or what is chosen while the export waits.

use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use image::{ImageReader, RgbaImage};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::LogoLimits;
use crate::error::ExportError;

/// A decoded logo, ready to draw.
#[derive(Debug, Clone)]
pub struct Logo {
    image: RgbaImage,
    data_url: String,
}

impl Logo {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The original file as a `data:<mime>;base64,...` URL.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// Decodes logo bytes synchronously.
///
/// The header is inspected first so oversized images are rejected before the
/// full decode allocates their pixels.
pub fn decode_logo(bytes: &[u8], limits: &LogoLimits) -> Result<Logo, ExportError> {
    if bytes.len() as u64 > limits.max_file_size {
        return Err(ExportError::ResourceLimit(format!(
            "logo file is {} bytes (limit: {} bytes)",
            bytes.len(),
            limits.max_file_size
        )));
    }

    let format = image::guess_format(bytes)
        .map_err(|e| ExportError::Logo(format!("unrecognized image format: {}", e)))?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| ExportError::Logo(format!("unreadable image header: {}", e)))?;
    let pixels = u64::from(width) * u64::from(height);
    if pixels > limits.max_decoded_pixels {
        return Err(ExportError::ResourceLimit(format!(
            "logo is {}x{} ({} pixels, limit: {})",
            width, height, pixels, limits.max_decoded_pixels
        )));
    }

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ExportError::Logo(format!("decode failed: {}", e)))?
        .to_rgba8();

    let data_url = format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        general_purpose::STANDARD.encode(bytes)
    );

    Ok(Logo { image, data_url })
}

/// Decodes logo bytes on the blocking pool.
///
/// Must be called from within a tokio runtime.
pub async fn load_logo(bytes: Vec<u8>, limits: LogoLimits) -> Result<Logo, ExportError> {
    tokio::task::spawn_blocking(move || decode_logo(&bytes, &limits))
        .await
        .map_err(|e| ExportError::Logo(format!("decode task failed: {}", e)))?
}

type LoadResult = Option<Result<Arc<Logo>, String>>;

/// Handle to the outcome of one [`LogoSlot::load`].
///
/// The handle stays bound to its own load: choosing another logo afterwards
/// does not change what it resolves to.
#[derive(Debug, Clone)]
pub struct PendingLogo {
    generation: u64,
    result: watch::Receiver<LoadResult>,
}

impl PendingLogo {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The logo if this load has finished successfully.
    pub fn ready(&self) -> Option<Arc<Logo>> {
        match &*self.result.borrow() {
            Some(Ok(logo)) => Some(Arc::clone(logo)),
            _ => None,
        }
    }

    /// Resolves once this load has finished.
    pub async fn wait(mut self) -> Result<Arc<Logo>, ExportError> {
        let outcome = self
            .result
            .wait_for(Option::is_some)
            .await
            .map_err(|_| ExportError::Logo("logo load was abandoned".to_string()))?
            .clone();
        match outcome {
            Some(Ok(logo)) => Ok(logo),
            Some(Err(reason)) => Err(ExportError::Logo(reason)),
            None => Err(ExportError::Logo("logo load was abandoned".to_string())),
        }
    }
}

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    pending: Option<PendingLogo>,
}

struct SlotInner {
    state: watch::Sender<SlotState>,
    limits: LogoLimits,
}

/// Holder of the currently chosen logo.
///
/// Cloning a slot yields another handle to the same logo.
#[derive(Clone)]
pub struct LogoSlot {
    inner: Arc<SlotInner>,
}

impl LogoSlot {
    pub fn new(limits: LogoLimits) -> Self {
        let (state, _) = watch::channel(SlotState::default());
        Self {
            inner: Arc::new(SlotInner { state, limits }),
        }
    }

    /// Starts decoding `bytes` as the new logo, replacing any previous one.
    ///
    /// The decode runs in the background whether or not the returned handle
    /// is awaited. Must be called from within a tokio runtime.
    pub fn load(&self, bytes: Vec<u8>) -> JoinHandle<Result<Arc<Logo>, ExportError>> {
        let (tx, rx) = watch::channel(None);
        let mut generation = 0;
        self.inner.state.send_modify(|state| {
            state.generation += 1;
            generation = state.generation;
            state.pending = Some(PendingLogo {
                generation,
                result: rx,
            });
        });
        log::debug!("logo load #{} started ({} bytes)", generation, bytes.len());

        let limits = self.inner.limits.clone();
        tokio::spawn(async move {
            let result = load_logo(bytes, limits).await.map(Arc::new);
            let outcome = match &result {
                Ok(logo) => Ok(Arc::clone(logo)),
                Err(ExportError::Logo(reason)) => Err(reason.clone()),
                Err(err) => Err(err.to_string()),
            };
            tx.send_replace(Some(outcome));
            if tx.is_closed() {
                log::debug!("logo load #{} superseded, nobody waiting", generation);
            }
            result
        })
    }

    /// Drops the held logo. Exports already waiting on it keep their handle.
    pub fn clear(&self) {
        self.inner.state.send_modify(|state| {
            state.generation += 1;
            state.pending = None;
        });
    }

    /// True when no logo has been chosen.
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().pending.is_none()
    }

    /// The logo if the latest load has finished successfully.
    pub fn current(&self) -> Option<Arc<Logo>> {
        self.inner.state.borrow().pending.as_ref().and_then(PendingLogo::ready)
    }

    /// Handle to the latest load, or `None` when no logo is chosen.
    ///
    /// Exports take this snapshot when they are triggered.
    pub fn pending(&self) -> Option<PendingLogo> {
        self.inner.state.borrow().pending.clone()
    }

    /// Resolves the load that is current when this is called.
    ///
    /// Yields `Ok(None)` when no logo is chosen and the decode error when that
    /// load failed. Later loads do not affect the returned future.
    pub fn settled(&self) -> impl Future<Output = Result<Option<Arc<Logo>>, ExportError>> + Send + 'static {
        let pending = self.pending();
        async move {
            match pending {
                Some(pending) => pending.wait().await.map(Some),
                None => Ok(None),
            }
        }
    }
}

impl Default for LogoSlot {
    fn default() -> Self {
        Self::new(LogoLimits::default())
    }
}
