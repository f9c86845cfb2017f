//! Lazily loaded item previews.
//!
//! The browser only needs two things from a preview: whether it has settled,
//! and a drawable thumbnail once it has. Both are expressed by the
//! [`PreviewSource`] trait. Hosts with their own image system implement it
//! directly; everyone else uses [`PreviewLoader`], which decodes files or byte
//! buffers on background threads and publishes the result into a shared
//! [`PreviewSlot`].
//!
//! # Example
//!
//! ```no_run
//! use thumbgrid::{BrowserConfig, PreviewLoader, PreviewSource};
//!
//! # fn example() -> thumbgrid::BrowserResult<()> {
//! let loader = PreviewLoader::new(&BrowserConfig::default())?;
//!
//! // Returns immediately; the slot starts out loading.
//! let slot = loader.load_file("textures/wall1.png")?;
//! assert!(!slot.is_loaded());
//!
//! // Hand `slot` to `ImageBrowser::add`. The redraw scheduler notices when
//! // the worker finishes and repaints the row.
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use image::DynamicImage;
use parking_lot::Mutex;
use thumbgrid_core::logging::targets;

use crate::config::BrowserConfig;
use crate::error::{BrowserError, BrowserResult};

/// A handle to an asynchronously produced preview image.
///
/// Implementations are shared between the browser (which polls them from
/// the UI thread) and whatever produces the image, so they must be
/// `Send + Sync`. The browser holds them through `Arc` and never owns the
/// pixel data's lifetime.
pub trait PreviewSource: Send + Sync {
    /// Whether the preview has settled and will not change again.
    ///
    /// A preview that failed to load counts as settled.
    fn is_loaded(&self) -> bool;

    /// The drawable thumbnail, if one is available.
    fn thumbnail(&self) -> Option<Thumbnail>;
}

/// A decoded RGBA8 thumbnail.
///
/// Pixel data is reference counted, so clones are cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    width: u32,
    height: u32,
    data: Arc<[u8]>,
}

impl Thumbnail {
    /// Create a thumbnail from raw RGBA8 pixels.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` is not `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * 4,
            "RGBA8 buffer does not match {width}x{height}"
        );
        Self {
            width,
            height,
            data: data.into(),
        }
    }

    /// Decode an encoded image and shrink it so neither edge exceeds
    /// `max_edge`, keeping the aspect ratio.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Decode`] if the format is unknown or the data
    /// is corrupt.
    pub fn decode(bytes: &[u8], max_edge: u32) -> BrowserResult<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from_image(&image, max_edge))
    }

    /// Open an image file and shrink it like [`Thumbnail::decode`].
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Decode`] if the file cannot be read or decoded.
    pub fn open(path: impl AsRef<Path>, max_edge: u32) -> BrowserResult<Self> {
        let image = image::open(path)?;
        Ok(Self::from_image(&image, max_edge))
    }

    fn from_image(image: &DynamicImage, max_edge: u32) -> Self {
        let max_edge = max_edge.max(1);
        let scaled = if image.width() > max_edge || image.height() > max_edge {
            image.thumbnail(max_edge, max_edge)
        } else {
            image.clone()
        };
        let rgba = scaled.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            data: rgba.into_raw().into(),
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// An already decoded thumbnail is always loaded.
impl PreviewSource for Thumbnail {
    fn is_loaded(&self) -> bool {
        true
    }

    fn thumbnail(&self) -> Option<Thumbnail> {
        Some(self.clone())
    }
}

/// The current state of a preview load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// The image is still being loaded or decoded.
    Loading,
    /// The thumbnail is ready for drawing.
    Ready(Thumbnail),
    /// The image failed to load with the given error message.
    Failed(String),
}

impl PreviewState {
    /// Returns `true` if the image is still loading.
    #[inline]
    pub fn is_loading(&self) -> bool {
        matches!(self, PreviewState::Loading)
    }

    /// Returns `true` if the thumbnail is ready.
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, PreviewState::Ready(_))
    }

    /// Returns `true` if the image failed to load.
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, PreviewState::Failed(_))
    }

    /// Returns the thumbnail if ready.
    #[inline]
    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        match self {
            PreviewState::Ready(thumbnail) => Some(thumbnail),
            _ => None,
        }
    }

    /// Returns the error message if failed.
    #[inline]
    pub fn error(&self) -> Option<&str> {
        match self {
            PreviewState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// A shared, thread-safe cell that a producer fills in exactly once.
///
/// The slot is the [`PreviewSource`] handed to the browser. It holds no
/// reference back to any item or catalog, so a producer finishing after its
/// item has been discarded only writes into an orphaned slot.
#[derive(Debug)]
pub struct PreviewSlot {
    state: Mutex<PreviewState>,
}

impl PreviewSlot {
    /// Create a slot in the [`PreviewState::Loading`] state.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PreviewState::Loading),
        }
    }

    /// Create a slot that is already loaded.
    pub fn ready(thumbnail: Thumbnail) -> Self {
        Self {
            state: Mutex::new(PreviewState::Ready(thumbnail)),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> PreviewState {
        self.state.lock().clone()
    }

    /// Publish a decoded thumbnail.
    pub fn set_ready(&self, thumbnail: Thumbnail) {
        *self.state.lock() = PreviewState::Ready(thumbnail);
    }

    /// Publish a load failure.
    pub fn set_failed(&self, error: impl Into<String>) {
        *self.state.lock() = PreviewState::Failed(error.into());
    }

    fn complete(&self, result: BrowserResult<Thumbnail>) {
        match result {
            Ok(thumbnail) => self.set_ready(thumbnail),
            Err(err) => self.set_failed(err.to_string()),
        }
    }
}

impl Default for PreviewSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSource for PreviewSlot {
    fn is_loaded(&self) -> bool {
        !self.state.lock().is_loading()
    }

    fn thumbnail(&self) -> Option<Thumbnail> {
        self.state.lock().thumbnail().cloned()
    }
}

static_assertions::assert_impl_all!(PreviewSlot: Send, Sync);
static_assertions::assert_impl_all!(Thumbnail: Send, Sync);

/// Internal message sent to worker threads.
enum LoadRequest {
    File {
        slot: Arc<PreviewSlot>,
        path: PathBuf,
    },
    Bytes {
        slot: Arc<PreviewSlot>,
        data: Vec<u8>,
    },
    Shutdown,
}

/// Decodes previews on a pool of background threads.
///
/// Each `load_*` call returns a fresh [`PreviewSlot`] immediately; a worker
/// fills it in later. Dropping the loader lets the workers drain the queue,
/// then joins them.
pub struct PreviewLoader {
    request_tx: Sender<LoadRequest>,
    workers: Vec<JoinHandle<()>>,
    in_progress: Arc<AtomicUsize>,
    max_pending: usize,
}

impl PreviewLoader {
    /// Start the worker pool described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::WorkerSpawn`] if a worker thread cannot be
    /// spawned.
    pub fn new(config: &BrowserConfig) -> BrowserResult<Self> {
        let (request_tx, request_rx) = unbounded::<LoadRequest>();
        let in_progress = Arc::new(AtomicUsize::new(0));
        let worker_count = config.preview_workers.max(1);
        let max_edge = config.thumbnail_size;

        let mut loader = Self {
            request_tx,
            workers: Vec::with_capacity(worker_count),
            in_progress: Arc::clone(&in_progress),
            max_pending: config.max_pending_previews,
        };

        for i in 0..worker_count {
            let rx = request_rx.clone();
            let counter = Arc::clone(&in_progress);
            let handle = thread::Builder::new()
                .name(format!("thumbgrid-preview-{i}"))
                .spawn(move || Self::worker_thread(rx, counter, max_edge))
                .map_err(BrowserError::WorkerSpawn)?;
            loader.workers.push(handle);
        }

        tracing::debug!(
            target: targets::PREVIEW,
            workers = worker_count,
            max_edge,
            "preview loader started"
        );
        Ok(loader)
    }

    fn worker_thread(rx: Receiver<LoadRequest>, in_progress: Arc<AtomicUsize>, max_edge: u32) {
        while let Ok(request) = rx.recv() {
            let (slot, result, source) = match request {
                LoadRequest::File { slot, path } => {
                    let result = Thumbnail::open(&path, max_edge);
                    (slot, result, path.display().to_string())
                }
                LoadRequest::Bytes { slot, data } => {
                    let result = Thumbnail::decode(&data, max_edge);
                    (slot, result, format!("{} bytes", data.len()))
                }
                LoadRequest::Shutdown => break,
            };

            match &result {
                Ok(thumbnail) => tracing::trace!(
                    target: targets::PREVIEW,
                    %source,
                    width = thumbnail.width(),
                    height = thumbnail.height(),
                    "preview decoded"
                ),
                Err(err) => tracing::warn!(
                    target: targets::PREVIEW,
                    %source,
                    error = %err,
                    "preview failed to load"
                ),
            }
            slot.complete(result);
            in_progress.fetch_sub(1, Ordering::AcqRel);
        }
    }

    /// Queue a file for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::TooManyPending`] if the queue is full, or
    /// [`BrowserError::LoaderShutDown`] if the workers are gone.
    pub fn load_file(&self, path: impl AsRef<Path>) -> BrowserResult<Arc<PreviewSlot>> {
        let path = path.as_ref().to_path_buf();
        self.submit(|slot| LoadRequest::File { slot, path })
    }

    /// Queue an in-memory encoded image for decoding.
    ///
    /// # Errors
    ///
    /// Same as [`PreviewLoader::load_file`].
    pub fn load_bytes(&self, bytes: impl Into<Vec<u8>>) -> BrowserResult<Arc<PreviewSlot>> {
        let data = bytes.into();
        self.submit(|slot| LoadRequest::Bytes { slot, data })
    }

    fn submit(
        &self,
        request: impl FnOnce(Arc<PreviewSlot>) -> LoadRequest,
    ) -> BrowserResult<Arc<PreviewSlot>> {
        if self.in_progress.load(Ordering::Acquire) >= self.max_pending {
            return Err(BrowserError::TooManyPending {
                max: self.max_pending,
            });
        }

        let slot = Arc::new(PreviewSlot::new());
        self.in_progress.fetch_add(1, Ordering::AcqRel);
        if self.request_tx.send(request(Arc::clone(&slot))).is_err() {
            self.in_progress.fetch_sub(1, Ordering::AcqRel);
            return Err(BrowserError::LoaderShutDown);
        }
        Ok(slot)
    }

    /// Number of loads queued or being decoded.
    pub fn pending_count(&self) -> usize {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl fmt::Debug for PreviewLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewLoader")
            .field("workers", &self.workers.len())
            .field("pending", &self.pending_count())
            .field("max_pending", &self.max_pending)
            .finish()
    }
}

impl Drop for PreviewLoader {
    fn drop(&mut self) {
        for _ in 0..self.workers.len() {
            let _ = self.request_tx.send(LoadRequest::Shutdown);
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        tracing::debug!(target: targets::PREVIEW, "preview loader shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn wait_until_loaded(slot: &PreviewSlot) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !slot.is_loaded() {
            assert!(Instant::now() < deadline, "preview never settled");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn test_config() -> BrowserConfig {
        BrowserConfig {
            preview_workers: 2,
            thumbnail_size: 16,
            ..Default::default()
        }
    }

    #[test]
    fn test_preview_state_methods() {
        let loading = PreviewState::Loading;
        assert!(loading.is_loading());
        assert!(!loading.is_ready());
        assert!(loading.thumbnail().is_none());

        let failed = PreviewState::Failed("bad header".into());
        assert!(failed.is_failed());
        assert_eq!(failed.error(), Some("bad header"));
    }

    #[test]
    fn test_slot_transitions() {
        let slot = PreviewSlot::new();
        assert!(!slot.is_loaded());
        assert!(slot.thumbnail().is_none());

        slot.set_ready(Thumbnail::from_rgba8(1, 1, vec![0, 0, 0, 255]));
        assert!(slot.is_loaded());
        assert_eq!(slot.thumbnail().map(|t| t.width()), Some(1));
    }

    #[test]
    fn test_failed_slot_counts_as_loaded() {
        let slot = PreviewSlot::new();
        slot.set_failed("missing file");
        assert!(slot.is_loaded());
        assert!(slot.thumbnail().is_none());
    }

    #[test]
    fn test_decode_shrinks_to_max_edge() {
        let thumbnail = Thumbnail::decode(&encode_png(64, 32), 16).unwrap();
        assert_eq!(thumbnail.width(), 16);
        assert_eq!(thumbnail.height(), 8);
        assert_eq!(thumbnail.pixels().len(), 16 * 8 * 4);
    }

    #[test]
    fn test_decode_keeps_small_images() {
        let thumbnail = Thumbnail::decode(&encode_png(4, 3), 16).unwrap();
        assert_eq!((thumbnail.width(), thumbnail.height()), (4, 3));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = Thumbnail::decode(b"not an image", 16).unwrap_err();
        assert!(matches!(err, BrowserError::Decode(_)));
    }

    #[test]
    fn test_loader_decodes_bytes() {
        let loader = PreviewLoader::new(&test_config()).unwrap();
        assert_eq!(loader.worker_count(), 2);

        let slot = loader.load_bytes(encode_png(32, 32)).unwrap();
        wait_until_loaded(&slot);
        assert!(slot.state().is_ready());
        assert_eq!(slot.thumbnail().map(|t| t.width()), Some(16));
    }

    #[test]
    fn test_loader_reports_failure() {
        let loader = PreviewLoader::new(&test_config()).unwrap();
        let slot = loader.load_file("/definitely/not/here.png").unwrap();
        wait_until_loaded(&slot);
        assert!(slot.state().is_failed());
    }

    #[test]
    fn test_loader_rejects_when_full() {
        let config = BrowserConfig {
            max_pending_previews: 0,
            ..test_config()
        };
        let loader = PreviewLoader::new(&config).unwrap();
        let err = loader.load_bytes(vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, BrowserError::TooManyPending { max: 0 }));
    }
}
