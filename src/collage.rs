//! Collage composition: load, lay out, trim.
//!
//! This is the entry point the CLI (or any other front end) calls. Input is an
//! ordered list of image paths plus a [`CollageRequest`]; output is a
//! [`Composition`] holding the finished RGB bitmap, where every input landed,
//! and a manifest of the inputs that had to be skipped.
//!
//! ```text
//! paths ──load_sources──▶ [Slot] ──┬─ Grid  ──compose_grid──────────────────▶ Composition
//!                                  └─ Dense ──compose_dense──trim::trim──────▶ Composition
//! ```
//!
//! ## Failure policy
//!
//! Per-image problems never abort a composition. Each input becomes a
//! [`Slot`]: either a decoded [`ImageSource`] or a [`Skipped`] entry naming the
//! reason. Grid mode leaves a skipped input's cell background-colored; dense
//! mode packs only the images that loaded. The one hard failure is a zero
//! target dimension, rejected before any work starts.
//!
//! Every call starts from scratch: no caches, no shared state. Identical inputs
//! produce byte-identical canvases.

use crate::dense::compose_dense;
use crate::grid::compose_grid;
use crate::imaging::{BackendError, Canvas, DenseParams, GridParams, ImageBackend, TrimParams};
use crate::trim;
use crate::types::{ImageSource, LayoutCell, LayoutMode, Rect};
use image::RgbImage;
use log::{info, warn};
use std::path::Path;
use thiserror::Error;

/// Hard failures. Everything else degrades to a partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Invalid target dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Why an input did not make it onto the canvas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("unreadable: {0}")]
    Unreadable(String),
    #[error("undecodable: {0}")]
    Undecodable(String),
    #[error("zero-sized image ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },
}

impl From<BackendError> for SkipReason {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => SkipReason::Unreadable(e.to_string()),
            BackendError::Decode { message, .. } => SkipReason::Undecodable(message),
        }
    }
}

/// A skipped input, kept so callers can tell partial from total success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Position in the caller's input list.
    pub index: usize,
    /// What the caller passed in (usually a path).
    pub source: String,
    pub reason: SkipReason,
}

/// One input after loading.
pub type Slot = Result<ImageSource, Skipped>;

/// Everything a composition needs besides the images.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageRequest {
    pub mode: LayoutMode,
    pub canvas: Canvas,
    pub grid: GridParams,
    pub dense: DenseParams,
    pub trim: TrimParams,
}

impl CollageRequest {
    /// Request with default layout tuning.
    pub fn new(mode: LayoutMode, canvas: Canvas) -> Self {
        Self {
            mode,
            canvas,
            grid: GridParams::default(),
            dense: DenseParams::default(),
            trim: TrimParams::default(),
        }
    }
}

/// Crop-and-fit applied after dense layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimReport {
    /// Size of the raw mosaic before trimming.
    pub raw_width: u32,
    pub raw_height: u32,
    /// Content bounding box in raw-mosaic coordinates; `None` if it was all background.
    pub content: Option<Rect>,
}

/// The finished collage handed back to the caller.
#[derive(Debug, Clone)]
pub struct Composition {
    pub mode: LayoutMode,
    /// Final RGB bitmap. Ownership passes to the caller.
    pub canvas: RgbImage,
    /// Placed images in paste order. For dense layouts the rectangles are in
    /// raw-mosaic coordinates, before [`trim`](Self::trim) was applied.
    pub cells: Vec<LayoutCell>,
    /// Inputs that were left out, in input order.
    pub skipped: Vec<Skipped>,
    /// Present for dense layouts.
    pub trim: Option<TrimReport>,
}

impl Composition {
    /// Some inputs were skipped but at least one was placed.
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty() && !self.cells.is_empty()
    }
}

/// Reject zero-sized targets before any layout work.
pub fn validate_canvas(canvas: &Canvas) -> Result<(), ComposeError> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(ComposeError::InvalidDimensions {
            width: canvas.width,
            height: canvas.height,
        });
    }
    Ok(())
}

/// Decode every path, keeping input order. Failures become [`Skipped`] slots.
///
/// `metadata_key` selects the text chunk whose contents are kept on the
/// source for caption extraction; `None` skips reading metadata entirely.
pub fn load_sources<P: AsRef<Path>>(
    backend: &impl ImageBackend,
    paths: &[P],
    metadata_key: Option<&str>,
) -> Vec<Slot> {
    paths
        .iter()
        .enumerate()
        .map(|(index, path)| load_one(backend, index, path.as_ref(), metadata_key))
        .collect()
}

fn load_one(
    backend: &impl ImageBackend,
    index: usize,
    path: &Path,
    metadata_key: Option<&str>,
) -> Slot {
    let label = path.display().to_string();
    let skip = |reason: SkipReason| {
        warn!("Skipping {label}: {reason}");
        Skipped {
            index,
            source: label.clone(),
            reason,
        }
    };

    let pixels = backend.decode(path).map_err(|e| skip(e.into()))?;

    let metadata = match metadata_key {
        Some(key) => match backend.read_metadata(path) {
            Ok(meta) => meta.get(key).map(str::to_string),
            Err(e) => {
                warn!("Could not read metadata from {label}: {e}");
                None
            }
        },
        None => None,
    };

    ImageSource::new(index, label.clone(), pixels, metadata).map_err(skip)
}

/// Lay out already-loaded slots according to `request`.
pub fn compose(slots: &[Slot], request: &CollageRequest) -> Result<Composition, ComposeError> {
    validate_canvas(&request.canvas)?;

    let composition = match request.mode {
        LayoutMode::Grid => compose_grid(slots, &request.canvas, &request.grid)?,
        LayoutMode::Dense => {
            let raw = compose_dense(slots, &request.canvas, &request.dense)?;
            let (raw_width, raw_height) = raw.canvas.dimensions();
            let trimmed = trim::trim_with_bounds(
                &raw.canvas,
                request.canvas.background,
                request.canvas.width,
                request.canvas.height,
                &request.trim,
            );
            Composition {
                canvas: trimmed.canvas,
                trim: Some(TrimReport {
                    raw_width,
                    raw_height,
                    content: trimmed.content,
                }),
                ..raw
            }
        }
    };

    info!(
        "Composed {} collage: {} placed, {} skipped, {}x{}",
        composition.mode,
        composition.cells.len(),
        composition.skipped.len(),
        composition.canvas.width(),
        composition.canvas.height()
    );
    Ok(composition)
}

/// Load `paths` with `backend` and compose them in one call.
pub fn compose_files<P: AsRef<Path>>(
    backend: &impl ImageBackend,
    paths: &[P],
    request: &CollageRequest,
) -> Result<Composition, ComposeError> {
    validate_canvas(&request.canvas)?;
    let metadata_key = (request.mode == LayoutMode::Grid && request.grid.with_captions)
        .then_some(request.grid.captions.metadata_key.as_str());
    let slots = load_sources(backend, paths, metadata_key);
    compose(&slots, request)
}
