//! Parameter types for composition.
//!
//! These structs carry every knob a composer reads. They are built once by the
//! caller (normally from [`CollageConfig`](crate::config::CollageConfig)) and
//! passed down explicitly, so the engine never consults ambient state.
//!
//! ## Types
//!
//! - [`Canvas`] — target size and background shared by every mode.
//! - [`GridParams`] — padding, caption band and text scale for the grid composer.
//! - [`DenseParams`] — row search band and waste-score weights for the dense composer.
//! - [`TrimParams`] — per-channel tolerance for background detection.
//! - [`CaptionParams`] — where the caption lives in the embedded metadata.
//! - [`Quality`] — JPEG encoding quality (1–100, default 95). Clamped on construction.

use crate::types::Color;

/// Target canvas shared by every layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
        }
    }
}

/// Where the caption text is found inside embedded generation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionParams {
    /// Text-chunk keyword holding the node graph JSON.
    pub metadata_key: String,
    /// `class_type` of the node whose `inputs.theme` is the caption.
    pub node_type: String,
}

impl Default for CaptionParams {
    fn default() -> Self {
        Self {
            metadata_key: "prompt".to_string(),
            node_type: "MegaPromptV2".to_string(),
        }
    }
}

/// Grid composer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    /// Space between cells and around the canvas edge.
    pub padding: u32,
    /// Height reserved below each image when captions are on.
    pub caption_band: u32,
    /// Gap between the image sub-region and the caption baseline box.
    pub caption_gap: u32,
    /// Nearest-neighbour scale applied to the 8px bitmap font.
    pub text_scale: u32,
    /// Lower bound for cell and image sizes on crowded canvases.
    pub min_cell: u32,
    pub with_captions: bool,
    pub captions: CaptionParams,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            padding: 20,
            caption_band: 30,
            caption_gap: 5,
            text_scale: 2,
            min_cell: 8,
            with_captions: false,
            captions: CaptionParams::default(),
        }
    }
}

impl GridParams {
    /// Caption band actually reserved: zero when captions are off.
    pub fn reserved_band(&self) -> u32 {
        if self.with_captions {
            self.caption_band
        } else {
            0
        }
    }
}

/// Dense composer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseParams {
    /// A row closes early once its width at the ideal row height would exceed
    /// `canvas_width * width_slack`.
    pub width_slack: f64,
    /// Row counts searched: `round(sqrt(n)) ± row_band`.
    pub row_band: usize,
    /// Waste added per image a row deviates from the ideal count.
    pub count_penalty: f64,
    /// Multiplied by canvas width and the layout's deviation from the target aspect.
    pub aspect_penalty: f64,
    /// Fewer images than this are laid out as a single row without searching.
    pub min_images_for_search: usize,
}

impl Default for DenseParams {
    fn default() -> Self {
        Self {
            width_slack: 1.2,
            row_band: 1,
            count_penalty: 50.0,
            aspect_penalty: 1.0,
            min_images_for_search: 3,
        }
    }
}

/// Background trim settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimParams {
    /// A pixel is content when any channel differs from the background by more than this.
    pub tolerance: u8,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self { tolerance: 10 }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}
