//! Collage configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` in the config directory, and
//! command-line flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [canvas]
//! width = 2000
//! height = 2000
//! background = "#ffffff"    # "#RRGGBB" or "#RGB"
//!
//! [layout]
//! mode = "dense"            # "grid" or "dense"
//! captions = false          # grid mode only
//!
//! [grid]
//! padding = 20              # Gap between cells and around the edge (px)
//! caption_band = 30         # Height reserved below each image for its caption
//! caption_gap = 5           # Space between image region and caption text
//! text_scale = 2            # Caption font scale (8px glyphs)
//! min_cell = 8              # Smallest cell side on crowded canvases
//!
//! [dense]
//! width_slack = 1.2         # A row may grow to width * slack before closing
//! row_band = 1              # Row counts searched around sqrt(n)
//! count_penalty = 50.0      # Waste per image of deviation from the ideal row count
//! aspect_penalty = 1.0      # Weight of deviation from the target aspect
//!
//! [trim]
//! tolerance = 10            # Per-channel difference still counted as background
//!
//! [captions]
//! metadata_key = "prompt"   # PNG text keyword holding the node graph
//! node_type = "MegaPromptV2"
//!
//! [output]
//! quality = 95              # JPEG quality (1-100)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [canvas]
//! background = "#000"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CaptionParams, Canvas, DenseParams, GridParams, Quality, TrimParams};
use crate::types::{Color, LayoutMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Collage configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageConfig {
    /// Target size and background color.
    pub canvas: CanvasConfig,
    /// Layout mode and caption switch.
    pub layout: LayoutConfig,
    /// Grid composer tuning.
    pub grid: GridConfig,
    /// Dense composer tuning.
    pub dense: DenseConfig,
    /// Background trim tolerance.
    pub trim: TrimConfig,
    /// Where captions are found in embedded metadata.
    pub captions: CaptionsConfig,
    /// Encoding settings for the written file.
    pub output: OutputConfig,
}

impl CollageConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Validation(
                "canvas.width and canvas.height must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.grid.text_scale == 0 {
            return Err(ConfigError::Validation(
                "grid.text_scale must be at least 1".into(),
            ));
        }
        if !(self.dense.width_slack.is_finite() && self.dense.width_slack > 0.0) {
            return Err(ConfigError::Validation(
                "dense.width_slack must be a positive number".into(),
            ));
        }
        if self.dense.count_penalty < 0.0 || self.dense.aspect_penalty < 0.0 {
            return Err(ConfigError::Validation(
                "dense penalties must not be negative".into(),
            ));
        }
        if self.captions.metadata_key.is_empty() || self.captions.node_type.is_empty() {
            return Err(ConfigError::Validation(
                "captions.metadata_key and captions.node_type must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.canvas.width, self.canvas.height, self.canvas.background)
    }

    pub fn caption_params(&self) -> CaptionParams {
        CaptionParams {
            metadata_key: self.captions.metadata_key.clone(),
            node_type: self.captions.node_type.clone(),
        }
    }

    pub fn grid_params(&self) -> GridParams {
        GridParams {
            padding: self.grid.padding,
            caption_band: self.grid.caption_band,
            caption_gap: self.grid.caption_gap,
            text_scale: self.grid.text_scale,
            min_cell: self.grid.min_cell,
            with_captions: self.layout.captions,
            captions: self.caption_params(),
        }
    }

    pub fn dense_params(&self) -> DenseParams {
        DenseParams {
            width_slack: self.dense.width_slack,
            row_band: self.dense.row_band,
            count_penalty: self.dense.count_penalty,
            aspect_penalty: self.dense.aspect_penalty,
            ..DenseParams::default()
        }
    }

    pub fn trim_params(&self) -> TrimParams {
        TrimParams {
            tolerance: self.trim.tolerance,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 2000,
            background: Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    /// Draw captions under grid cells. Ignored in dense mode.
    pub captions: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Dense,
            captions: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub padding: u32,
    pub caption_band: u32,
    pub caption_gap: u32,
    pub text_scale: u32,
    pub min_cell: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        let params = GridParams::default();
        Self {
            padding: params.padding,
            caption_band: params.caption_band,
            caption_gap: params.caption_gap,
            text_scale: params.text_scale,
            min_cell: params.min_cell,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DenseConfig {
    pub width_slack: f64,
    pub row_band: usize,
    pub count_penalty: f64,
    pub aspect_penalty: f64,
}

impl Default for DenseConfig {
    fn default() -> Self {
        let params = DenseParams::default();
        Self {
            width_slack: params.width_slack,
            row_band: params.row_band,
            count_penalty: params.count_penalty,
            aspect_penalty: params.aspect_penalty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimConfig {
    pub tolerance: u8,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            tolerance: TrimParams::default().tolerance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionsConfig {
    pub metadata_key: String,
    pub node_type: String,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        let params = CaptionParams::default();
        Self {
            metadata_key: params.metadata_key,
            node_type: params.node_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: u32::from(Quality::default().0),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CollageConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<CollageConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CollageConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<CollageConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# webcollage configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as config.toml in the directory passed to --config
# (the current directory by default). Command-line flags override it.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output canvas
# ---------------------------------------------------------------------------
[canvas]
# Target size in pixels. Both must be positive.
width = 2000
height = 2000

# Background color as "#RRGGBB" or "#RGB".
background = "#ffffff"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# "dense": gap-free mosaic of justified rows, trimmed to the target size.
# "grid":  near-square grid of equal cells, exactly the target size.
mode = "dense"

# Draw a caption under each grid cell, taken from the image's generation
# metadata. Ignored in dense mode.
captions = false

# ---------------------------------------------------------------------------
# Grid mode
# ---------------------------------------------------------------------------
[grid]
# Gap between cells and around the canvas edge, in pixels.
padding = 20

# Height reserved below each image for its caption (only when captions are on).
caption_band = 30

# Space between the image region and the caption text.
caption_gap = 5

# Caption font scale. Glyphs are 8px, so 2 gives 16px text.
text_scale = 2

# Smallest cell side when many images share a small canvas.
min_cell = 8

# ---------------------------------------------------------------------------
# Dense mode
# ---------------------------------------------------------------------------
[dense]
# A row closes once it would be wider than width * width_slack at the
# ideal row height.
width_slack = 1.2

# Row counts tried: round(sqrt(image count)) plus or minus this many.
row_band = 1

# Waste added per image a row deviates from the ideal images-per-row.
count_penalty = 50.0

# Weight of the layout's deviation from the target aspect ratio.
aspect_penalty = 1.0

# ---------------------------------------------------------------------------
# Background trim (dense mode)
# ---------------------------------------------------------------------------
[trim]
# A pixel is content when any channel differs from the background by more
# than this.
tolerance = 10

# ---------------------------------------------------------------------------
# Captions
# ---------------------------------------------------------------------------
[captions]
# PNG text chunk keyword holding the generation node graph (JSON).
metadata_key = "prompt"

# Node type whose inputs.theme becomes the caption.
node_type = "MegaPromptV2"

# ---------------------------------------------------------------------------
# Output file
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). PNG output ignores it.
quality = 95
"##
}
