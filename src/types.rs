//! Shared types used by every composer.
//!
//! Everything here is created fresh for a single composition call and dropped
//! once the canvas has been handed back. Nothing is cached between calls.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Layout strategy for a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Near-square grid of fixed cells, optionally captioned.
    Grid,
    /// Gap-free justified rows, trimmed to the requested size.
    Dense,
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutMode::Grid => f.write_str("grid"),
            LayoutMode::Dense => f.write_str("dense"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid color '{0}': expected #RGB or #RRGGBB")]
pub struct ColorParseError(pub String);

/// An opaque RGB color. Parsed from and displayed as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }

    /// Relative luminance (sRGB, ITU-R BT.709 weights) in `0.0..=1.0`.
    pub fn luminance(self) -> f64 {
        fn linear(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Text color readable on top of `self`: black on light, white on dark.
    pub fn contrasting_text(self) -> Color {
        if self.luminance() > 0.179 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            // #RGB expands each digit: #abc == #aabbcc
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Ok(Color::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Color::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Axis-aligned destination rectangle on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column covered by the rectangle.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the last row covered by the rectangle.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Normalized caption text. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption(String);

impl Caption {
    /// Wrap already-normalized text; `None` when it is empty.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (!text.is_empty()).then_some(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where one input image landed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutCell {
    /// Position of the image in the caller's input list.
    pub index: usize,
    /// Destination of the resampled image.
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
}

/// A decoded input image. Read-only once built; composers resample into new buffers.
#[derive(Debug, Clone)]
pub struct ImageSource {
    /// Position in the caller's input list.
    pub index: usize,
    /// Human-readable origin (usually the file path).
    pub label: String,
    pixels: RgbImage,
    /// Raw generation metadata (JSON text) if the file carried any.
    metadata: Option<String>,
    aspect_ratio: f64,
}

impl ImageSource {
    /// Build a source, rejecting images with a zero-length side.
    pub fn new(
        index: usize,
        label: impl Into<String>,
        pixels: RgbImage,
        metadata: Option<String>,
    ) -> Result<Self, crate::collage::SkipReason> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(crate::collage::SkipReason::ZeroSized { width, height });
        }
        Ok(Self {
            index,
            label: label.into(),
            pixels,
            metadata,
            aspect_ratio: width as f64 / height as f64,
        })
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `width / height`, always > 0.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}
