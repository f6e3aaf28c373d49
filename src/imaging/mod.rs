//! Image decoding, geometry and drawing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, TIFF, WebP) |
//! | **Generation metadata** | `png::Decoder` text chunks (`tEXt`, `zTXt`, `iTXt`) |
//! | **Resample** | `image::imageops::resize` with `Lanczos3` |
//! | **Captions** | `font8x8` bitmap glyphs |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for grid and fit math (unit testable)
//! - **Parameters**: Data structures describing how to compose
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Text**: caption rasterisation

pub mod backend;
mod calculations;
pub(crate) mod png_text;
mod params;
pub mod rust_backend;
pub mod text;

pub use backend::{BackendError, ImageBackend, ImageMetadata};
pub use calculations::{GridGeometry, centered_offset, fit_within, grid_geometry, grid_shape};
pub use params::{Canvas, CaptionParams, DenseParams, GridParams, Quality, TrimParams};
pub use rust_backend::{
    RustBackend, expand_inputs, is_supported_image, supported_input_extensions,
};

use image::RgbImage;
use image::imageops::{self, FilterType};

/// Resample `image` to exactly `width × height` with Lanczos3.
///
/// Returns a copy untouched when the size already matches, so repeated
/// passes over an already-fitted buffer do not soften it.
pub fn resample(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Lanczos3)
}
