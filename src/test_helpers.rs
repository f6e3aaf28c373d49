//! Shared test utilities for the webcollage test suite.
//!
//! Builders for in-memory images and sources, plus writers that put real
//! encoded files on disk (including PNGs carrying generation metadata).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let slot = Ok(source(0, solid_image(400, 200, Rgb([200, 0, 0]))));
//! let captioned = source_with_metadata(1, gradient_image(64, 64), &theme_metadata("Dunes"));
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use png::text_metadata::{ITXtChunk, TEXtChunk, ZTXtChunk};
use std::path::Path;

use crate::types::ImageSource;

// =========================================================================
// In-memory images
// =========================================================================

/// Uniformly colored image.
pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Image whose pixels vary with position, so resampling and decoding errors show.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

// =========================================================================
// Sources
// =========================================================================

/// Decoded source without metadata. Panics on zero-sized pixels.
pub fn source(index: usize, pixels: RgbImage) -> ImageSource {
    ImageSource::new(index, format!("image-{index}.png"), pixels, None).unwrap()
}

/// Decoded source carrying raw metadata text.
pub fn source_with_metadata(index: usize, pixels: RgbImage, metadata: &str) -> ImageSource {
    ImageSource::new(
        index,
        format!("image-{index}.png"),
        pixels,
        Some(metadata.to_string()),
    )
    .unwrap()
}

/// Minimal node graph JSON with the caption node holding `theme`.
pub fn theme_metadata(theme: &str) -> String {
    serde_json::json!({
        "4": { "class_type": "CheckpointLoaderSimple", "inputs": { "ckpt_name": "model.safetensors" } },
        "202": { "class_type": "MegaPromptV2", "inputs": { "theme": theme } },
    })
    .to_string()
}

// =========================================================================
// Encoded files
// =========================================================================

/// Encode `img` as PNG at `path`.
pub fn write_png(path: &Path, img: &RgbImage) {
    std::fs::write(path, encode_png(img)).unwrap();
}

/// Encode `img` as JPEG (quality 90) at `path`.
pub fn write_jpeg(path: &Path, img: &RgbImage) {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 90)
        .encode_image(img)
        .unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Encode `img` as PNG with a `tEXt` chunk `key = value` ahead of the image data.
pub fn write_png_with_text(path: &Path, img: &RgbImage, key: &str, value: &str) {
    std::fs::write(path, png_with_text(img, &[TextChunk::Latin1(key, value)], &[])).unwrap();
}

/// One PNG text chunk: `(keyword, text)` in the chosen encoding.
#[derive(Debug, Clone, Copy)]
pub enum TextChunk<'a> {
    /// `tEXt`
    Latin1(&'a str, &'a str),
    /// `zTXt`
    Zlib(&'a str, &'a str),
    /// uncompressed `iTXt`
    Utf8(&'a str, &'a str),
    /// compressed `iTXt`
    Utf8Zlib(&'a str, &'a str),
}

/// Encode `img` as PNG with text chunks `before` and `after` the image data.
pub fn png_with_text(img: &RgbImage, before: &[TextChunk], after: &[TextChunk]) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut bytes, img.width(), img.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    for &chunk in before {
        write_text_chunk(&mut writer, chunk);
    }
    writer.write_image_data(img.as_raw()).unwrap();
    for &chunk in after {
        write_text_chunk(&mut writer, chunk);
    }
    writer.finish().unwrap();
    bytes
}

fn write_text_chunk<W: std::io::Write>(writer: &mut png::Writer<W>, chunk: TextChunk) {
    match chunk {
        TextChunk::Latin1(key, text) => writer.write_text_chunk(&TEXtChunk::new(key, text)),
        TextChunk::Zlib(key, text) => writer.write_text_chunk(&ZTXtChunk::new(key, text)),
        TextChunk::Utf8(key, text) => writer.write_text_chunk(&ITXtChunk::new(key, text)),
        TextChunk::Utf8Zlib(key, text) => {
            let mut itxt = ITXtChunk::new(key, text);
            itxt.compressed = true;
            writer.write_text_chunk(&itxt)
        }
    }
    .unwrap();
}

fn encode_png(img: &RgbImage) -> Vec<u8> {
    png_with_text(img, &[], &[])
}
