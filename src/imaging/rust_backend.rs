//! Pure Rust decoding backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Color conversion | `DynamicImage::into_rgb8` (alpha dropped) |
//! | Text metadata | custom [`png_text`](super::png_text) reader (`tEXt`/`zTXt`/`iTXt`) |

use super::backend::{BackendError, ImageBackend, ImageMetadata};
use image::{ImageFormat, ImageReader, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [supported extensions](supported_input_extensions).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Expand `inputs` into a flat, ordered list of image paths.
///
/// Files are kept as given, in order, whatever their extension (a bad file is
/// reported later as a skipped input). Each directory is replaced by its
/// supported image files sorted by name; subdirectories are not descended.
pub fn expand_inputs(inputs: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let mut entries: Vec<PathBuf> = std::fs::read_dir(input)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_supported_image(path))
            .collect();
        entries.sort();
        paths.extend(entries);
    }
    Ok(paths)
}

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError> {
        // Sniff the format from content so misnamed files still decode
        let image = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(image.into_rgb8())
    }

    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError> {
        Ok(ImageMetadata {
            text: super::png_text::read_text_chunks(path),
        })
    }
}
