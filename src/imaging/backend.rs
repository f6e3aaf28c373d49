//! Image decoding backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the two things the composers need from a
//! file on disk: its pixels and its embedded text metadata.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and statically
//! linked. Tests swap in a recording mock.

use image::RgbImage;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

/// Embedded textual metadata, keyed by chunk keyword (e.g. `prompt`, `workflow`).
///
/// Keys are kept sorted so iteration order never depends on file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub text: BTreeMap<String, String>,
}

impl ImageMetadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.text.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Trait for image decoding backends.
pub trait ImageBackend {
    /// Decode a file into an RGB8 buffer (alpha is discarded).
    fn decode(&self, path: &Path) -> Result<RgbImage, BackendError>;

    /// Read embedded text metadata. Files without any yield an empty map.
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError>;
}
