//! Write a finished collage to disk.
//!
//! The engine hands back an in-memory bitmap and never touches the filesystem
//! itself; this is the caller-side helper the CLI uses. The encoder is picked
//! from the file extension: `.jpg`/`.jpeg` write JPEG at the given quality,
//! `.png` writes lossless PNG.

use crate::imaging::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Unsupported output format '{0}': use .jpg, .jpeg or .png")]
    UnsupportedFormat(String),
}

/// Output encodings the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Pick the format from `path`'s extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(ExportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Encode `canvas` to `path`. `quality` only affects JPEG.
pub fn save_collage(canvas: &RgbImage, path: &Path, quality: Quality) -> Result<(), ExportError> {
    let format = OutputFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);

    match format {
        OutputFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut writer, quality.value()).encode_image(canvas)?;
        }
        OutputFormat::Png => {
            PngEncoder::new(&mut writer).write_image(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                image::ExtendedColorType::Rgb8,
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_image;
    use tempfile::TempDir;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out.JPG")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("a/b.jpeg")).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out.png")).unwrap(),
            OutputFormat::Png
        );
    }

    #[test]
    fn unknown_extension_is_error() {
        assert!(matches!(
            OutputFormat::from_path(Path::new("out.gif")),
            Err(ExportError::UnsupportedFormat(_))
        ));
        assert!(OutputFormat::from_path(Path::new("collage")).is_err());
    }

    #[test]
    fn png_roundtrips_exactly() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("collage.png");
        let canvas = gradient_image(40, 30);
        save_collage(&canvas, &path, Quality::default()).unwrap();

        let decoded = image::open(&path).unwrap().into_rgb8();
        assert_eq!(decoded, canvas);
    }

    #[test]
    fn jpeg_is_written_at_size() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/collage.jpg");
        save_collage(&gradient_image(64, 32), &path, Quality::new(80)).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn unsupported_format_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("collage.bmp");
        assert!(save_collage(&gradient_image(4, 4), &path, Quality::default()).is_err());
        assert!(!path.exists());
    }
}
