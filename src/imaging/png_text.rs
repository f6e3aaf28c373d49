//! PNG text-chunk lookup.
//!
//! Image generators embed their node graph as PNG text chunks: usually a
//! `prompt` entry holding the executed graph as JSON, often next to a
//! `workflow` entry. The `png` decoder collects all three kinds:
//!
//! - `tEXt` (latin-1)
//! - `zTXt` (zlib-compressed latin-1)
//! - `iTXt` (utf-8, optionally zlib-compressed)
//!
//! Chunks after the image data are read too. A corrupt or truncated stream
//! keeps whatever was collected before the damage.

use log::debug;
use png::text_metadata::{ITXtChunk, ZTXtChunk};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;

/// Decompressed text larger than this is dropped.
const MAX_INFLATED_LEN: usize = 16 * 1024 * 1024;

/// Read all text chunks from a file. Non-PNG or unreadable files yield an empty map.
pub fn read_text_chunks(path: &Path) -> BTreeMap<String, String> {
    match File::open(path) {
        Ok(file) => collect_text(BufReader::new(file)),
        Err(_) => BTreeMap::new(),
    }
}

/// Parse text chunks out of an in-memory PNG.
///
/// When a keyword repeats, the first occurrence wins, with `tEXt` taking
/// precedence over `zTXt` and `zTXt` over `iTXt`.
pub fn parse_text_chunks(data: &[u8]) -> BTreeMap<String, String> {
    collect_text(Cursor::new(data))
}

fn collect_text<R: BufRead + Seek>(reader: R) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    let mut png = match png::Decoder::new(reader).read_info() {
        Ok(png) => png,
        Err(e) => {
            debug!("No PNG text chunks: {e}");
            return result;
        }
    };
    if let Err(e) = png.finish() {
        debug!("PNG stream ended early, keeping text read so far: {e}");
    }

    let info = png.info();
    for chunk in &info.uncompressed_latin1_text {
        result
            .entry(chunk.keyword.clone())
            .or_insert_with(|| chunk.text.clone());
    }
    for chunk in &info.compressed_latin1_text {
        if let Some(text) = inflate_latin1(chunk) {
            result.entry(chunk.keyword.clone()).or_insert(text);
        }
    }
    for chunk in &info.utf8_text {
        if let Some(text) = inflate_utf8(chunk) {
            result.entry(chunk.keyword.clone()).or_insert(text);
        }
    }
    result
}

fn inflate_latin1(chunk: &ZTXtChunk) -> Option<String> {
    let mut chunk = chunk.clone();
    chunk.decompress_text_with_limit(MAX_INFLATED_LEN).ok()?;
    chunk.get_text().ok()
}

fn inflate_utf8(chunk: &ITXtChunk) -> Option<String> {
    let mut chunk = chunk.clone();
    chunk.decompress_text_with_limit(MAX_INFLATED_LEN).ok()?;
    chunk.get_text().ok()
}
