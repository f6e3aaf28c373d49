//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every input is listed by its 1-based position and source path, followed by
//! indented context lines: where it landed, its caption, or why it was left
//! out. A skipped input is never silently dropped from the report.
//!
//! # Output Format
//!
//! ## Compose
//!
//! ```text
//! Dense collage 2000x1994 → collage.jpg
//! 001 photos/beach.png
//!     Placed: 1012x540 at (0, 0)
//! 002 photos/forest.jpg
//!     Placed: 988x540 at (1012, 0)
//! 003 photos/broken.png
//!     Skipped: undecodable: invalid PNG signature
//!     Trim: content 2000x1994 at (0, 0) of 2000x1994
//!
//! Placed 2 of 3 images (1 skipped)
//! ```
//!
//! ## Captions
//!
//! ```text
//! 001 photos/beach.png
//!     Caption: Ocean Sunset
//! 002 photos/forest.jpg
//!     Caption: (none)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure — no I/O, no side effects.

use crate::caption::caption_for;
use crate::collage::{Composition, Slot};
use crate::imaging::CaptionParams;
use crate::types::Rect;
use std::collections::HashMap;
use std::path::Path;

/// Format a 0-based input index as a 1-based, 3-digit zero-padded position.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_rect(rect: &Rect) -> String {
    format!("{}x{} at ({}, {})", rect.width, rect.height, rect.x, rect.y)
}

/// Report for a finished composition written to `output`.
///
/// `sources` are the caller's inputs in order; composition indices refer to them.
pub fn format_composition(
    composition: &Composition,
    sources: &[String],
    output: &Path,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} collage {}x{} → {}",
        capitalize(&composition.mode.to_string()),
        composition.canvas.width(),
        composition.canvas.height(),
        output.display()
    )];

    let placed: HashMap<usize, _> = composition.cells.iter().map(|c| (c.index, c)).collect();
    let skipped: HashMap<usize, _> = composition.skipped.iter().map(|s| (s.index, s)).collect();

    for (index, source) in sources.iter().enumerate() {
        lines.push(format!("{} {}", format_index(index), source));
        if let Some(cell) = placed.get(&index) {
            lines.push(format!("{}Placed: {}", indent(1), format_rect(&cell.rect)));
            if let Some(caption) = &cell.caption {
                lines.push(format!("{}Caption: {}", indent(1), caption));
            }
        } else if let Some(skip) = skipped.get(&index) {
            lines.push(format!("{}Skipped: {}", indent(1), skip.reason));
        }
    }

    if let Some(trim) = &composition.trim {
        let detail = match &trim.content {
            Some(rect) => format!(
                "content {} of {}x{}",
                format_rect(rect),
                trim.raw_width,
                trim.raw_height
            ),
            None => format!(
                "nothing but background in {}x{}",
                trim.raw_width, trim.raw_height
            ),
        };
        lines.push(format!("{}Trim: {}", indent(1), detail));
    }

    lines.push(String::new());
    let total = composition.cells.len() + composition.skipped.len();
    let summary = if composition.skipped.is_empty() {
        format!("Placed {} of {} images", composition.cells.len(), total)
    } else {
        format!(
            "Placed {} of {} images ({} skipped)",
            composition.cells.len(),
            total,
            composition.skipped.len()
        )
    };
    lines.push(summary);
    lines
}

pub fn print_composition(composition: &Composition, sources: &[String], output: &Path) {
    for line in format_composition(composition, sources, output) {
        println!("{line}");
    }
}

/// Caption listing for already-loaded slots.
pub fn format_captions(slots: &[Slot], params: &CaptionParams) -> Vec<String> {
    let mut lines = Vec::new();
    for slot in slots {
        match slot {
            Ok(source) => {
                lines.push(format!("{} {}", format_index(source.index), source.label));
                let caption = caption_for(source, params)
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "(none)".to_string());
                lines.push(format!("{}Caption: {}", indent(1), caption));
            }
            Err(skip) => {
                lines.push(format!("{} {}", format_index(skip.index), skip.source));
                lines.push(format!("{}Skipped: {}", indent(1), skip.reason));
            }
        }
    }
    lines
}

pub fn print_captions(slots: &[Slot], params: &CaptionParams) {
    for line in format_captions(slots, params) {
        println!("{line}");
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
