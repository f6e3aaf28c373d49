//! # webcollage
//!
//! Assembles independently sized photographs into one composite image of a
//! requested size, either as a captioned grid or as a dense, gap-free mosaic
//! that keeps every photo's aspect ratio.
//!
//! # Architecture: Load → Lay Out → Trim
//!
//! ```text
//! 1. Load     paths         →  [Slot]         (decode, keep failures as Skipped)
//! 2. Lay out  [Slot]        →  raw canvas     (grid cells or justified rows)
//! 3. Trim     raw canvas    →  final canvas   (dense only: crop margins, fit target)
//! ```
//!
//! Each stage is a plain function over values. Nothing is cached between
//! calls and no state is shared, so identical inputs always give identical
//! pixels, and two compositions can run on separate threads without
//! coordination.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collage`] | Entry point: loads sources, dispatches to a composer, trims dense output |
//! | [`grid`] | Near-square grid of fixed cells with optional captions |
//! | [`dense`] | Row-partition search and gap-free mosaic rendering |
//! | [`trim`] | Background bounding box, crop, and fit to the target box |
//! | [`caption`] | Caption extraction from embedded generation metadata |
//! | [`types`] | Shared value types (`Color`, `Rect`, `LayoutCell`, `ImageSource`) |
//! | [`imaging`] | Decoding backend, PNG text chunks, geometry math, bitmap text |
//! | [`config`] | `config.toml` loading, validation, merging, stock defaults |
//! | [`export`] | JPEG/PNG encoding of the finished canvas |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Skip, Don't Fail
//!
//! A collage of forty photos should not be lost because one file is corrupt.
//! Every input becomes a [`collage::Slot`]: a decoded image or a
//! [`collage::Skipped`] entry with a typed reason. The composition carries
//! the skipped list back to the caller. The only hard error is a zero target
//! dimension, rejected before any work starts.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and Lanczos3 resampling use the `image` crate, caption glyphs come
//! from `font8x8`, and PNG text metadata is read with `png`. No system
//! libraries, no fonts on disk.
//!
//! ## Explicit Parameters
//!
//! Composers never read configuration. [`config::CollageConfig`] is resolved
//! once by the caller and turned into parameter structs
//! ([`imaging::GridParams`], [`imaging::DenseParams`], ...) that are passed
//! down explicitly.

pub mod caption;
pub mod collage;
pub mod config;
pub mod dense;
pub mod export;
pub mod grid;
pub mod imaging;
pub mod output;
pub mod trim;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
