//! Dense layout: a gap-free, justified mosaic of rows.
//!
//! Every image keeps its aspect ratio and is only scaled uniformly. Images
//! are grouped into rows; each row is sized so it spans the canvas width,
//! then all row heights are scaled together so they stack to the target
//! height.
//!
//! ## Row partition
//!
//! Images are sorted widest first (stable, so equal ratios keep input order).
//! For each candidate row count `R` in `round(sqrt(n)) ± row_band`, rows are
//! filled greedily: a non-empty row closes once it holds `ceil(n / R)` images
//! or when the next image would push it past `width_slack × canvas width` at
//! the ideal row height `canvas height / R`. Each partition is scored:
//!
//! ```text
//! waste = Σ_rows ( |natural_height − H / R| + |count − n / R| × count_penalty )
//!       + |H / Σ natural_height − 1| × W × aspect_penalty
//! ```
//!
//! where a row's natural height is `W / Σ aspect_ratio`. The first partition
//! with the lowest waste wins. Fewer than `min_images_for_search` images skip
//! the search and form a single row.
//!
//! The aspect term compares the stacked natural height with the target
//! height. A partition whose rows stack to exactly `H` has the target's own
//! shape, so on square targets this is the same as asking for an overall
//! aspect ratio of 1.
//!
//! The mosaic is sized to its content. It is usually within a few pixels of
//! the target; [`trim`](crate::trim) reconciles the rest. No row is allowed
//! to grow past `width_slack × W`: when stretching to the target height
//! would do that (a lone panorama, say), all rows are shortened instead and
//! the mosaic comes out shorter than the target.

use crate::collage::{ComposeError, Composition, Slot, validate_canvas};
use crate::imaging::{Canvas, DenseParams, resample};
use crate::types::{ImageSource, LayoutCell, LayoutMode, Rect};
use image::{RgbImage, imageops};
use log::debug;

/// A group of images sharing one horizontal band.
///
/// Only membership is stored; the row's width and height are derived from
/// the members' aspect ratios whenever they are needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Positions into the ratio slice the row was planned from.
    pub members: Vec<usize>,
    /// Σ aspect ratio: the row's width at a height of one pixel.
    pub unit_width: f64,
}

impl Row {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            unit_width: 0.0,
        }
    }

    fn push(&mut self, position: usize, ratio: f64) {
        self.members.push(position);
        self.unit_width += ratio;
    }

    /// Height at which the row spans exactly `width` pixels.
    pub fn natural_height(&self, width: f64) -> f64 {
        width / self.unit_width
    }
}

/// Compose `slots` into a dense mosaic. Skipped slots are left out.
pub fn compose_dense(
    slots: &[Slot],
    canvas: &Canvas,
    params: &DenseParams,
) -> Result<Composition, ComposeError> {
    validate_canvas(canvas)?;

    let background = canvas.background.to_rgb();
    let mut skipped = Vec::new();
    let mut sources: Vec<&ImageSource> = Vec::new();
    for slot in slots {
        match slot {
            Ok(source) => sources.push(source),
            Err(skip) => skipped.push(skip.clone()),
        }
    }

    if sources.is_empty() {
        return Ok(Composition {
            mode: LayoutMode::Dense,
            canvas: RgbImage::from_pixel(canvas.width, canvas.height, background),
            cells: Vec::new(),
            skipped,
            trim: None,
        });
    }

    let order = sort_by_aspect(&sources.iter().map(|s| s.aspect_ratio()).collect::<Vec<_>>());
    let sorted: Vec<&ImageSource> = order.iter().map(|&i| sources[i]).collect();
    let ratios: Vec<f64> = sorted.iter().map(|s| s.aspect_ratio()).collect();

    let rows = plan_rows(&ratios, canvas.width, canvas.height, params);
    let heights = row_heights(&rows, canvas, params.width_slack);

    // Measure first so the mosaic can be allocated at its exact size
    let placements: Vec<Vec<(usize, u32)>> = rows
        .iter()
        .zip(&heights)
        .map(|(row, &height)| {
            row.members
                .iter()
                .map(|&pos| (pos, scaled_width(height, ratios[pos])))
                .collect()
        })
        .collect();
    let mosaic_width = placements
        .iter()
        .map(|row| row.iter().fold(0u32, |sum, &(_, w)| sum.saturating_add(w)))
        .max()
        .unwrap_or(canvas.width);
    let mosaic_height = heights.iter().fold(0u32, |sum, &h| sum.saturating_add(h));
    debug!(
        "Dense mosaic {}x{} from {} rows of {:?} images",
        mosaic_width,
        mosaic_height,
        rows.len(),
        rows.iter().map(|r| r.members.len()).collect::<Vec<_>>()
    );

    let mut bitmap = RgbImage::from_pixel(mosaic_width, mosaic_height, background);
    let mut cells = Vec::with_capacity(sorted.len());
    let mut y = 0u32;
    for (row, &height) in placements.iter().zip(&heights) {
        let mut x = 0u32;
        for &(pos, width) in row {
            let source = sorted[pos];
            let resized = resample(source.pixels(), width, height);
            imageops::replace(&mut bitmap, &resized, x as i64, y as i64);
            cells.push(LayoutCell {
                index: source.index,
                rect: Rect::new(x, y, width, height),
                caption: None,
            });
            x = x.saturating_add(width);
        }
        y = y.saturating_add(height);
    }

    Ok(Composition {
        mode: LayoutMode::Dense,
        canvas: bitmap,
        cells,
        skipped,
        trim: None,
    })
}

/// Indices of `ratios` ordered widest first; ties keep their original order.
pub fn sort_by_aspect(ratios: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ratios.len()).collect();
    order.sort_by(|&a, &b| ratios[b].total_cmp(&ratios[a]));
    order
}

/// Choose the row partition for already-sorted `ratios`.
pub fn plan_rows(ratios: &[f64], width: u32, height: u32, params: &DenseParams) -> Vec<Row> {
    let n = ratios.len();
    if n == 0 {
        return Vec::new();
    }
    if n < params.min_images_for_search {
        return vec![single_row(ratios)];
    }

    let center = ((n as f64).sqrt().round() as usize).clamp(1, n);
    let low = center.saturating_sub(params.row_band).max(1);
    let high = (center + params.row_band).min(n);

    let mut best: Option<(f64, Vec<Row>)> = None;
    for row_count in low..=high {
        let rows = partition_rows(ratios, row_count, width, height, params.width_slack);
        let waste = waste_score(&rows, row_count, n, width, height, params);
        debug!("Row count {row_count}: {} rows, waste {waste:.2}", rows.len());
        if best.as_ref().is_none_or(|(lowest, _)| waste < *lowest) {
            best = Some((waste, rows));
        }
    }
    best.map(|(_, rows)| rows)
        .unwrap_or_else(|| vec![single_row(ratios)])
}

fn single_row(ratios: &[f64]) -> Row {
    let mut row = Row::new();
    for (pos, &ratio) in ratios.iter().enumerate() {
        row.push(pos, ratio);
    }
    row
}

/// Greedy fill of `ratios` aiming for `row_count` rows.
pub fn partition_rows(
    ratios: &[f64],
    row_count: usize,
    width: u32,
    height: u32,
    width_slack: f64,
) -> Vec<Row> {
    let row_count = row_count.max(1);
    let ideal_count = ratios.len().div_ceil(row_count);
    let ideal_height = height as f64 / row_count as f64;
    let max_width = width as f64 * width_slack;

    let mut rows = Vec::new();
    let mut current = Row::new();
    for (pos, &ratio) in ratios.iter().enumerate() {
        if !current.members.is_empty() {
            let full = current.members.len() >= ideal_count;
            let overflows = (current.unit_width + ratio) * ideal_height > max_width;
            if full || overflows {
                rows.push(std::mem::replace(&mut current, Row::new()));
            }
        }
        current.push(pos, ratio);
    }
    if !current.members.is_empty() {
        rows.push(current);
    }
    rows
}

/// How far a partition is from evenly sized rows on a target-shaped canvas.
pub fn waste_score(
    rows: &[Row],
    row_count: usize,
    n: usize,
    width: u32,
    height: u32,
    params: &DenseParams,
) -> f64 {
    let width = width as f64;
    let height = height as f64;
    let row_count = row_count.max(1) as f64;
    let ideal_height = height / row_count;
    let ideal_count = n as f64 / row_count;

    let mut total_natural = 0.0;
    let mut waste = 0.0;
    for row in rows {
        let natural = row.natural_height(width);
        total_natural += natural;
        waste += (natural - ideal_height).abs();
        waste += (row.members.len() as f64 - ideal_count).abs() * params.count_penalty;
    }
    if total_natural > 0.0 {
        waste += (height / total_natural - 1.0).abs() * width * params.aspect_penalty;
    }
    waste
}

/// Final pixel height of each row.
///
/// Rows are stretched together to the canvas height unless that would make
/// some row wider than `width_slack × canvas width`; then every row shrinks
/// by the same factor until the widest one fits.
fn row_heights(rows: &[Row], canvas: &Canvas, width_slack: f64) -> Vec<u32> {
    let width = canvas.width as f64;
    let naturals: Vec<f64> = rows.iter().map(|row| row.natural_height(width)).collect();
    let heights = scale_row_heights(&naturals, canvas.height);

    let max_width = width * width_slack;
    let widest = rows
        .iter()
        .zip(&heights)
        .map(|(row, &height)| row.unit_width * height as f64)
        .fold(0.0, f64::max);
    if widest <= max_width {
        return heights;
    }

    let limit = (canvas.height as f64 * max_width / widest).floor() as u32;
    let limit = limit.max(rows.len() as u32);
    debug!(
        "Widest row {widest:.0}px exceeds {max_width:.0}px; stacking rows to {limit}px instead of {}px",
        canvas.height
    );
    scale_row_heights(&naturals, limit)
}

/// Scale natural row heights so they sum to `target`.
///
/// Row boundaries are rounded cumulatively, so rounding error never builds up
/// down the canvas. Each row keeps at least one pixel.
pub fn scale_row_heights(naturals: &[f64], target: u32) -> Vec<u32> {
    let total: f64 = naturals.iter().sum();
    if total <= 0.0 {
        return vec![1; naturals.len()];
    }
    let scale = target as f64 / total;
    let mut running = 0.0;
    let mut previous_edge = 0u32;
    naturals
        .iter()
        .map(|natural| {
            running += natural * scale;
            let edge = running.round() as u32;
            let height = edge.saturating_sub(previous_edge).max(1);
            previous_edge = previous_edge.max(edge);
            height
        })
        .collect()
}

fn scaled_width(height: u32, ratio: f64) -> u32 {
    ((height as f64 * ratio).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collage::{SkipReason, Skipped};
    use crate::test_helpers::{solid_image, source};
    use crate::types::Color;
    use image::Rgb;

    const BLUE: Rgb<u8> = Rgb([20, 40, 200]);

    fn white(width: u32, height: u32) -> Canvas {
        Canvas::new(width, height, Color::WHITE)
    }

    fn sources(sizes: &[(u32, u32)]) -> Vec<Slot> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| Ok(source(i, solid_image(w, h, BLUE))))
            .collect()
    }

    fn rows_of(cells: &[LayoutCell]) -> Vec<Vec<&LayoutCell>> {
        let mut rows: Vec<Vec<&LayoutCell>> = Vec::new();
        for cell in cells {
            match rows.last_mut() {
                Some(row) if row[0].rect.y == cell.rect.y => row.push(cell),
                _ => rows.push(vec![cell]),
            }
        }
        rows
    }

    // =========================================================================
    // Ordering and partition
    // =========================================================================

    #[test]
    fn sort_is_widest_first_and_stable() {
        let order = sort_by_aspect(&[1.0, 2.0, 1.0, 0.5, 2.0]);
        assert_eq!(order, vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn small_sets_form_one_row() {
        let rows = plan_rows(&[1.5, 1.0], 1000, 1000, &DenseParams::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].members, vec![0, 1]);
        assert!((rows[0].unit_width - 2.5).abs() < 1e-9);
    }

    #[test]
    fn partition_closes_rows_at_ideal_count() {
        let rows = partition_rows(&[1.0; 6], 2, 1000, 1000, 100.0);
        let counts: Vec<_> = rows.iter().map(|r| r.members.len()).collect();
        assert_eq!(counts, vec![3, 3]);
    }

    #[test]
    fn partition_closes_rows_on_width_overflow() {
        // Ideal height 500: two 2:1 images already span 2000px > 1200
        let rows = partition_rows(&[2.0, 2.0, 2.0], 2, 1000, 1000, 1.2);
        assert!(rows.iter().all(|r| r.members.len() == 1));
    }

    #[test]
    fn partition_covers_every_image_once() {
        let ratios = [3.0, 2.0, 1.7, 1.5, 1.0, 0.8, 0.75, 0.5, 0.5];
        for row_count in 1..=ratios.len() {
            let rows = partition_rows(&ratios, row_count, 1600, 900, 1.2);
            let members: Vec<usize> = rows.iter().flat_map(|r| r.members.clone()).collect();
            assert_eq!(members, (0..ratios.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn square_images_prefer_square_partition() {
        let rows = plan_rows(&[1.0; 9], 900, 900, &DenseParams::default());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.members.len() == 3));
    }

    #[test]
    fn waste_is_zero_for_perfect_tiling() {
        let rows = partition_rows(&[1.0; 4], 2, 1000, 1000, 1.2);
        let waste = waste_score(&rows, 2, 4, 1000, 1000, &DenseParams::default());
        assert!(waste.abs() < 1e-9, "waste = {waste}");
    }

    #[test]
    fn row_heights_sum_to_target() {
        let heights = scale_row_heights(&[333.3, 250.0, 416.7, 199.9], 1000);
        assert_eq!(heights.iter().sum::<u32>(), 1000);
    }

    #[test]
    fn row_heights_never_zero() {
        let heights = scale_row_heights(&[1000.0, 0.01, 1000.0], 100);
        assert!(heights.iter().all(|&h| h >= 1));
    }

    // =========================================================================
    // compose_dense
    // =========================================================================

    #[test]
    fn empty_input_is_background_canvas() {
        let result = compose_dense(&[], &white(2000, 2000), &DenseParams::default()).unwrap();
        assert_eq!(result.canvas.dimensions(), (2000, 2000));
        assert!(result.canvas.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn single_image_fills_matching_canvas() {
        let slots = sources(&[(400, 200)]);
        let result = compose_dense(&slots, &white(1000, 500), &DenseParams::default()).unwrap();
        assert_eq!(result.canvas.dimensions(), (1000, 500));
        assert_eq!(result.cells[0].rect, Rect::new(0, 0, 1000, 500));
    }

    #[test]
    fn rows_are_gap_free() {
        let slots = sources(&[
            (1600, 900),
            (900, 1600),
            (1000, 1000),
            (1200, 800),
            (800, 1200),
            (3000, 1000),
            (640, 480),
        ]);
        let result = compose_dense(&slots, &white(1200, 900), &DenseParams::default()).unwrap();
        assert_eq!(result.cells.len(), 7);

        let mut expected_y = 0;
        for row in rows_of(&result.cells) {
            assert_eq!(row[0].rect.y, expected_y);
            let mut expected_x = 0;
            for cell in &row {
                assert_eq!(cell.rect.x, expected_x, "gap before image {}", cell.index);
                assert_eq!(cell.rect.height, row[0].rect.height);
                expected_x = cell.rect.right();
            }
            expected_y += row[0].rect.height;
        }
        assert_eq!(expected_y, 900);
    }

    #[test]
    fn aspect_ratios_are_preserved() {
        let slots = sources(&[(1600, 900), (900, 1600), (1000, 1000), (1200, 800)]);
        let result = compose_dense(&slots, &white(1000, 1000), &DenseParams::default()).unwrap();
        for cell in &result.cells {
            let Ok(original) = &slots[cell.index] else {
                unreachable!()
            };
            let expected = cell.rect.height as f64 * original.aspect_ratio();
            assert!((cell.rect.width as f64 - expected).abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn panorama_row_is_capped_at_slack_width() {
        let slots = sources(&[(4000, 100)]);
        let result = compose_dense(&slots, &white(2000, 2000), &DenseParams::default()).unwrap();
        assert_eq!(result.canvas.dimensions(), (2400, 60));
        assert_eq!(result.cells[0].rect, Rect::new(0, 0, 2400, 60));
    }

    #[test]
    fn row_width_cap_keeps_every_row_within_slack() {
        let slots = sources(&[(6000, 100), (5000, 100), (100, 100), (100, 100)]);
        let params = DenseParams::default();
        let result = compose_dense(&slots, &white(1000, 1000), &params).unwrap();
        for row in rows_of(&result.cells) {
            let right = row.last().map(|cell| cell.rect.right()).unwrap_or(0);
            assert!(right as f64 <= 1000.0 * params.width_slack + row.len() as f64);
        }
    }

    #[test]
    fn skipped_inputs_are_excluded() {
        let mut slots = sources(&[(100, 100), (200, 100)]);
        slots.insert(
            1,
            Err(Skipped {
                index: 1,
                source: "gone.jpg".to_string(),
                reason: SkipReason::Unreadable("not found".to_string()),
            }),
        );
        let result = compose_dense(&slots, &white(600, 200), &DenseParams::default()).unwrap();
        assert_eq!(result.cells.len(), 2);
        assert_eq!(result.skipped.len(), 1);
    }

    #[test]
    fn layout_is_deterministic() {
        let slots = sources(&[(300, 200), (200, 300), (300, 200), (250, 250), (500, 100)]);
        let a = compose_dense(&slots, &white(800, 600), &DenseParams::default()).unwrap();
        let b = compose_dense(&slots, &white(800, 600), &DenseParams::default()).unwrap();
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.canvas, b.canvas);
    }
}
