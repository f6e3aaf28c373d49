//! Pure calculation functions for layout geometry.
//!
//! All functions here are pure and testable without any I/O or pixels.

/// Near-square grid shape for `n` images: `(cols, rows)`.
///
/// `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`. Zero images give `(0, 0)`.
///
/// ```
/// # use webcollage::imaging::grid_shape;
/// assert_eq!(grid_shape(5), (3, 2));
/// assert_eq!(grid_shape(9), (3, 3));
/// assert_eq!(grid_shape(10), (4, 3));
/// ```
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let mut cols = (n as f64).sqrt().ceil() as usize;
    // Guard against float error on perfect squares
    while cols * cols < n {
        cols += 1;
    }
    while cols > 1 && (cols - 1) * (cols - 1) >= n {
        cols -= 1;
    }
    (cols, n.div_ceil(cols))
}

/// Cell sizes for a grid laid out on a fixed canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub cols: usize,
    pub rows: usize,
    /// Width of a cell, padding excluded.
    pub cell_width: u32,
    /// Height of a cell including its caption band, padding excluded.
    pub cell_height: u32,
    /// Image sub-region of a cell: `cell_width × (cell_height - caption band)`.
    pub image_width: u32,
    pub image_height: u32,
    pub padding: u32,
}

impl GridGeometry {
    /// Top-left corner of the cell holding image `index` (row-major).
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let row = (index / self.cols) as u32;
        let col = (index % self.cols) as u32;
        (
            self.padding + col * (self.cell_width + self.padding),
            self.padding + row * (self.cell_height + self.padding),
        )
    }
}

/// Divide a `width × height` canvas into a grid for `n` images.
///
/// `padding` separates cells from each other and from the canvas edge;
/// `caption_band` is reserved below each image. Cell and image dimensions
/// never drop below `min_cell`, even when that means the grid overflows a
/// tiny canvas.
pub fn grid_geometry(
    n: usize,
    width: u32,
    height: u32,
    padding: u32,
    caption_band: u32,
    min_cell: u32,
) -> GridGeometry {
    let (cols, rows) = grid_shape(n);
    let min_cell = min_cell.max(1);
    let divide = |total: u32, count: usize| -> u32 {
        if count == 0 {
            return min_cell;
        }
        let count = count as u32;
        let gutters = (count + 1).saturating_mul(padding);
        (total.saturating_sub(gutters) / count).max(min_cell)
    };

    let cell_width = divide(width, cols);
    let cell_height = divide(height, rows).max(caption_band + min_cell);

    GridGeometry {
        cols,
        rows,
        cell_width,
        cell_height,
        image_width: cell_width,
        image_height: cell_height - caption_band,
        padding,
    }
}

/// Largest size with `source`'s aspect ratio that fits inside `bounds`.
///
/// The binding axis matches `bounds` exactly; the other is rounded and
/// clamped to `1..=bound`. Scales up as well as down.
///
/// ```
/// # use webcollage::imaging::fit_within;
/// assert_eq!(fit_within((400, 200), (300, 300)), (300, 150));
/// assert_eq!(fit_within((200, 400), (300, 300)), (150, 300));
/// assert_eq!(fit_within((50, 50), (300, 200)), (200, 200));
/// ```
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;
    if src_w == 0 || src_h == 0 || max_w == 0 || max_h == 0 {
        return (max_w.max(1), max_h.max(1));
    }

    let src_aspect = src_w as f64 / src_h as f64;
    let box_aspect = max_w as f64 / max_h as f64;

    if src_aspect > box_aspect {
        // Wider than the box: width binds
        let h = (max_w as f64 / src_aspect).round() as u32;
        (max_w, h.clamp(1, max_h))
    } else {
        // Taller (or equal): height binds
        let w = (max_h as f64 * src_aspect).round() as u32;
        (w.clamp(1, max_w), max_h)
    }
}

/// Offset that centers `inner` inside `outer` (floored; `0` if it does not fit).
pub fn centered_offset(outer: u32, inner: u32) -> u32 {
    outer.saturating_sub(inner) / 2
}
