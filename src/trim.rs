//! Background trim: crop away uniform margins, then fit to the target box.
//!
//! A pixel counts as content when any channel differs from the background by
//! more than the tolerance, so resampling fringes along the mosaic edge are
//! treated as background. The tight bounding box of all content is cropped and
//! resampled (aspect preserved) to fit inside the target size. The result may
//! be smaller than the target on the non-binding axis.
//!
//! Resampling can fade a sparse edge back into the background, so the fitted
//! result is checked again and re-cropped until its content reaches every
//! edge (at most [`MAX_REFIT_PASSES`] times). Trimming an already-trimmed
//! canvas then leaves it unchanged: its content touches every edge and it
//! already fits the target exactly on one axis.

use crate::imaging::{TrimParams, fit_within, resample};
use crate::types::{Color, Rect};
use image::{RgbImage, imageops};
use log::debug;

/// Extra crop-and-fit rounds allowed after the first.
pub const MAX_REFIT_PASSES: usize = 4;

/// Output of [`trim_with_bounds`].
#[derive(Debug, Clone)]
pub struct Trimmed {
    pub canvas: RgbImage,
    /// Content bounding box in the input's coordinates; `None` if there was none.
    pub content: Option<Rect>,
}

/// Tight bounding box of every pixel that differs from `background` by more
/// than `tolerance` on some channel.
pub fn content_bounds(canvas: &RgbImage, background: Color, tolerance: u8) -> Option<Rect> {
    let bg = [background.r, background.g, background.b];
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (x, y, pixel) in canvas.enumerate_pixels() {
        let is_content = pixel
            .0
            .iter()
            .zip(bg)
            .any(|(&channel, reference)| channel.abs_diff(reference) > tolerance);
        if !is_content {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }

    bounds.map(|(min_x, min_y, max_x, max_y)| {
        Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    })
}

/// Crop `canvas` to its content and fit it inside `target_width × target_height`.
pub fn trim(
    canvas: &RgbImage,
    background: Color,
    target_width: u32,
    target_height: u32,
    params: &TrimParams,
) -> RgbImage {
    trim_with_bounds(canvas, background, target_width, target_height, params).canvas
}

/// [`trim`], also reporting the content box that was kept.
pub fn trim_with_bounds(
    canvas: &RgbImage,
    background: Color,
    target_width: u32,
    target_height: u32,
    params: &TrimParams,
) -> Trimmed {
    let Some(content) = content_bounds(canvas, background, params.tolerance) else {
        debug!("Nothing to trim: canvas is all background");
        return Trimmed {
            canvas: canvas.clone(),
            content: None,
        };
    };

    let mut fitted = crop_and_fit(canvas, content, target_width, target_height);
    for _ in 0..MAX_REFIT_PASSES {
        let (width, height) = fitted.dimensions();
        match content_bounds(&fitted, background, params.tolerance) {
            Some(inner) if inner != Rect::new(0, 0, width, height) => {
                debug!("Edges of {width}x{height} faded after resampling; refitting {inner:?}");
                fitted = crop_and_fit(&fitted, inner, target_width, target_height);
            }
            _ => break,
        }
    }

    Trimmed {
        canvas: fitted,
        content: Some(content),
    }
}

fn crop_and_fit(
    canvas: &RgbImage,
    content: Rect,
    target_width: u32,
    target_height: u32,
) -> RgbImage {
    let cropped = imageops::crop_imm(canvas, content.x, content.y, content.width, content.height)
        .to_image();
    let (width, height) = fit_within(
        (content.width, content.height),
        (target_width.max(1), target_height.max(1)),
    );
    debug!(
        "Trimmed {}x{} to content {}x{} at ({}, {}), fitted to {}x{}",
        canvas.width(),
        canvas.height(),
        content.width,
        content.height,
        content.x,
        content.y,
        width,
        height
    );
    resample(&cropped, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::solid_image;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const GREEN: Rgb<u8> = Rgb([10, 160, 40]);

    /// White canvas with a green block at `rect`.
    fn canvas_with_block(width: u32, height: u32, rect: Rect) -> RgbImage {
        let mut canvas = solid_image(width, height, WHITE);
        let block = solid_image(rect.width, rect.height, GREEN);
        imageops::replace(&mut canvas, &block, rect.x as i64, rect.y as i64);
        canvas
    }

    // =========================================================================
    // content_bounds
    // =========================================================================

    #[test]
    fn bounds_of_block() {
        let canvas = canvas_with_block(100, 80, Rect::new(10, 5, 30, 40));
        assert_eq!(
            content_bounds(&canvas, Color::WHITE, 10),
            Some(Rect::new(10, 5, 30, 40))
        );
    }

    #[test]
    fn bounds_none_for_blank_canvas() {
        let canvas = solid_image(50, 50, WHITE);
        assert_eq!(content_bounds(&canvas, Color::WHITE, 10), None);
    }

    #[test]
    fn bounds_ignore_near_background_fringe() {
        let mut canvas = canvas_with_block(60, 60, Rect::new(20, 20, 10, 10));
        canvas.put_pixel(0, 0, Rgb([250, 252, 246]));
        assert_eq!(
            content_bounds(&canvas, Color::WHITE, 10),
            Some(Rect::new(20, 20, 10, 10))
        );
        // Zero tolerance counts it
        assert_eq!(
            content_bounds(&canvas, Color::WHITE, 0),
            Some(Rect::new(0, 0, 30, 30))
        );
    }

    #[test]
    fn bounds_single_pixel() {
        let mut canvas = solid_image(10, 10, WHITE);
        canvas.put_pixel(9, 9, Rgb([0, 0, 0]));
        assert_eq!(
            content_bounds(&canvas, Color::WHITE, 10),
            Some(Rect::new(9, 9, 1, 1))
        );
    }

    // =========================================================================
    // trim
    // =========================================================================

    #[test]
    fn blank_canvas_is_returned_unchanged() {
        let canvas = solid_image(40, 30, WHITE);
        let result = trim_with_bounds(&canvas, Color::WHITE, 100, 100, &TrimParams::default());
        assert_eq!(result.canvas, canvas);
        assert_eq!(result.content, None);
    }

    #[test]
    fn margin_is_removed_and_content_fitted() {
        // 200x100 block inside a 260x140 canvas, target 400x400
        let canvas = canvas_with_block(260, 140, Rect::new(30, 20, 200, 100));
        let result = trim(&canvas, Color::WHITE, 400, 400, &TrimParams::default());
        assert_eq!(result.dimensions(), (400, 200));
        assert_eq!(*result.get_pixel(200, 100), GREEN);
    }

    #[test]
    fn trim_shrinks_oversized_mosaic() {
        let canvas = canvas_with_block(1010, 502, Rect::new(0, 0, 1004, 500));
        let result = trim(&canvas, Color::WHITE, 1000, 500, &TrimParams::default());
        assert_eq!(result.dimensions(), (1000, 498));
    }

    #[test]
    fn trim_is_idempotent() {
        let canvas = canvas_with_block(300, 220, Rect::new(17, 9, 250, 180));
        let params = TrimParams::default();
        let once = trim(&canvas, Color::WHITE, 640, 480, &params);
        let twice = trim(&once, Color::WHITE, 640, 480, &params);
        assert_eq!(once.dimensions(), twice.dimensions());
        assert_eq!(once, twice);
    }

    #[test]
    fn faint_edge_pixel_does_not_break_idempotence() {
        // The light corner pixel counts as content but fades away when the
        // 400x400 canvas is shrunk to 100x100.
        let mut canvas = solid_image(400, 400, WHITE);
        canvas.put_pixel(0, 0, Rgb([240, 240, 240]));
        let block = solid_image(100, 100, Rgb([0, 0, 0]));
        imageops::replace(&mut canvas, &block, 300, 300);

        let params = TrimParams::default();
        let once = trim(&canvas, Color::WHITE, 100, 100, &params);
        let twice = trim(&once, Color::WHITE, 100, 100, &params);
        assert_eq!(once.dimensions(), (100, 100));
        assert_eq!(once, twice);
        assert_eq!(
            content_bounds(&once, Color::WHITE, params.tolerance),
            Some(Rect::new(0, 0, 100, 100))
        );
    }

    #[test]
    fn refit_reports_the_original_content_box() {
        let mut canvas = solid_image(400, 400, WHITE);
        canvas.put_pixel(0, 0, Rgb([240, 240, 240]));
        imageops::replace(&mut canvas, &solid_image(100, 100, Rgb([0, 0, 0])), 300, 300);
        let result = trim_with_bounds(&canvas, Color::WHITE, 100, 100, &TrimParams::default());
        assert_eq!(result.content, Some(Rect::new(0, 0, 400, 400)));
    }

    #[test]
    fn trim_respects_background_color() {
        let canvas = solid_image(20, 20, GREEN);
        let result = trim_with_bounds(&canvas, Color::new(10, 160, 40), 10, 10, &TrimParams::default());
        assert_eq!(result.content, None);

        let result = trim_with_bounds(&canvas, Color::BLACK, 10, 10, &TrimParams::default());
        assert_eq!(result.content, Some(Rect::new(0, 0, 20, 20)));
        assert_eq!(result.canvas.dimensions(), (10, 10));
    }
}
