//! Grid layout: a near-square grid of fixed cells, optionally captioned.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ pad ┌────────┐ pad ┌────────┐ pad …  │
//! │     │ image  │     │ image  │        │  image sub-region: the image is
//! │     │ region │     │ region │        │  fitted (aspect preserved) and
//! │     ├────────┤     ├────────┤        │  centered on both axes
//! │     │caption │     │caption │        │  caption band (captions only)
//! │     └────────┘     └────────┘        │
//! │ pad                                  │
//! └──────────────────────────────────────┘
//! ```
//!
//! Images fill cells row-major in input order. Cells never overlap, so paste
//! order has no effect on the result. An input that failed to load keeps its
//! cell and leaves it background-colored. The canvas is always exactly the
//! requested size.

use crate::caption::caption_for;
use crate::collage::{ComposeError, Composition, Slot, validate_canvas};
use crate::imaging::text::{draw_text, fit_text, line_height, text_width};
use crate::imaging::{Canvas, GridParams, centered_offset, fit_within, grid_geometry, resample};
use crate::types::{LayoutCell, LayoutMode, Rect};
use image::{RgbImage, imageops};
use log::debug;

/// Compose `slots` into a grid on a `canvas.width × canvas.height` bitmap.
pub fn compose_grid(
    slots: &[Slot],
    canvas: &Canvas,
    params: &GridParams,
) -> Result<Composition, ComposeError> {
    validate_canvas(canvas)?;

    let background = canvas.background.to_rgb();
    let mut bitmap = RgbImage::from_pixel(canvas.width, canvas.height, background);
    let mut cells = Vec::new();
    let mut skipped = Vec::new();

    if slots.is_empty() {
        return Ok(Composition {
            mode: LayoutMode::Grid,
            canvas: bitmap,
            cells,
            skipped,
            trim: None,
        });
    }

    let geometry = grid_geometry(
        slots.len(),
        canvas.width,
        canvas.height,
        params.padding,
        params.reserved_band(),
        params.min_cell,
    );
    debug!(
        "Grid {}x{}: cell {}x{}, image region {}x{}",
        geometry.cols,
        geometry.rows,
        geometry.cell_width,
        geometry.cell_height,
        geometry.image_width,
        geometry.image_height
    );
    let text_color = canvas.background.contrasting_text().to_rgb();

    for (slot_index, slot) in slots.iter().enumerate() {
        let source = match slot {
            Ok(source) => source,
            Err(skip) => {
                skipped.push(skip.clone());
                continue;
            }
        };

        let (cell_x, cell_y) = geometry.cell_origin(slot_index);
        let (width, height) = fit_within(
            (source.width(), source.height()),
            (geometry.image_width, geometry.image_height),
        );
        let rect = Rect::new(
            cell_x + centered_offset(geometry.image_width, width),
            cell_y + centered_offset(geometry.image_height, height),
            width,
            height,
        );

        let resized = resample(source.pixels(), width, height);
        imageops::replace(&mut bitmap, &resized, rect.x as i64, rect.y as i64);

        let caption = if params.with_captions {
            caption_for(source, &params.captions)
        } else {
            None
        };

        if let Some(caption) = &caption {
            let text = fit_text(caption.as_str(), params.text_scale, geometry.cell_width);
            if !text.is_empty() {
                let text_x = cell_x
                    + centered_offset(geometry.cell_width, text_width(&text, params.text_scale));
                // Keep the whole line inside the band even with an oversized gap
                let gap = params
                    .caption_gap
                    .min(params.caption_band.saturating_sub(line_height(params.text_scale)));
                let text_y = cell_y + geometry.image_height + gap;
                draw_text(&mut bitmap, &text, text_x, text_y, params.text_scale, text_color);
            }
        }

        cells.push(LayoutCell {
            index: source.index,
            rect,
            caption,
        });
    }

    Ok(Composition {
        mode: LayoutMode::Grid,
        canvas: bitmap,
        cells,
        skipped,
        trim: None,
    })
}
