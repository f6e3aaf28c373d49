//! Bitmap caption rendering.
//!
//! Glyphs come from the `font8x8` basic set (ASCII), scaled up with
//! nearest-neighbour so they stay crisp at any integer scale. Captions are
//! already normalized to ASCII letters, digits and spaces before they get here.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};

const GLYPH_SIZE: u32 = 8;
const ELLIPSIS: &str = "...";

/// Pixel width of `text` at `scale`, one glyph cell per character.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale.max(1)
}

/// Pixel height of a line of text at `scale`.
pub fn line_height(scale: u32) -> u32 {
    GLYPH_SIZE * scale.max(1)
}

/// Shorten `text` so it renders within `max_width`, ending in `...` when cut.
///
/// Returns an empty string if not even the ellipsis fits.
pub fn fit_text(text: &str, scale: u32, max_width: u32) -> String {
    if text_width(text, scale) <= max_width {
        return text.to_string();
    }
    let glyph = GLYPH_SIZE * scale.max(1);
    let max_chars = (max_width / glyph) as usize;
    if max_chars < ELLIPSIS.len() {
        return String::new();
    }
    let kept: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

/// Draw `text` with its top-left corner at `(x, y)`. Pixels off the canvas are clipped.
pub fn draw_text(canvas: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1);
    let (width, height) = canvas.dimensions();
    let mut cursor_x = x;

    for ch in text.chars() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // Bit 0 is the leftmost pixel
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let base_x = cursor_x + col * scale;
                let base_y = y + row as u32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (px, py) = (base_x + dx, base_y + dy);
                        if px < width && py < height {
                            canvas.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
        cursor_x += GLYPH_SIZE * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_length() {
        assert_eq!(text_width("abc", 1), 24);
        assert_eq!(text_width("abc", 2), 48);
        assert_eq!(text_width("", 3), 0);
    }

    #[test]
    fn fit_text_keeps_short_text() {
        assert_eq!(fit_text("Ocean", 2, 200), "Ocean");
    }

    #[test]
    fn fit_text_truncates_with_ellipsis() {
        // 10 glyphs of 16px fit in 160px
        let fitted = fit_text("A very long caption indeed", 2, 160);
        assert_eq!(fitted, "A very...");
        assert!(text_width(&fitted, 2) <= 160);
    }

    #[test]
    fn fit_text_too_narrow_is_empty() {
        assert_eq!(fit_text("Ocean Sunset", 2, 40), "");
    }

    #[test]
    fn draw_text_marks_pixels_in_color() {
        let mut canvas = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        draw_text(&mut canvas, "H", 2, 2, 2, Rgb([0, 0, 0]));
        let inked = canvas.pixels().filter(|p| **p == Rgb([0, 0, 0])).count();
        assert!(inked > 0);
        // Nothing drawn left of the origin
        for y in 0..20 {
            assert_eq!(*canvas.get_pixel(0, y), Rgb([255, 255, 255]));
        }
    }

    #[test]
    fn draw_text_clips_at_canvas_edge() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        draw_text(&mut canvas, "WWWW", 5, 5, 3, Rgb([255, 255, 255]));
        assert_eq!(canvas.dimensions(), (10, 10));
    }

    #[test]
    fn space_draws_nothing() {
        let mut canvas = RgbImage::from_pixel(16, 16, Rgb([9, 9, 9]));
        draw_text(&mut canvas, " ", 0, 0, 2, Rgb([200, 0, 0]));
        assert!(canvas.pixels().all(|p| *p == Rgb([9, 9, 9])));
    }
}
