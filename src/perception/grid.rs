//! Reference-grid overlay.
//!
//! Draws faint lines every `grid_size` pixels and prints the normalized
//! position of every second line along the top and left margins, so a
//! model reading the image can estimate `[0, 1]` coordinates directly.

use image::{DynamicImage, Rgb, RgbImage};

use crate::perception::glyphs;

const LINE_COLOUR: [u8; 3] = [200, 200, 200];
const LINE_ALPHA: u8 = 100;
const TEXT_COLOUR: [u8; 3] = [150, 150, 150];

pub fn draw_reference_grid(image: &DynamicImage, grid_size: u32) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let (w, h) = canvas.dimensions();
    let step = grid_size.max(1);

    for x in (0..w).step_by(step as usize) {
        for y in 0..h {
            blend_pixel(canvas.get_pixel_mut(x, y), LINE_COLOUR, LINE_ALPHA);
        }
    }
    for y in (0..h).step_by(step as usize) {
        for x in 0..w {
            blend_pixel(canvas.get_pixel_mut(x, y), LINE_COLOUR, LINE_ALPHA);
        }
    }

    for x in (0..w).step_by(step as usize * 2) {
        glyphs::draw_text(&mut canvas, &tick_label(x, w), x + 2, 2, TEXT_COLOUR, 1);
    }
    for y in (0..h).step_by(step as usize * 2) {
        glyphs::draw_text(&mut canvas, &tick_label(y, h), 2, y + 2, TEXT_COLOUR, 1);
    }

    tracing::debug!(grid_size = step, width = w, height = h, "reference grid drawn");
    canvas
}

/// `pos / extent` with at most two decimals, trailing zeros trimmed ("0", "0.2", "0.25").
pub fn tick_label(pos: u32, extent: u32) -> String {
    if extent == 0 {
        return "0".to_string();
    }
    let v = (pos as f64 / extent as f64 * 100.0).round() / 100.0;
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn blend_pixel(pixel: &mut Rgb<u8>, col: [u8; 3], a: u8) {
    let alpha = a as f32 / 255.0;
    for c in 0..3 {
        pixel[c] = (pixel[c] as f32 * (1.0 - alpha) + col[c] as f32 * alpha).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_are_short_fractions() {
        assert_eq!(tick_label(0, 500), "0");
        assert_eq!(tick_label(100, 500), "0.2");
        assert_eq!(tick_label(125, 500), "0.25");
        assert_eq!(tick_label(500, 500), "1");
    }

    #[test]
    fn grid_lines_are_blended_onto_a_copy() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 120, Rgb([0, 0, 0])));
        let out = draw_reference_grid(&src, 50);
        // (50, 60) lies on a vertical line, clear of any tick label.
        let p = out.get_pixel(50, 60).0;
        assert!(p[0] > 0 && p[0] == p[1] && p[1] == p[2]);
        assert_eq!(out.get_pixel(75, 75).0, [0, 0, 0]);
        assert_eq!(src.to_rgb8().get_pixel(50, 60).0, [0, 0, 0]);
    }
}
