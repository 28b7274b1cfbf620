//! Draw numbered candidate boxes onto a copy of a screenshot.
//!
//! Every region gets a rectangle in the box colour and its ordinal label in
//! the label colour just above its top-left corner. This is the image a
//! reasoning model is shown when it is asked to answer with an element ID.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::config::AnnotationConfig;
use crate::errors::{GroundError, GroundResult};
use crate::grounding::types::NormalizedBox;
use crate::perception::glyphs;
use crate::perception::types::Region;

/// Returns a fresh RGB copy of `image` with every region drawn on it.
///
/// On wide screenshots (width above `hires_width`) boxes get one extra pixel
/// of thickness and labels are drawn at 2× so they stay legible.
pub fn annotate_regions(image: &DynamicImage, regions: &[Region], style: &AnnotationConfig) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let (w, _) = canvas.dimensions();
    let hires = w > style.hires_width;
    let label_scale = if hires { 2 } else { 1 };
    let thickness = if hires { style.box_thickness + 1 } else { style.box_thickness };

    for region in regions {
        draw_box(
            &mut canvas,
            region.x,
            region.y,
            region.x + region.w,
            region.y + region.h,
            style.box_colour,
            thickness,
        );
        draw_label(
            &mut canvas,
            &region.label.to_string(),
            region.x,
            region.y,
            style.label_colour,
            label_scale,
        );
    }

    tracing::debug!(count = regions.len(), "regions annotated");
    canvas
}

/// Render a normalized box (and optional caption) onto a copy of `image`.
/// The degenerate "no grounding" box is left undrawn.
pub fn draw_normalized_box(
    image: &RgbImage,
    bbox: &NormalizedBox,
    caption: Option<&str>,
    colour: [u8; 3],
    thickness: u32,
) -> RgbImage {
    let mut canvas = image.clone();
    if bbox.is_degenerate() {
        return canvas;
    }
    let (w, h) = canvas.dimensions();
    let [x0, y0, x1, y1] = bbox.to_array();
    let px = |v: f64, dim: u32| (v * dim as f64).round() as u32;
    let (bx0, by0) = (px(x0, w), px(y0, h));
    draw_box(&mut canvas, bx0, by0, px(x1, w), px(y1, h), colour, thickness);
    if let Some(text) = caption {
        draw_label(&mut canvas, text, bx0, by0, colour, 1);
    }
    canvas
}

/// PNG-encode an annotated image so a caller can persist or upload it.
pub fn encode_png(image: &RgbImage) -> GroundResult<Vec<u8>> {
    let mut out = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| GroundError::Encode(format!("PNG encode: {e}")))?;
    Ok(out)
}

// ── Drawing primitives ──────────────────────────────────────────────────────

/// Rectangle with inclusive corners `(x0, y0)`–`(x1, y1)`, `thickness` px inward.
fn draw_box(canvas: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, col: [u8; 3], thickness: u32) {
    for t in 0..thickness.max(1) {
        let (lx, ty) = (x0 + t, y0 + t);
        let (rx, by) = (x1.saturating_sub(t), y1.saturating_sub(t));
        if rx < lx || by < ty {
            break;
        }
        let rect = Rect::at(lx as i32, ty as i32).of_size(rx - lx + 1, by - ty + 1);
        draw_hollow_rect_mut(canvas, rect, Rgb(col));
    }
}

/// Label text above `(x, y)` on a darkened backdrop; pushed down when it
/// would leave the top of the image.
fn draw_label(canvas: &mut RgbImage, text: &str, x: u32, y: u32, col: [u8; 3], scale: u32) {
    let (w, h) = canvas.dimensions();
    let pad = scale;
    let (tw, th) = glyphs::text_size(text, scale);
    let label_w = tw + pad * 2;
    let label_h = th + pad * 2;
    let top = y.saturating_sub(label_h + 1);

    for dy in 0..label_h {
        for dx in 0..label_w {
            let (px, py) = (x + dx, top + dy);
            if px < w && py < h {
                let p = canvas.get_pixel_mut(px, py);
                p[0] = (p[0] as f32 * 0.2) as u8;
                p[1] = (p[1] as f32 * 0.2) as u8;
                p[2] = (p[2] as f32 * 0.2) as u8;
            }
        }
    }
    glyphs::draw_text(canvas, text, x + pad, top + pad, col, scale);
}
