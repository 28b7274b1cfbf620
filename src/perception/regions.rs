//! Region extraction: outer contours → bounding boxes → size filter → labels.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};

use crate::config::DetectorConfig;
use crate::perception::types::{EdgeMap, Region};

#[derive(Debug, Clone, Copy)]
pub struct RegionExtractor {
    min_side: u32,
    max_area_ratio: f64,
}

impl RegionExtractor {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            min_side: config.min_side,
            max_area_ratio: config.max_area_ratio,
        }
    }

    /// Trace outermost contours of `edges` and keep the plausible UI-sized ones.
    ///
    /// `image_size` is the source image's `(W, H)`. Regions come back in
    /// raster discovery order, labelled `1..=N`. An empty result is a normal
    /// outcome, not an error.
    pub fn extract(&self, edges: &EdgeMap, image_size: (u32, u32)) -> Vec<Region> {
        if edges.width() == 0 || edges.height() == 0 {
            return Vec::new();
        }
        let contours: Vec<Contour<u32>> = find_contours(&framed(edges));
        let total = contours.len();
        let max_area = image_size.0 as f64 * image_size.1 as f64 * self.max_area_ratio;

        let mut regions = Vec::new();
        for contour in contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        {
            let Some((fx, fy, w, h)) = bounding_rect(contour) else { continue };
            let (x, y) = (fx.saturating_sub(1), fy.saturating_sub(1));
            if w < self.min_side || h < self.min_side || (w as f64 * h as f64) > max_area {
                continue;
            }
            regions.push(Region {
                label: regions.len() as u32 + 1,
                x,
                y,
                w,
                h,
            });
        }

        tracing::debug!(contours = total, kept = regions.len(), "regions extracted");
        regions
    }
}

/// 0/255 copy of `edges` inside a one-pixel empty frame. Contour tracing
/// classifies borders that start on the image's first column as holes; the
/// frame keeps every component off the edge so its outer border is found.
/// Contour points come back shifted by `(+1, +1)`.
fn framed(edges: &EdgeMap) -> GrayImage {
    let (w, h) = edges.dimensions();
    GrayImage::from_fn(w + 2, h + 2, |x, y| {
        let inside = (1..=w).contains(&x) && (1..=h).contains(&y);
        Luma([if inside && edges.get(x - 1, y - 1) { 255 } else { 0 }])
    })
}

/// `(x, y, w, h)` of the smallest upright rectangle covering every contour point.
fn bounding_rect(contour: &Contour<u32>) -> Option<(u32, u32, u32, u32)> {
    let first = contour.points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in &contour.points[1..] {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some((x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}
