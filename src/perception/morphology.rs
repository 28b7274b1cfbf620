//! Single-pass dilation with a rectangular structuring element.
//!
//! The default 20×3 element reaches far horizontally and barely vertically,
//! so strokes broken along a row merge without neighbouring rows bleeding
//! into each other.

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, Mask};

use crate::config::{DetectorConfig, MAX_DILATE_SIDE};
use crate::perception::types::EdgeMap;

#[derive(Debug, Clone, Copy)]
pub struct EdgeConsolidator {
    width: u32,
    height: u32,
}

impl EdgeConsolidator {
    pub fn new(config: &DetectorConfig) -> Self {
        Self::with_element(config.dilate_width, config.dilate_height)
    }

    pub fn with_element(width: u32, height: u32) -> Self {
        Self {
            width: width.clamp(1, MAX_DILATE_SIDE),
            height: height.clamp(1, MAX_DILATE_SIDE),
        }
    }

    /// Dilate once. The anchor sits at `(width / 2, height / 2)` of the
    /// element; pixels outside the map never contribute.
    pub fn consolidate(&self, edges: &EdgeMap) -> EdgeMap {
        let (w, h) = edges.dimensions();
        if w == 0 || h == 0 {
            return edges.clone();
        }

        let merged = EdgeMap::from_luma(&grayscale_dilate(&edges.to_luma(), &self.element()));
        tracing::debug!(
            before = edges.count(),
            after = merged.count(),
            element_w = self.width,
            element_h = self.height,
            "edges consolidated"
        );
        merged
    }

    /// Solid rectangle anchored at its centre. Both sides are at most
    /// `MAX_DILATE_SIDE`, so the anchor fits the mask's `u8` coordinates.
    fn element(&self) -> Mask {
        let footprint = GrayImage::from_pixel(self.width, self.height, Luma([255]));
        Mask::from_image(&footprint, (self.width / 2) as u8, (self.height / 2) as u8)
    }
}
