use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

use crate::grounding::types::NormalizedBox;

/// Binary per-pixel edge classification; `1` marks an edge pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl EdgeMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![0; width as usize * height as usize],
        }
    }

    pub(crate) fn from_bits(width: u32, height: u32, bits: Vec<u8>) -> Self {
        debug_assert_eq!(bits.len(), width as usize * height as usize);
        Self { width, height, bits }
    }

    /// Any non-zero pixel is an edge.
    pub fn from_luma(image: &GrayImage) -> Self {
        let bits = image.as_raw().iter().map(|&v| (v != 0) as u8).collect();
        Self::from_bits(image.width(), image.height(), bits)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[self.index(x, y)] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        let i = self.index(x, y);
        self.bits[i] = on as u8;
    }

    /// Number of edge pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b != 0).count()
    }

    /// 0/255 grayscale rendition, for contour tracing or debug dumps.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Axis-aligned candidate rectangle in pixel space with its 1-based ordinal label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub label: u32,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// `(xmin, ymin, xmax, ymax)` with `xmax = x + w`, `ymax = y + h`.
    pub fn to_pixel_box(&self) -> PixelBox {
        PixelBox {
            xmin: self.x,
            ymin: self.y,
            xmax: self.x + self.w,
            ymax: self.y + self.h,
        }
    }
}

/// Corner form of a region in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub xmin: u32,
    pub ymin: u32,
    pub xmax: u32,
    pub ymax: u32,
}

impl PixelBox {
    /// Scale into `[0, 1]` fractions of the given image size.
    /// `None` when either dimension is zero.
    pub fn to_normalized(&self, width: u32, height: u32) -> Option<NormalizedBox> {
        if width == 0 || height == 0 {
            return None;
        }
        let (w, h) = (width as f64, height as f64);
        NormalizedBox::new(
            (self.xmin as f64 / w).clamp(0.0, 1.0),
            (self.ymin as f64 / h).clamp(0.0, 1.0),
            (self.xmax as f64 / w).clamp(0.0, 1.0),
            (self.ymax as f64 / h).clamp(0.0, 1.0),
        )
    }
}

/// Output of one candidate-detection call.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Regions in contour-discovery order, labelled `1..=N`.
    pub regions: Vec<Region>,
    /// Copy of the source with every region boxed and numbered.
    pub annotated: RgbImage,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region(&self, label: u32) -> Option<&Region> {
        label
            .checked_sub(1)
            .and_then(|i| self.regions.get(i as usize))
    }
}
