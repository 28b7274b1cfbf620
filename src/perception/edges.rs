//! Edge extraction: grayscale → Gaussian smoothing → dual-threshold
//! (Canny-style) edge detection.
//!
//! All arithmetic runs in fixed pass order with no randomness, so the same
//! image always produces a bit-identical `EdgeMap`.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;

use crate::config::DetectorConfig;
use crate::perception::types::EdgeMap;

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

const NOT_EDGE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

#[derive(Debug, Clone)]
pub struct EdgeExtractor {
    kernel: Vec<f32>,
    low: f32,
    high: f32,
}

impl EdgeExtractor {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            kernel: gaussian_kernel(config.blur_kernel, config.blur_sigma),
            low: config.canny_low,
            high: config.canny_high,
        }
    }

    pub fn extract(&self, image: &DynamicImage) -> EdgeMap {
        let gray = image.to_luma8();
        let blurred = blur_with_kernel(&gray, &self.kernel);
        let edges = canny(&blurred, self.low, self.high);
        tracing::debug!(
            width = edges.width(),
            height = edges.height(),
            edge_pixels = edges.count(),
            "edges extracted"
        );
        edges
    }
}

// ── Smoothing ────────────────────────────────────────────────────────────────

/// Normalised 1-D Gaussian of odd length `ksize`.
/// A non-positive `sigma` is derived from the kernel size.
pub fn gaussian_kernel(ksize: u32, sigma: f32) -> Vec<f32> {
    let ksize = ksize.max(1) | 1;
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (ksize / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

pub fn gaussian_blur(gray: &GrayImage, ksize: u32, sigma: f32) -> GrayImage {
    blur_with_kernel(gray, &gaussian_kernel(ksize, sigma))
}

/// Separable convolution with mirrored (reflect-101) borders.
///
/// The image is padded by the kernel radius first, so the filter's own
/// clamp-to-edge handling only ever touches the mirrored margin.
fn blur_with_kernel(gray: &GrayImage, kernel: &[f32]) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }
    let half = kernel.len() as u32 / 2;
    let (wi, hi) = (w as i64, h as i64);

    let padded: Image<Luma<f32>> = ImageBuffer::from_fn(w + 2 * half, h + 2 * half, |x, y| {
        let sx = reflect101(x as i64 - half as i64, wi);
        let sy = reflect101(y as i64 - half as i64, hi);
        Luma([gray.get_pixel(sx as u32, sy as u32)[0] as f32])
    });
    let smoothed = separable_filter_equal(&padded, kernel);

    GrayImage::from_fn(w, h, |x, y| {
        let v = smoothed.get_pixel(x + half, y + half)[0];
        Luma([v.round().clamp(0.0, 255.0) as u8])
    })
}

/// Mirror an out-of-range index back into `[0, n)` without repeating the edge pixel.
fn reflect101(mut i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

// ── Edge detection ───────────────────────────────────────────────────────────

/// Dual-threshold edge detection on an already smoothed image.
///
/// Gradient magnitude is the L1 norm of the 3×3 Sobel response. After
/// non-maximum suppression, pixels above `high` are edges; pixels above
/// `low` become edges only when 8-connected (transitively) to one.
pub fn canny(gray: &GrayImage, low: f32, high: f32) -> EdgeMap {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return EdgeMap::new(w, h);
    }
    let (wu, hu) = (w as usize, h as usize);
    let (wi, hi) = (w as i64, h as i64);
    let px = |x: i64, y: i64| -> i32 {
        gray.get_pixel(reflect101(x, wi) as u32, reflect101(y, hi) as u32)[0] as i32
    };

    let mut gx = vec![0i32; wu * hu];
    let mut gy = vec![0i32; wu * hu];
    let mut mag = vec![0i32; wu * hu];
    for y in 0..hi {
        for x in 0..wi {
            let dx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            let dy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
            let i = y as usize * wu + x as usize;
            gx[i] = dx;
            gy[i] = dy;
            mag[i] = dx.abs() + dy.abs();
        }
    }

    let mag_at = |x: i64, y: i64| -> i32 {
        if x < 0 || y < 0 || x >= wi || y >= hi {
            0
        } else {
            mag[y as usize * wu + x as usize]
        }
    };

    let mut class = vec![NOT_EDGE; wu * hu];
    for y in 0..hi {
        for x in 0..wi {
            let i = y as usize * wu + x as usize;
            let m = mag[i];
            if (m as f32) <= low {
                continue;
            }
            let (ax, ay) = (gx[i].abs() as f32, gy[i].abs() as f32);
            let is_max = if ay <= ax * TAN_22_5 {
                m > mag_at(x - 1, y) && m >= mag_at(x + 1, y)
            } else if ay >= ax * TAN_67_5 {
                m > mag_at(x, y - 1) && m >= mag_at(x, y + 1)
            } else {
                let s = if (gx[i] ^ gy[i]) < 0 { -1 } else { 1 };
                m > mag_at(x - s, y - 1) && m > mag_at(x + s, y + 1)
            };
            if is_max {
                class[i] = if m as f32 > high { STRONG } else { WEAK };
            }
        }
    }

    EdgeMap::from_bits(w, h, link_edges(wu, hu, &class))
}

/// Hysteresis: grow edges from strong seeds through 8-connected weak pixels.
fn link_edges(w: usize, h: usize, class: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; w * h];
    let mut stack: Vec<usize> = class
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == STRONG)
        .map(|(i, _)| i)
        .collect();
    for &i in &stack {
        out[i] = 1;
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % w) as i64, (i / w) as i64);
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                if out[j] == 0 && class[j] == WEAK {
                    out[j] = 1;
                    stack.push(j);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image(w: u32, h: u32, split: u32, left: u8, right: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(w, h, |x, _| {
            Luma([if x < split { left } else { right }])
        }))
    }

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(5, 0.0);
        assert_eq!(k.len(), 5);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(k[0], k[4]);
        assert_eq!(k[1], k[3]);
        assert!(k[2] > k[1] && k[1] > k[0]);
    }

    #[test]
    fn reflect101_mirrors_without_repeating_border() {
        assert_eq!(reflect101(-1, 10), 1);
        assert_eq!(reflect101(-2, 10), 2);
        assert_eq!(reflect101(10, 10), 8);
        assert_eq!(reflect101(4, 10), 4);
        assert_eq!(reflect101(-3, 1), 0);
    }

    #[test]
    fn blur_keeps_uniform_image_unchanged() {
        let gray = GrayImage::from_pixel(20, 10, Luma([77]));
        assert_eq!(gaussian_blur(&gray, 5, 0.0), gray);
    }

    #[test]
    fn blur_mirrors_border_without_repeating_it() {
        let gray = GrayImage::from_fn(10, 3, |x, _| Luma([if x == 0 { 255 } else { 0 }]));
        let out = gaussian_blur(&gray, 5, 0.0);
        // weights ≈ [0.071, 0.244, 0.370, 0.244, 0.071]
        let row: Vec<u8> = (0..5).map(|x| out.get_pixel(x, 1)[0]).collect();
        assert_eq!(row, vec![94, 62, 18, 0, 0]);
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let extractor = EdgeExtractor::new(&DetectorConfig::default());
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 48, Luma([200])));
        assert_eq!(extractor.extract(&img).count(), 0);
    }

    #[test]
    fn strong_step_yields_thin_vertical_edge() {
        let extractor = EdgeExtractor::new(&DetectorConfig::default());
        let edges = extractor.extract(&step_image(64, 32, 32, 30, 220));
        assert!(edges.count() > 0);
        for y in 0..32 {
            let row: Vec<u32> = (0..64).filter(|&x| edges.get(x, y)).collect();
            assert!(!row.is_empty(), "row {y} has no edge");
            assert!(row.iter().all(|&x| (29..=34).contains(&x)), "row {y}: {row:?}");
        }
    }

    #[test]
    fn weak_isolated_step_is_dropped() {
        // Peak L1 gradient ≈ 2.46 × contrast: 40 lands between the thresholds.
        let extractor = EdgeExtractor::new(&DetectorConfig::default());
        let edges = extractor.extract(&step_image(64, 32, 32, 100, 140));
        assert_eq!(edges.count(), 0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = EdgeExtractor::new(&DetectorConfig::default());
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(80, 60, |x, y| {
            Luma([((x * 7 + y * 13) % 251) as u8])
        }));
        assert_eq!(extractor.extract(&img), extractor.extract(&img));
    }

    #[test]
    fn weak_pixels_survive_only_when_linked_to_strong() {
        // Row 0: strong seed followed by a weak run; row 2: isolated weak run.
        let (w, h) = (6usize, 3usize);
        let mut class = vec![NOT_EDGE; w * h];
        class[0] = STRONG;
        for x in 1..4 {
            class[x] = WEAK;
        }
        for x in 2..5 {
            class[2 * w + x] = WEAK;
        }
        let out = link_edges(w, h, &class);
        assert_eq!(&out[0..6], &[1, 1, 1, 1, 0, 0]);
        assert_eq!(&out[12..18], &[0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn diagonal_link_counts_as_connected() {
        let (w, h) = (3usize, 3usize);
        let mut class = vec![NOT_EDGE; w * h];
        class[0] = STRONG;
        class[4] = WEAK;
        class[8] = WEAK;
        let out = link_edges(w, h, &class);
        assert_eq!(out.iter().filter(|&&b| b == 1).count(), 3);
    }
}
