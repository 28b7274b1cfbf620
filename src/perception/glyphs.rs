// Minimal 5×5 bitmap font for on-image labels.
// Each glyph: 5 rows, bit4 = leftmost pixel, bit0 = rightmost.
use image::{Rgb, RgbImage};

pub const GLYPH_SIZE: u32 = 5;

const DIGITS: [[u8; 5]; 10] = [
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00110, 0b01000, 0b11111], // 2
    [0b11110, 0b00001, 0b00110, 0b00001, 0b11110], // 3
    [0b00110, 0b01010, 0b10010, 0b11111, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110], // 5
    [0b01110, 0b10000, 0b11110, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b00100], // 7
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b01111, 0b00001, 0b01110], // 9
];

const LETTERS: [[u8; 5]; 26] = [
    [0b01110, 0b10001, 0b11111, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b11110, 0b10001, 0b11110], // B
    [0b01110, 0b10000, 0b10000, 0b10000, 0b01110], // C
    [0b11100, 0b10010, 0b10001, 0b10010, 0b11100], // D
    [0b11111, 0b10000, 0b11110, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b11110, 0b10000, 0b10000], // F
    [0b01110, 0b10000, 0b10011, 0b10001, 0b01110], // G
    [0b10001, 0b10001, 0b11111, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b11100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10001, 0b10001], // M
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b11110, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b11110, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b01110, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10101, 0b11011, 0b10001], // W
    [0b10001, 0b01010, 0b00100, 0b01010, 0b10001], // X
    [0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00010, 0b00100, 0b01000, 0b11111], // Z
];

fn glyph(c: char) -> Option<[u8; 5]> {
    match c.to_ascii_uppercase() {
        d @ '0'..='9' => Some(DIGITS[(d as u8 - b'0') as usize]),
        l @ 'A'..='Z' => Some(LETTERS[(l as u8 - b'A') as usize]),
        '.' => Some([0b00000, 0b00000, 0b00000, 0b00000, 0b00100]),
        '-' => Some([0b00000, 0b00000, 0b01110, 0b00000, 0b00000]),
        ':' => Some([0b00000, 0b00100, 0b00000, 0b00100, 0b00000]),
        _ => None,
    }
}

/// Horizontal advance of one character at `scale` (glyph + 1px gap).
pub fn advance(scale: u32) -> u32 {
    GLYPH_SIZE * scale + 1
}

/// Pixel footprint `(w, h)` of `text` at `scale`.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let n = text.chars().count() as u32;
    (n * advance(scale), GLYPH_SIZE * scale)
}

/// Draw `text` with its top-left corner at `(px, py)`; pixels outside the
/// canvas are clipped and unknown characters are left blank.
pub fn draw_text(canvas: &mut RgbImage, text: &str, px: u32, py: u32, colour: [u8; 3], scale: u32) {
    let (w, h) = canvas.dimensions();
    for (i, c) in text.chars().enumerate() {
        let gx = px + i as u32 * advance(scale);
        if gx >= w {
            break;
        }
        let Some(rows) = glyph(c) else { continue };
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if (bits >> (GLYPH_SIZE - 1 - col)) & 1 == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let x = gx + col * scale + sx;
                        let y = py + row as u32 * scale + sy;
                        if x < w && y < h {
                            canvas.put_pixel(x, y, Rgb(colour));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_one_lights_expected_pixels() {
        let mut canvas = RgbImage::new(8, 8);
        draw_text(&mut canvas, "1", 0, 0, [255, 0, 0], 1);
        // top row of '1' is 0b00100
        assert_eq!(canvas.get_pixel(2, 0).0, [255, 0, 0]);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0]);
        // bottom row is 0b01110
        assert!((1..=3).all(|x| canvas.get_pixel(x, 4).0 == [255, 0, 0]));
    }

    #[test]
    fn text_is_clipped_at_canvas_edge() {
        let mut canvas = RgbImage::new(7, 3);
        draw_text(&mut canvas, "888", 4, 1, [9, 9, 9], 2);
        assert_eq!(text_size("888", 2), (33, 10));
    }
}
