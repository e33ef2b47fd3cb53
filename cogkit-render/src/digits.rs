//! Seven-segment numerals, so dot labels and counters need no font asset.

use crate::render::SkiaRenderer;

// Segment bits: a=top, b=upper right, c=lower right, d=bottom,
// e=lower left, f=upper left, g=middle.
const A: u8 = 1 << 0;
const B: u8 = 1 << 1;
const C: u8 = 1 << 2;
const D: u8 = 1 << 3;
const E: u8 = 1 << 4;
const F: u8 = 1 << 5;
const G: u8 = 1 << 6;

const DIGITS: [u8; 10] = [
    A | B | C | D | E | F,
    B | C,
    A | B | G | E | D,
    A | B | G | C | D,
    F | G | B | C,
    A | F | G | C | D,
    A | F | G | E | C | D,
    A | B | C,
    A | B | C | D | E | F | G,
    A | B | C | D | F | G,
];

pub fn segments(digit: u32) -> u8 {
    DIGITS.get(digit as usize).copied().unwrap_or(G)
}

/// Width of one glyph relative to its height.
const ASPECT: f32 = 0.55;
const GAP: f32 = 0.25;

/// Total width of `value` rendered at `height`.
pub fn text_width(value: u64, height: f32) -> f32 {
    let count = value.to_string().len() as f32;
    let w = height * ASPECT;
    count * w + (count - 1.0) * w * GAP
}

impl SkiaRenderer {
    /// Draw `value` centred on `center`.
    pub fn draw_number(&mut self, value: u64, center: (f32, f32), height: f32, color: [u8; 4]) {
        let w = height * ASPECT;
        let mut x = center.0 - text_width(value, height) / 2.0;
        let top = center.1 - height / 2.0;
        for ch in value.to_string().chars() {
            if let Some(d) = ch.to_digit(10) {
                self.draw_digit(d, (x, top), w, height, color);
            }
            x += w * (1.0 + GAP);
        }
    }

    fn draw_digit(&mut self, digit: u32, origin: (f32, f32), w: f32, h: f32, color: [u8; 4]) {
        let mask = segments(digit);
        let stroke = (h * 0.12).max(1.0);
        let (x0, y0) = origin;
        let (x1, ym, y1) = (x0 + w, y0 + h / 2.0, y0 + h);
        let segs = [
            (A, (x0, y0), (x1, y0)),
            (B, (x1, y0), (x1, ym)),
            (C, (x1, ym), (x1, y1)),
            (D, (x0, y1), (x1, y1)),
            (E, (x0, ym), (x0, y1)),
            (F, (x0, y0), (x0, ym)),
            (G, (x0, ym), (x1, ym)),
        ];
        for (bit, from, to) in segs {
            if mask & bit != 0 {
                self.line(from, to, stroke, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_lights_every_segment() {
        assert_eq!(segments(8).count_ones(), 7);
        assert_eq!(segments(1).count_ones(), 2);
    }

    #[test]
    fn width_grows_with_digit_count() {
        assert!(text_width(10, 20.0) > text_width(9, 20.0));
        assert_eq!(text_width(7, 20.0), 11.0);
    }
}
