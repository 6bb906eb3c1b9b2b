//! 3×5 bitmap font for map annotations.

use image::{GrayImage, Luma};

use crate::models::Rect;

pub const GLYPH_WIDTH: u32 = 3;
pub const GLYPH_HEIGHT: u32 = 5;
/// Horizontal distance between glyph origins.
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;
/// Vertical distance between text lines.
pub const LINE_HEIGHT: u32 = GLYPH_HEIGHT + 1;

/// Five rows of three bits each; bit 2 is the leftmost column.
type Glyph = [u8; GLYPH_HEIGHT as usize];

const DIGITS: [Glyph; 10] = [
    [7, 5, 5, 5, 7],
    [2, 6, 2, 2, 7],
    [7, 1, 7, 4, 7],
    [7, 1, 7, 1, 7],
    [5, 5, 7, 1, 1],
    [7, 4, 7, 1, 7],
    [7, 4, 7, 5, 7],
    [7, 1, 1, 1, 1],
    [7, 5, 7, 5, 7],
    [7, 5, 7, 1, 7],
];

const LETTERS: [Glyph; 26] = [
    [2, 5, 7, 5, 5], // A
    [6, 5, 6, 5, 6],
    [3, 4, 4, 4, 3],
    [6, 5, 5, 5, 6],
    [7, 4, 6, 4, 7], // E
    [7, 4, 6, 4, 4],
    [3, 4, 5, 5, 3],
    [5, 5, 7, 5, 5],
    [7, 2, 2, 2, 7],
    [1, 1, 1, 5, 2], // J
    [5, 5, 6, 5, 5],
    [4, 4, 4, 4, 7],
    [5, 7, 7, 5, 5],
    [6, 5, 5, 5, 5],
    [2, 5, 5, 5, 2], // O
    [6, 5, 6, 4, 4],
    [2, 5, 5, 6, 3],
    [6, 5, 6, 5, 5],
    [3, 4, 2, 1, 6],
    [7, 2, 2, 2, 2], // T
    [5, 5, 5, 5, 7],
    [5, 5, 5, 5, 2],
    [5, 5, 7, 7, 5],
    [5, 5, 2, 5, 5],
    [5, 5, 2, 2, 2],
    [7, 1, 2, 4, 7], // Z
];

const UNKNOWN: Glyph = [7, 1, 2, 0, 2];

fn glyph(c: char) -> Glyph {
    match c.to_ascii_uppercase() {
        d @ '0'..='9' => DIGITS[d as usize - '0' as usize],
        l @ 'A'..='Z' => LETTERS[l as usize - 'A' as usize],
        '-' => [0, 0, 7, 0, 0],
        '#' => [5, 7, 5, 7, 5],
        '_' => [0, 0, 0, 0, 7],
        '.' => [0, 0, 0, 0, 2],
        ' ' => [0; 5],
        _ => UNKNOWN,
    }
}

/// Draw one line of text with its top-left at (x, y), writing `color` into
/// set glyph pixels that fall inside `clip`.
pub fn draw_text(canvas: &mut GrayImage, text: &str, x: i32, y: i32, color: u8, clip: Rect) {
    let right = clip.right().min(canvas.width() as i32);
    let bottom = clip.bottom().min(canvas.height() as i32);
    let left = clip.x.max(0);
    let top = clip.y.max(0);

    for (i, c) in text.chars().enumerate() {
        let gx = x + (i as u32 * ADVANCE) as i32;
        if gx >= right {
            break;
        }
        for (row, &bits) in glyph(c).iter().enumerate() {
            let py = y + row as i32;
            if py < top || py >= bottom {
                continue;
            }
            for col in 0..GLYPH_WIDTH {
                let px = gx + col as i32;
                if px < left || px >= right {
                    continue;
                }
                if bits >> (GLYPH_WIDTH - 1 - col) & 1 == 1 {
                    canvas.put_pixel(px as u32, py as u32, Luma([color]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_digit() {
        let mut canvas = GrayImage::new(3, 5);
        draw_text(&mut canvas, "4", 0, 0, 9, Rect::new(0, 0, 3, 5));
        #[rustfmt::skip]
        assert_eq!(canvas.as_raw(), &vec![
            9, 0, 9,
            9, 0, 9,
            9, 9, 9,
            0, 0, 9,
            0, 0, 9,
        ]);
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        assert_eq!(glyph('t'), glyph('T'));
        assert_eq!(glyph('~'), UNKNOWN);
    }

    #[test]
    fn test_clip_rect_limits_drawing() {
        let mut canvas = GrayImage::new(8, 5);
        draw_text(&mut canvas, "88", 0, 0, 1, Rect::new(0, 0, 5, 5));
        // the second glyph starts at x = 4 and only its first column fits
        assert_eq!(canvas.get_pixel(4, 0)[0], 1);
        assert_eq!(canvas.get_pixel(5, 0)[0], 0);
        assert_eq!(canvas.get_pixel(6, 0)[0], 0);
    }
}
