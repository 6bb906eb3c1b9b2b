//! 256-color game palettes with 6-bit channels

use image::{GrayImage, Rgba, RgbaImage};

/// Number of palette entries.
pub const PALETTE_SIZE: usize = 256;

/// Index that is never drawn.
pub const TRANSPARENT_INDEX: u8 = 0;

/// A reduced-precision RGB palette as stored by the original games.
///
/// Each channel holds a value in `0..=63`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [[u8; 3]; PALETTE_SIZE],
}

impl Palette {
    /// Build a palette from 6-bit triples. Channels above 63 are masked.
    pub fn new(colors: [[u8; 3]; PALETTE_SIZE]) -> Self {
        let mut masked = colors;
        for color in masked.iter_mut() {
            for channel in color.iter_mut() {
                *channel &= 0x3F;
            }
        }
        Self { colors: masked }
    }

    /// Build a palette from a flat `r, g, b, r, g, b, ...` 768-byte buffer.
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        if raw.len() != PALETTE_SIZE * 3 {
            return None;
        }
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (color, chunk) in colors.iter_mut().zip(raw.chunks_exact(3)) {
            *color = [chunk[0], chunk[1], chunk[2]];
        }
        Some(Self::new(colors))
    }

    /// 6-bit color of an index.
    pub fn color(&self, index: u8) -> [u8; 3] {
        self.colors[index as usize]
    }

    /// Index whose color is closest to `rgb` (6-bit), first match wins.
    pub fn nearest_index(&self, rgb: [u8; 3]) -> u8 {
        let mut best = 0u8;
        let mut best_distance = u32::MAX;
        for (index, color) in self.colors.iter().enumerate() {
            let distance: u32 = color
                .iter()
                .zip(rgb.iter())
                .map(|(&a, &b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum();
            if distance < best_distance {
                best = index as u8;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Expand an index to 8-bit RGBA. Index 0 is fully transparent.
    pub fn rgba(&self, index: u8) -> Rgba<u8> {
        if index == TRANSPARENT_INDEX {
            return Rgba([0, 0, 0, 0]);
        }
        let [r, g, b] = self.colors[index as usize];
        Rgba([expand(r), expand(g), expand(b), 255])
    }

    /// Resolve an indexed image to RGBA.
    pub fn to_rgba(&self, indexed: &GrayImage) -> RgbaImage {
        RgbaImage::from_fn(indexed.width(), indexed.height(), |x, y| {
            self.rgba(indexed.get_pixel(x, y)[0])
        })
    }

    /// Content fingerprint used as the palette's cache identity.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        for color in &self.colors {
            hasher.update(color);
        }
        hasher.finalize()
    }
}

fn expand(channel: u8) -> u8 {
    (channel << 2) | (channel >> 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Grey ramp palette: index i has all channels i / 4.
    fn grey_palette() -> Palette {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (i, color) in colors.iter_mut().enumerate() {
            let v = (i / 4) as u8;
            *color = [v, v, v];
        }
        Palette::new(colors)
    }

    #[test]
    fn test_nearest_index_prefers_first_match() {
        let palette = grey_palette();
        // Indices 4..=7 all hold [1, 1, 1]
        assert_eq!(palette.nearest_index([1, 1, 1]), 4);
        assert_eq!(palette.nearest_index([63, 63, 63]), 252);
    }

    #[test]
    fn test_rgba_expands_six_bit_channels() {
        let palette = grey_palette();
        assert_eq!(palette.rgba(0), Rgba([0, 0, 0, 0]));
        assert_eq!(palette.rgba(255), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_from_raw_requires_768_bytes() {
        assert!(Palette::from_raw(&[0; 767]).is_none());
        let palette = Palette::from_raw(&[0xFF; 768]).unwrap();
        assert_eq!(palette.color(10), [63, 63, 63]);
    }

    #[test]
    fn test_to_rgba() {
        let palette = grey_palette();
        let indexed = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let rgba = palette.to_rgba(&indexed);
        assert_eq!(rgba.get_pixel(0, 0)[3], 0);
        assert_eq!(*rgba.get_pixel(1, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = grey_palette();
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        colors[1] = [1, 2, 3];
        let b = Palette::new(colors);
        assert_eq!(a.fingerprint(), grey_palette().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
