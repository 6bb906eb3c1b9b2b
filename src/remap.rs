//! Palette remap tables (fades, darkening, house colors)
//!
//! Every table here is a 256-entry byte→byte recolor map and a pure function
//! of its inputs, so callers may cache tables by their parameters.

use bitflags::bitflags;

use crate::palette::{Palette, PALETTE_SIZE};
use crate::profile::Game;

/// First palette index of the house-color ramp.
pub const HOUSE_RAMP_START: u8 = 176;

/// Length of the house-color ramp.
pub const HOUSE_RAMP_LEN: usize = 16;

/// A 256-entry recolor table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemapTable([u8; PALETTE_SIZE]);

impl RemapTable {
    /// The no-op table.
    pub fn identity() -> Self {
        let mut table = [0u8; PALETTE_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        Self(table)
    }

    pub fn from_array(table: [u8; PALETTE_SIZE]) -> Self {
        Self(table)
    }

    /// Replace the house-color ramp with `ramp`; everything else maps to itself.
    pub fn house(ramp: &[u8; HOUSE_RAMP_LEN]) -> Self {
        let mut table = Self::identity();
        for (i, &color) in ramp.iter().enumerate() {
            table.0[HOUSE_RAMP_START as usize + i] = color;
        }
        table
    }

    #[inline]
    pub fn apply(&self, index: u8) -> u8 {
        self.0[index as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Always [`PALETTE_SIZE`]; a table is never empty.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, &v)| i == v as usize)
    }
}

impl Default for RemapTable {
    fn default() -> Self {
        Self::identity()
    }
}

bitflags! {
    /// Matching policy of the fade generator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FadeFlags: u8 {
        /// The source index itself may be chosen as a match.
        const INCLUDE_SELF = 0b0001;
        /// Candidates whose color equals the source color may be chosen.
        const INCLUDE_EXACT = 0b0010;
        /// On equal distance keep the earlier candidate.
        const PREFER_EARLY = 0b0100;
        /// Plain sum of squared 6-bit channel differences.
        const LEGACY_DISTANCE = 0b1000;
    }
}

/// Inclusive index range. `first > last` is an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub first: u8,
    pub last: u8,
}

impl IndexRange {
    pub const fn new(first: u8, last: u8) -> Self {
        Self { first, last }
    }

    pub const FULL: IndexRange = IndexRange::new(0, 255);

    pub fn iter(&self) -> impl Iterator<Item = u8> {
        self.first..=self.last
    }
}

/// Inputs of one fade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FadeParams {
    /// Palette index every color is pulled towards.
    pub target: u8,
    /// Blend strength in 256ths; 0 leaves colors untouched.
    pub fraction: u8,
    /// Indices that get remapped; the rest map to themselves.
    pub remap: IndexRange,
    /// Indices that may be chosen as replacements.
    pub candidates: IndexRange,
    pub flags: FadeFlags,
}

impl FadeParams {
    /// General fade used for darkening overlays.
    pub fn basic(target: u8, fraction: u8) -> Self {
        Self {
            target,
            fraction,
            remap: IndexRange::new(1, 255),
            candidates: IndexRange::new(1, 255),
            flags: FadeFlags::INCLUDE_EXACT | FadeFlags::PREFER_EARLY | FadeFlags::LEGACY_DISTANCE,
        }
    }

    /// The fade shipped with each game's engine.
    ///
    /// The ranges are kept as shipped. Tiberian Dawn remaps the palette-cycling
    /// colors above 239 but never picks them as replacements; Red Alert remaps
    /// index 0 while excluding it from the candidates, and stops the remap
    /// range at 239 while the candidates run to 254.
    pub fn conquer(game: Game, target: u8, fraction: u8) -> Self {
        let (remap, candidates) = match game {
            Game::TiberianDawn => (IndexRange::new(1, 255), IndexRange::new(1, 239)),
            Game::RedAlert => (IndexRange::new(0, 239), IndexRange::new(1, 254)),
        };
        let flags = FadeFlags::INCLUDE_EXACT | FadeFlags::LEGACY_DISTANCE;
        Self { target, fraction, remap, candidates, flags }
    }

    /// Fade over the whole palette, self matches allowed, weighted distance.
    pub fn full_palette(target: u8, fraction: u8) -> Self {
        Self {
            target,
            fraction,
            remap: IndexRange::FULL,
            candidates: IndexRange::FULL,
            flags: FadeFlags::INCLUDE_SELF | FadeFlags::INCLUDE_EXACT | FadeFlags::PREFER_EARLY,
        }
    }
}

/// Build a fade table for `palette`.
///
/// Each index in the remap range is blended towards the target color by
/// `fraction / 256` and replaced by the closest candidate. When the source
/// index itself is an allowed candidate it wins ties, so a zero fraction with
/// self matches allowed yields the identity table. Indices without any
/// allowed candidate keep their own value.
pub fn build_fade_table(palette: &Palette, params: &FadeParams) -> RemapTable {
    let mut table = RemapTable::identity();
    let target = palette.color(params.target);
    let fraction = params.fraction as i32;

    for index in params.remap.iter() {
        let source = palette.color(index);
        let mut ideal = [0i32; 3];
        for channel in 0..3 {
            let s = source[channel] as i32;
            ideal[channel] = s - ((s - target[channel] as i32) * fraction) / 256;
        }

        let mut best: Option<(u8, u32)> = None;
        for candidate in params.candidates.iter() {
            let is_self = candidate == index;
            if is_self && !params.flags.contains(FadeFlags::INCLUDE_SELF) {
                continue;
            }
            let color = palette.color(candidate);
            if !is_self && color == source && !params.flags.contains(FadeFlags::INCLUDE_EXACT) {
                continue;
            }
            let distance =
                color_distance(ideal, color, params.flags.contains(FadeFlags::LEGACY_DISTANCE));
            let better = match best {
                None => true,
                Some((_, best_distance)) if distance < best_distance => true,
                Some((_, best_distance)) if distance == best_distance => {
                    is_self || !params.flags.contains(FadeFlags::PREFER_EARLY)
                }
                Some(_) => false,
            };
            if better {
                best = Some((candidate, distance));
            }
        }

        if let Some((choice, _)) = best {
            table.0[index as usize] = choice;
        }
    }

    table
}

fn color_distance(ideal: [i32; 3], color: [u8; 3], legacy: bool) -> u32 {
    let dr = ideal[0] - color[0] as i32;
    let dg = ideal[1] - color[1] as i32;
    let db = ideal[2] - color[2] as i32;
    if legacy {
        (dr * dr + dg * dg + db * db) as u32
    } else {
        (3 * dr * dr + 4 * dg * dg + 2 * db * db) as u32
    }
}

/// Cache key for tables held by the theater.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemapKey {
    Fade { palette: u32, params: FadeParams },
    House([u8; HOUSE_RAMP_LEN]),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Palette with a red ramp on 1..=63, a grey ramp on 64..=127 and black elsewhere.
    fn test_palette() -> Palette {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for i in 1..64 {
            colors[i] = [i as u8, 0, 0];
        }
        for i in 64..128 {
            let v = (i - 64) as u8;
            colors[i] = [v, v, v];
        }
        Palette::new(colors)
    }

    #[test]
    fn test_tables_have_256_entries() {
        let palette = test_palette();
        for params in [
            FadeParams::basic(0, 128),
            FadeParams::conquer(Game::TiberianDawn, 12, 100),
            FadeParams::conquer(Game::RedAlert, 12, 100),
            FadeParams::full_palette(64, 200),
        ] {
            assert_eq!(build_fade_table(&palette, &params).len(), 256);
        }
        assert_eq!(RemapTable::identity().as_slice().len(), 256);
    }

    #[test]
    fn test_identity_parameterization_is_noop() {
        let palette = test_palette();
        let table = build_fade_table(&palette, &FadeParams::full_palette(5, 0));
        assert!(table.is_identity());
    }

    #[test]
    fn test_full_fade_reaches_target() {
        let palette = test_palette();
        // fraction 255 pulls every color to within one step of pure black
        let table = build_fade_table(&palette, &FadeParams::full_palette(64, 255));
        let faded = palette.color(table.apply(63));
        assert!(faded[0] <= 1, "expected near-black, got {:?}", faded);
    }

    #[test]
    fn test_basic_fade_never_uses_self_or_zero() {
        let palette = test_palette();
        let table = build_fade_table(&palette, &FadeParams::basic(64, 128));
        assert_eq!(table.apply(0), 0);
        for index in 1..=255u8 {
            assert_ne!(table.apply(index), 0);
        }
        // red 40 halfway to black is red 20
        assert_eq!(table.apply(40), 20);
    }

    #[test]
    fn test_conquer_fade_range_quirks_are_kept() {
        let palette = test_palette();
        let td = build_fade_table(&palette, &FadeParams::conquer(Game::TiberianDawn, 64, 128));
        // index 250 is remapped even though it can never be a replacement
        assert!(td.apply(250) <= 239);

        let ra = build_fade_table(&palette, &FadeParams::conquer(Game::RedAlert, 64, 128));
        // index 0 is remapped away from itself; 250 is outside the remap range
        assert_ne!(ra.apply(0), 0);
        assert_eq!(ra.apply(250), 250);
    }

    #[test]
    fn test_prefer_early_chooses_first_duplicate() {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        colors[10] = [20, 20, 20];
        colors[20] = [20, 20, 20];
        colors[30] = [40, 40, 40];
        let palette = Palette::new(colors);
        let mut params = FadeParams::basic(0, 128);
        params.remap = IndexRange::new(30, 30);
        params.candidates = IndexRange::new(10, 20);

        assert_eq!(build_fade_table(&palette, &params).apply(30), 10);

        params.flags.remove(FadeFlags::PREFER_EARLY);
        assert_eq!(build_fade_table(&palette, &params).apply(30), 20);
    }

    #[test]
    fn test_exact_match_exclusion() {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        colors[1] = [30, 0, 0];
        colors[2] = [30, 0, 0];
        colors[3] = [20, 0, 0];
        let palette = Palette::new(colors);
        let params = FadeParams {
            target: 1,
            fraction: 0,
            remap: IndexRange::new(2, 2),
            candidates: IndexRange::new(1, 3),
            flags: FadeFlags::LEGACY_DISTANCE,
        };
        // Index 1 duplicates the source color and is skipped
        assert_eq!(build_fade_table(&palette, &params).apply(2), 3);

        let with_exact = FadeParams { flags: params.flags | FadeFlags::INCLUDE_EXACT, ..params };
        assert_eq!(build_fade_table(&palette, &with_exact).apply(2), 1);
    }

    #[test]
    fn test_house_table_replaces_ramp_only() {
        let ramp = [1u8; HOUSE_RAMP_LEN];
        let table = RemapTable::house(&ramp);
        assert_eq!(table.apply(175), 175);
        assert_eq!(table.apply(176), 1);
        assert_eq!(table.apply(191), 1);
        assert_eq!(table.apply(192), 192);
    }
}
