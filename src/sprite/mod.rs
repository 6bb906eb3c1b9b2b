//! Placed sprites: positional and visual state of one map object.
//!
//! A [`Sprite`] owns one primary [`Visual`] plus an ordered chain of extra
//! visuals (turrets, rotors) that draw right after it. Shifting the sprite
//! moves the whole chain, and its bounding box covers the whole chain.

mod facing;
mod smudge;
mod structure;

pub use facing::{body_facing, infantry_facing, subcell_lepton, subcell_pixel};
pub use smudge::{
    bib_id_for_width, bib_width, classify_smudge, SmudgeState, SmudgeType, StructureRef,
};
pub use structure::{resolve_rebuilt, Rebuilt, StructureState};

use std::sync::Arc;

use crate::error::{RenderError, Result};
use crate::models::{FrameSource, Lepton, Rect, TilePos};
use crate::occupancy::Placed;
use crate::remap::RemapTable;

/// How a visual's pixels reach the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    #[default]
    Normal,
    /// Skip pixels selected by the 4×4 dither mask.
    Dithered,
    /// Darken what is underneath through the theater's shadow filters.
    ShadowFiltered,
    /// Never drawn.
    Invisible,
}

/// Coarse draw-order layer. Higher planes always draw later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PriorityPlane {
    Smudge = 0,
    Overlay = 1,
    /// Ground markers above overlay but below objects (aircraft shadows).
    Flag = 2,
    #[default]
    Default = 3,
    Exposed = 4,
    ExposedCrate = 5,
}

impl PriorityPlane {
    pub fn value(self) -> i64 {
        self as i64
    }
}

/// One frame of one source, placed in map pixel space.
#[derive(Debug, Clone)]
pub struct Visual {
    pub source: Arc<dyn FrameSource>,
    pub frame: usize,
    /// Top-left of the frame in map pixels, relative to tile (0, 0).
    pub offset: (i32, i32),
    pub remap: Arc<RemapTable>,
    pub mode: DrawMode,
}

impl Visual {
    pub fn new(
        source: Arc<dyn FrameSource>,
        frame: usize,
        offset: (i32, i32),
        remap: Arc<RemapTable>,
    ) -> Self {
        Self { source, frame, offset, remap, mode: DrawMode::Normal }
    }

    pub fn with_mode(mut self, mode: DrawMode) -> Self {
        self.mode = mode;
        self
    }

    /// Whether the frame index exists in the source.
    pub fn frame_in_range(&self) -> bool {
        self.frame < self.source.frame_count()
    }

    /// Opaque area in map pixels.
    pub fn bounding_box(&self) -> Option<Rect> {
        let (x, y) = self.offset;
        self.source.bounding_box(self.frame).map(|rect| rect.translate(x, y))
    }
}

/// Category-specific state of a sprite.
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteKind {
    Terrain,
    Overlay,
    Unit,
    Infantry,
    Aircraft,
    /// Ground shadow of an aircraft.
    Shadow,
    Structure(StructureState),
    Smudge(SmudgeState),
}

/// A placed map object.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub id: String,
    pub tile: TilePos,
    /// Sort point relative to the tile's top-left corner.
    pub lepton: Lepton,
    pub plane: PriorityPlane,
    pub trigger: Option<String>,
    pub kind: SpriteKind,
    visual: Visual,
    chain: Vec<Visual>,
}

impl Sprite {
    pub fn new(id: impl Into<String>, tile: TilePos, kind: SpriteKind, visual: Visual) -> Self {
        let plane = match kind {
            SpriteKind::Smudge(_) => PriorityPlane::Smudge,
            SpriteKind::Overlay => PriorityPlane::Overlay,
            SpriteKind::Shadow => PriorityPlane::Flag,
            _ => PriorityPlane::Default,
        };
        Self {
            id: id.into(),
            tile,
            lepton: Lepton::CENTER,
            plane,
            trigger: None,
            kind,
            visual,
            chain: Vec::new(),
        }
    }

    pub fn with_lepton(mut self, lepton: Lepton) -> Self {
        self.lepton = lepton;
        self
    }

    pub fn with_trigger(mut self, trigger: Option<String>) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    pub fn visual_mut(&mut self) -> &mut Visual {
        &mut self.visual
    }

    pub fn chain(&self) -> &[Visual] {
        &self.chain
    }

    /// Append a visual that draws right after the current chain.
    pub fn push_chained(&mut self, visual: Visual) {
        self.chain.push(visual);
    }

    /// Primary visual followed by the chain, in draw order.
    pub fn layers(&self) -> impl Iterator<Item = &Visual> {
        std::iter::once(&self.visual).chain(self.chain.iter())
    }

    pub fn frame(&self) -> usize {
        self.visual.frame
    }

    pub fn frame_count(&self) -> usize {
        self.visual.source.frame_count()
    }

    /// Move the sprite and its whole chain by a pixel delta.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.visual.offset.0 += dx;
        self.visual.offset.1 += dy;
        for visual in &mut self.chain {
            visual.offset.0 += dx;
            visual.offset.1 += dy;
        }
    }

    /// Set the draw mode of the sprite and its chain.
    pub fn set_mode(&mut self, mode: DrawMode) {
        self.visual.mode = mode;
        for visual in &mut self.chain {
            visual.mode = mode;
        }
    }

    /// Set the remap table of the sprite and its chain.
    pub fn set_remap(&mut self, remap: Arc<RemapTable>) {
        for visual in &mut self.chain {
            visual.remap = Arc::clone(&remap);
        }
        self.visual.remap = remap;
    }

    /// Union of the opaque areas of every layer, in map pixels.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.layers().filter_map(Visual::bounding_box).reduce(|acc, rect| acc.union(&rect))
    }

    pub fn is_smudge(&self) -> bool {
        matches!(self.kind, SpriteKind::Smudge(_))
    }

    pub fn smudge(&self) -> Option<&SmudgeState> {
        match &self.kind {
            SpriteKind::Smudge(state) => Some(state),
            _ => None,
        }
    }

    pub fn structure(&self) -> Option<&StructureState> {
        match &self.kind {
            SpriteKind::Structure(state) => Some(state),
            _ => None,
        }
    }

    pub fn structure_mut(&mut self) -> Option<&mut StructureState> {
        match &mut self.kind {
            SpriteKind::Structure(state) => Some(state),
            _ => None,
        }
    }

    /// Check that every layer's frame exists in its source.
    ///
    /// Smudges are exempt: an over-range smudge frame means "not drawn".
    pub fn check_frames(&self) -> Result<()> {
        if self.is_smudge() {
            return Ok(());
        }
        for visual in self.layers() {
            if !visual.frame_in_range() {
                return Err(RenderError::FrameOutOfRange {
                    id: self.id.clone(),
                    frame: visual.frame,
                    frame_count: visual.source.frame_count(),
                });
            }
        }
        Ok(())
    }
}

impl Placed for Sprite {
    fn tile(&self) -> TilePos {
        self.tile
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{solid_sheet, visual};
    use super::*;

    #[test]
    fn test_plane_order() {
        assert!(PriorityPlane::Smudge < PriorityPlane::Overlay);
        assert!(PriorityPlane::Overlay < PriorityPlane::Flag);
        assert!(PriorityPlane::Flag < PriorityPlane::Default);
        assert!(PriorityPlane::Default < PriorityPlane::Exposed);
        assert!(PriorityPlane::Exposed < PriorityPlane::ExposedCrate);
    }

    #[test]
    fn test_shift_moves_whole_chain() {
        let sheet = solid_sheet("MTNK", 64, 4, 4);
        let mut sprite =
            Sprite::new("MTNK", TilePos::new(1, 1), SpriteKind::Unit, visual(&sheet, 0, (10, 10)));
        sprite.push_chained(visual(&sheet, 32, (12, 8)));

        sprite.shift(3, -2);

        assert_eq!(sprite.visual().offset, (13, 8));
        assert_eq!(sprite.chain()[0].offset, (15, 6));
    }

    #[test]
    fn test_bounding_box_unions_chain() {
        let sheet = solid_sheet("MTNK", 64, 4, 4);
        let mut sprite =
            Sprite::new("MTNK", TilePos::new(0, 0), SpriteKind::Unit, visual(&sheet, 0, (0, 0)));
        sprite.push_chained(visual(&sheet, 33, (6, 2)));

        assert_eq!(sprite.bounding_box(), Some(Rect::new(0, 0, 10, 6)));
    }

    #[test]
    fn test_check_frames_rejects_over_range() {
        let sheet = solid_sheet("TREE", 2, 4, 4);
        let sprite =
            Sprite::new("TREE", TilePos::new(0, 0), SpriteKind::Terrain, visual(&sheet, 2, (0, 0)));
        assert_eq!(
            sprite.check_frames(),
            Err(RenderError::FrameOutOfRange { id: "TREE".to_string(), frame: 2, frame_count: 2 })
        );
    }

    #[test]
    fn test_check_frames_allows_over_range_smudge() {
        let sheet = solid_sheet("SC1", 1, 4, 4);
        let state = SmudgeState { kind: SmudgeType::Scorch, owner: None };
        let kind = SpriteKind::Smudge(state);
        let sprite = Sprite::new("SC1", TilePos::new(0, 0), kind, visual(&sheet, 9, (0, 0)));
        assert!(sprite.check_frames().is_ok());
        assert_eq!(sprite.plane, PriorityPlane::Smudge);
    }

    #[test]
    fn test_set_mode_applies_to_chain() {
        let sheet = solid_sheet("STNK", 64, 2, 2);
        let mut sprite =
            Sprite::new("STNK", TilePos::new(0, 0), SpriteKind::Unit, visual(&sheet, 0, (0, 0)));
        sprite.push_chained(visual(&sheet, 32, (0, 0)));
        sprite.set_mode(DrawMode::Dithered);
        assert!(sprite.layers().all(|v| v.mode == DrawMode::Dithered));
    }
}
