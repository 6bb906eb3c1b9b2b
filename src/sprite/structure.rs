//! Structure state and the rebuilt-detection pass.

use crate::catalog::StructureType;
use crate::error::{RenderError, Result};

use super::Sprite;

/// Tri-state rebuilt flag of a base structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rebuilt {
    /// The resolution pass has not run yet.
    #[default]
    Unresolved,
    Yes,
    No,
}

/// Structure-specific sprite state.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureState {
    pub house: String,
    /// Position in the base list, -1 for structures placed on the map.
    pub base_number: i32,
    pub footprint: StructureType,
    rebuilt: Rebuilt,
}

impl StructureState {
    pub fn placed(house: impl Into<String>, footprint: StructureType) -> Self {
        Self { house: house.into(), base_number: -1, footprint, rebuilt: Rebuilt::Unresolved }
    }

    pub fn base(house: impl Into<String>, base_number: i32, footprint: StructureType) -> Self {
        Self { house: house.into(), base_number, footprint, rebuilt: Rebuilt::Unresolved }
    }

    pub fn is_base(&self) -> bool {
        self.base_number >= 0
    }

    /// Whether a placed structure stands where this base entry is.
    ///
    /// Reading the flag before [`resolve_rebuilt`] is a precondition violation.
    pub fn is_rebuilt(&self, id: &str) -> Result<bool> {
        match self.rebuilt {
            Rebuilt::Yes => Ok(true),
            Rebuilt::No => Ok(false),
            Rebuilt::Unresolved => Err(RenderError::UnresolvedRebuilt { id: id.to_string() }),
        }
    }
}

/// Mark every base structure that a placed structure matches by tile and id.
pub fn resolve_rebuilt(base: &mut [Sprite], placed: &[Sprite]) {
    for base_sprite in base.iter_mut() {
        let matched = placed
            .iter()
            .any(|p| p.tile == base_sprite.tile && p.id.eq_ignore_ascii_case(&base_sprite.id));
        let tile = base_sprite.tile;
        if let Some(state) = base_sprite.structure_mut() {
            state.rebuilt = if matched { Rebuilt::Yes } else { Rebuilt::No };
            log::debug!("base structure #{} at {} rebuilt: {}", state.base_number, tile, matched);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::structure_type;
    use crate::models::TilePos;
    use crate::sprite::test_support::{solid_sheet, visual};
    use crate::sprite::SpriteKind;

    fn structure(id: &str, x: i32, y: i32, base_number: i32) -> Sprite {
        let sheet = solid_sheet(id, 2, 48, 48);
        let state = if base_number >= 0 {
            StructureState::base("GoodGuy", base_number, structure_type(id))
        } else {
            StructureState::placed("GoodGuy", structure_type(id))
        };
        Sprite::new(id, TilePos::new(x, y), SpriteKind::Structure(state), visual(&sheet, 0, (0, 0)))
    }

    #[test]
    fn test_flag_unreadable_before_resolution() {
        let base = structure("NUKE", 1, 1, 0);
        let err = base.structure().unwrap().is_rebuilt("NUKE").unwrap_err();
        assert_eq!(err, RenderError::UnresolvedRebuilt { id: "NUKE".to_string() });
    }

    #[test]
    fn test_resolution_matches_tile_and_id() {
        let mut base =
            vec![structure("NUKE", 1, 1, 0), structure("PYLE", 4, 4, 1), structure("HQ", 8, 8, 2)];
        let placed = vec![
            structure("NUKE", 1, 1, -1),
            structure("PYLE", 5, 4, -1),
            structure("NUKE", 8, 8, -1),
        ];

        resolve_rebuilt(&mut base, &placed);

        let flags: Vec<bool> =
            base.iter().map(|s| s.structure().unwrap().is_rebuilt(&s.id).unwrap()).collect();
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_is_base() {
        assert!(structure("NUKE", 0, 0, 0).structure().unwrap().is_base());
        assert!(!structure("NUKE", 0, 0, -1).structure().unwrap().is_base());
    }
}
