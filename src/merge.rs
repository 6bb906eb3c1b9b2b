//! Smudge and bib merging
//!
//! Builds the final ground-overlay layer from structure bibs and smudge
//! declarations. Placement goes through a [`TileGrid`], which keeps at most
//! one smudge per tile; base-structure bibs bypass it entirely.

use crate::decl::SmudgeDecl;
use crate::error::{Result, Warnings};
use crate::models::TilePos;
use crate::occupancy::TileGrid;
use crate::profile::GameProfile;
use crate::sprite::{
    bib_id_for_width, bib_width, classify_smudge, SmudgeState, SmudgeType, Sprite, SpriteKind,
    StructureRef, Visual,
};
use crate::theater::Theater;

/// Number of tile rows every bib covers.
pub const BIB_ROWS: u32 = 2;

/// One smudge sprite at a tile, or `None` when the asset is missing.
fn smudge_sprite(
    theater: &Theater,
    profile: &GameProfile,
    id: &str,
    tile: TilePos,
    frame: usize,
    state: SmudgeState,
) -> Option<Sprite> {
    let source = theater.asset(id)?;
    let ts = profile.tile_size as i32;
    let visual = Visual::new(source, frame, (tile.x * ts, tile.y * ts), theater.identity_remap());
    Some(Sprite::new(id, tile, SpriteKind::Smudge(state), visual))
}

/// Every cell sprite of a two-row bib whose top-left tile is `origin`.
///
/// Cell frames run row-major across the footprint. Cells outside the grid
/// are left out. Returns `None` when the bib asset is missing.
pub fn synthesize_bib(
    theater: &Theater,
    profile: &GameProfile,
    bib_id: &str,
    origin: TilePos,
    kind: SmudgeType,
    owner: Option<StructureRef>,
) -> Option<Vec<Sprite>> {
    let width = bib_width(bib_id)?;
    theater.asset(bib_id)?;

    let mut cells = Vec::with_capacity((width * BIB_ROWS) as usize);
    for row in 0..BIB_ROWS {
        for col in 0..width {
            let tile = origin.offset(col as i32, row as i32);
            if !profile.contains(tile) {
                log::debug!("{} cell {} falls outside the grid", bib_id, tile);
                continue;
            }
            let state = SmudgeState { kind, owner };
            let frame = (row * width + col) as usize;
            cells.extend(smudge_sprite(theater, profile, bib_id, tile, frame, state));
        }
    }
    Some(cells)
}

/// Bib cells of one structure, with warnings for bad widths or missing assets.
fn structure_bib(
    theater: &Theater,
    profile: &GameProfile,
    structure: &Sprite,
    owner: StructureRef,
    warnings: &mut Warnings,
) -> Vec<Sprite> {
    let Some(state) = structure.structure() else {
        return Vec::new();
    };
    if !state.footprint.bib {
        return Vec::new();
    }
    let Some(bib_id) = bib_id_for_width(state.footprint.width) else {
        warnings.push(format!(
            "structure '{}' at {} has a bib but width {}; no bib drawn",
            structure.id, structure.tile, state.footprint.width
        ));
        return Vec::new();
    };
    let origin = structure.tile.offset(0, state.footprint.height as i32 - 1);
    let kind = SmudgeType::StructureBib;
    synthesize_bib(theater, profile, bib_id, origin, kind, Some(owner)).unwrap_or_else(|| {
        warnings.push(format!("bib asset '{}' for '{}' not found", bib_id, structure.id));
        Vec::new()
    })
}

/// Resolve the final smudge layer.
///
/// Base-structure bibs come first, in base-list order, followed by whatever
/// survives in the tracker in row-major order.
pub fn merge_smudges(
    theater: &Theater,
    profile: &GameProfile,
    smudges: &[SmudgeDecl],
    placed: &[Sprite],
    base: &[Sprite],
    include_undefined: bool,
    warnings: &mut Warnings,
) -> Vec<Sprite> {
    let mut layer = Vec::new();
    for (index, structure) in base.iter().enumerate() {
        let owner = StructureRef { base: true, index };
        layer.extend(structure_bib(theater, profile, structure, owner, warnings));
    }

    let mut tracker: TileGrid<Sprite> = TileGrid::new(profile.map_width, profile.map_height);
    for (index, structure) in placed.iter().enumerate() {
        let owner = StructureRef { base: false, index };
        for cell in structure_bib(theater, profile, structure, owner, warnings) {
            track(&mut tracker, cell);
        }
    }

    for decl in smudges {
        let (kind, id) = classify_smudge(&decl.id);
        match kind {
            SmudgeType::SmudgeBib => {
                match synthesize_bib(theater, profile, &id, decl.tile, kind, None) {
                    Some(cells) => {
                        for cell in cells {
                            track(&mut tracker, cell);
                        }
                    }
                    None => warnings.push(format!("smudge asset '{}' not found", id)),
                }
            }
            SmudgeType::Crater => {
                if let Some(existing) = tracker.get_mut(decl.tile) {
                    if existing.smudge().is_some_and(|s| s.kind == SmudgeType::Crater) {
                        let count = existing.frame_count();
                        let visual = existing.visual_mut();
                        if visual.frame + 1 < count {
                            visual.frame += 1;
                        }
                    }
                    continue;
                }
                place_if_empty(theater, profile, &mut tracker, &id, decl, kind, warnings);
            }
            SmudgeType::Scorch | SmudgeType::StructureBib => {
                place_if_empty(theater, profile, &mut tracker, &id, decl, kind, warnings);
            }
            SmudgeType::Undefined => {
                if include_undefined {
                    warnings.push(format!("undefined smudge '{}' at {} included", id, decl.tile));
                    place_if_empty(theater, profile, &mut tracker, &id, decl, kind, warnings);
                } else {
                    warnings.push(format!("undefined smudge '{}' at {} skipped", id, decl.tile));
                }
            }
        }
    }

    layer.extend(tracker.into_occupied());
    layer
}

/// Store a smudge in the tracker; false when its tile is off the grid.
fn track(tracker: &mut TileGrid<Sprite>, sprite: Sprite) -> bool {
    match tracker.replace(sprite) {
        Ok(_) => true,
        Err(rejected) => {
            log::debug!("smudge '{}' at {} outside the grid", rejected.id, rejected.tile);
            false
        }
    }
}

fn place_if_empty(
    theater: &Theater,
    profile: &GameProfile,
    tracker: &mut TileGrid<Sprite>,
    id: &str,
    decl: &SmudgeDecl,
    kind: SmudgeType,
    warnings: &mut Warnings,
) {
    if tracker.is_occupied(decl.tile) {
        return;
    }
    match smudge_sprite(theater, profile, id, decl.tile, decl.frame, SmudgeState::new(kind)) {
        Some(sprite) => {
            track(tracker, sprite);
        }
        None => warnings.push(format!("smudge asset '{}' not found", id)),
    }
}

/// Drop placed-structure bibs that coincide with the bib of a rebuilt base
/// structure. Requires the rebuilt pass to have run.
pub fn suppress_rebuilt_bibs(layer: Vec<Sprite>, base: &[Sprite]) -> Result<Vec<Sprite>> {
    let mut rebuilt_cells: Vec<(TilePos, String)> = Vec::new();
    for sprite in &layer {
        let Some(owner) = structure_bib_owner(sprite) else { continue };
        if !owner.base {
            continue;
        }
        let Some(structure) = base.get(owner.index) else { continue };
        if let Some(state) = structure.structure() {
            if state.is_rebuilt(&structure.id)? {
                rebuilt_cells.push((sprite.tile, sprite.id.clone()));
            }
        }
    }

    Ok(layer
        .into_iter()
        .filter(|sprite| match structure_bib_owner(sprite) {
            Some(owner) if !owner.base => {
                !rebuilt_cells.iter().any(|(tile, id)| *tile == sprite.tile && *id == sprite.id)
            }
            _ => true,
        })
        .collect())
}

fn structure_bib_owner(sprite: &Sprite) -> Option<StructureRef> {
    sprite.smudge().filter(|s| s.kind == SmudgeType::StructureBib).and_then(|s| s.owner)
}
