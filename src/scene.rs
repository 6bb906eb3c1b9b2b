//! Scene assembly: declarations to sprites
//!
//! Builds every sprite of a map from its decoded declarations, resolves
//! rebuilt base structures, merges the smudge layer, and checks frame
//! indices. The result is immutable input for the compositor.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::catalog::{has_turret, is_concealed, overlay_class, structure_type, OverlayClass};
use crate::config::RenderConfig;
use crate::decl::{self, Declarations, InfantryDecl, StructureDecl, UnitDecl};
use crate::error::{RenderError, Result, Warnings};
use crate::merge::{merge_smudges, suppress_rebuilt_bibs};
use crate::models::{Direction, FrameSource, Lepton, MapBounds, MapDescription, TilePos};
use crate::occupancy::TileGrid;
use crate::priority::sort_by_priority;
use crate::profile::GameProfile;
use crate::remap::FadeParams;
use crate::sprite::{
    body_facing, infantry_facing, resolve_rebuilt, subcell_lepton, subcell_pixel, DrawMode,
    PriorityPlane, Sprite, SpriteKind, StructureState, Visual,
};
use crate::theater::Theater;

/// Template drawn under empty cells.
pub const CLEAR_TEMPLATE: &str = "CLEAR1";

/// Density frames of resource overlay by number of resource neighbors.
const RESOURCE_FRAMES: [usize; 5] = [0, 2, 5, 8, 11];

/// Health at or below which structures show their damaged frame.
const DAMAGED_HEALTH: i32 = 128;

/// Blend strength of the darkening used on exposed concealed objects.
const CONCEALED_FADE: u8 = 128;

/// Blend strength of the crate highlight.
const CRATE_HIGHLIGHT: u8 = 96;

/// Turret frames follow the 32 body facings.
const TURRET_FRAME_BASE: usize = 32;

/// Every drawable of one map, grouped by category.
#[derive(Debug, Clone)]
pub struct Scene {
    pub bounds: MapBounds,
    /// Background tiles; drawn first, in row-major order, unsorted.
    pub templates: Vec<Visual>,
    /// Merged smudge layer, before rebuilt-bib suppression.
    pub smudges: Vec<Sprite>,
    pub overlay: Vec<Sprite>,
    pub terrain: Vec<Sprite>,
    pub units: Vec<Sprite>,
    pub infantry: Vec<Sprite>,
    /// Aircraft bodies followed by their ground shadows.
    pub aircraft: Vec<Sprite>,
    pub structures: Vec<Sprite>,
    /// Base list entries with their rebuilt flag resolved.
    pub base: Vec<Sprite>,
    pub declarations: Declarations,
}

impl Scene {
    /// Decode a map description and assemble its sprites.
    pub fn build(
        map: &MapDescription,
        theater: &mut Theater,
        profile: &GameProfile,
        config: &RenderConfig,
        warnings: &mut Warnings,
    ) -> Result<Scene> {
        let declarations = decl::decode(map, profile, warnings)?;
        let mut builder = Builder { theater, profile, config, warnings };

        let templates = builder.templates(map)?;
        let terrain = declarations
            .terrain
            .iter()
            .filter_map(|d| builder.terrain(&d.id, d.tile, d.trigger.clone()))
            .collect();
        let overlay = builder.overlay(&declarations);

        let mut units = Vec::new();
        for unit in &declarations.units {
            units.extend(builder.unit(unit));
        }
        let mut infantry = Vec::new();
        for soldier in &declarations.infantry {
            infantry.extend(builder.infantry(soldier)?);
        }
        let mut aircraft = Vec::new();
        for plane in &declarations.aircraft {
            if let Some((body, shadow)) = builder.aircraft(plane) {
                aircraft.push(body);
                aircraft.push(shadow);
            }
        }

        let structures: Vec<Sprite> =
            declarations.structures.iter().filter_map(|s| builder.structure(s)).collect();
        let mut base: Vec<Sprite> = declarations
            .base
            .iter()
            .filter_map(|b| {
                builder.base_structure(&declarations.base_house, &b.id, b.tile, b.number)
            })
            .collect();
        resolve_rebuilt(&mut base, &structures);
        for ghost in &mut base {
            if !is_rebuilt(ghost)? {
                ghost.set_mode(DrawMode::Dithered);
            }
        }

        let smudges = merge_smudges(
            builder.theater,
            profile,
            &declarations.smudges,
            &structures,
            &base,
            config.include_undefined,
            builder.warnings,
        );

        let scene = Scene {
            bounds: map.bounds,
            templates,
            smudges,
            overlay,
            terrain,
            units,
            infantry,
            aircraft,
            structures,
            base,
            declarations,
        };
        for sprite in scene.objects() {
            sprite.check_frames()?;
        }

        log::debug!(
            "assembled scene: {} templates, {} smudges, {} overlay, {} terrain, {} units, \
             {} infantry, {} aircraft sprites, {} structures, {} base",
            scene.templates.len(),
            scene.smudges.len(),
            scene.overlay.len(),
            scene.terrain.len(),
            scene.units.len(),
            scene.infantry.len(),
            scene.aircraft.len(),
            scene.structures.len(),
            scene.base.len(),
        );
        Ok(scene)
    }

    /// Every sprite except the smudge layer, grouped by category.
    pub fn objects(&self) -> impl Iterator<Item = &Sprite> {
        self.overlay
            .iter()
            .chain(&self.terrain)
            .chain(&self.units)
            .chain(&self.infantry)
            .chain(&self.aircraft)
            .chain(&self.structures)
            .chain(&self.base)
    }

    /// Sprites to draw after the templates, sorted by draw priority.
    ///
    /// Rebuilt base structures are left out (the real structure stands in
    /// for them), and so are bibs hidden under a rebuilt base bib.
    pub fn draw_list(&self, profile: &GameProfile) -> Result<Vec<Sprite>> {
        let mut sprites = suppress_rebuilt_bibs(self.smudges.clone(), &self.base)?;
        for sprite in self.objects() {
            if sprite.structure().is_some_and(|s| s.is_base()) && is_rebuilt(sprite)? {
                continue;
            }
            sprites.push(sprite.clone());
        }
        sort_by_priority(&mut sprites, profile);
        Ok(sprites)
    }
}

fn is_rebuilt(sprite: &Sprite) -> Result<bool> {
    match sprite.structure() {
        Some(state) => state.is_rebuilt(&sprite.id),
        None => Ok(false),
    }
}

struct Builder<'a> {
    theater: &'a mut Theater,
    profile: &'a GameProfile,
    config: &'a RenderConfig,
    warnings: &'a mut Warnings,
}

impl Builder<'_> {
    fn asset(&mut self, category: &str, id: &str, tile: TilePos) -> Option<Arc<dyn FrameSource>> {
        let asset = self.theater.asset(id);
        if asset.is_none() {
            self.warnings.push(format!(
                "{} '{}' at {} has no asset in theater {}",
                category,
                id,
                tile,
                self.theater.name()
            ));
        }
        asset
    }

    fn tile_origin(&self, tile: TilePos) -> (i32, i32) {
        let ts = self.profile.tile_size as i32;
        (tile.x * ts, tile.y * ts)
    }

    /// Offset that centers a frame on a point inside a tile.
    fn centered(
        &self,
        source: &dyn FrameSource,
        frame: usize,
        tile: TilePos,
        point: (i32, i32),
    ) -> (i32, i32) {
        let (width, height) =
            source.frame(frame).map_or((0, 0), |f| (f.width() as i32, f.height() as i32));
        let (x, y) = self.tile_origin(tile);
        (x + point.0 - width / 2, y + point.1 - height / 2)
    }

    fn tile_center(&self) -> (i32, i32) {
        let half = self.profile.tile_size as i32 / 2;
        (half, half)
    }

    /// Hide a concealed object, or show it dithered and darkened.
    fn conceal(&mut self, sprite: &mut Sprite) {
        if !is_concealed(&sprite.id) {
            return;
        }
        if self.config.expose_concealed {
            let black = self.theater.palette().nearest_index([0, 0, 0]);
            sprite.set_remap(self.theater.fade(FadeParams::basic(black, CONCEALED_FADE)));
            sprite.set_mode(DrawMode::Dithered);
            sprite.plane = PriorityPlane::Exposed;
        } else {
            sprite.set_mode(DrawMode::Invisible);
        }
    }

    fn templates(&mut self, map: &MapDescription) -> Result<Vec<Visual>> {
        let bounds = map.bounds;
        let mut visuals = Vec::with_capacity((bounds.width * bounds.height) as usize);
        let mut missing = BTreeSet::new();

        for y in bounds.y..bounds.y + bounds.height as i32 {
            for x in bounds.x..bounds.x + bounds.width as i32 {
                let tile = TilePos::new(x, y);
                let (id, icon) = match map.template_at(tile, self.profile.map_width) {
                    Some(cell) => (cell.template.as_str(), cell.icon),
                    None => (CLEAR_TEMPLATE, (x.rem_euclid(4) + y.rem_euclid(4) * 4) as usize),
                };
                let Some(source) = self.theater.template(id) else {
                    missing.insert(id.to_ascii_uppercase());
                    continue;
                };
                if icon >= source.frame_count() {
                    return Err(RenderError::FrameOutOfRange {
                        id: id.to_string(),
                        frame: icon,
                        frame_count: source.frame_count(),
                    });
                }
                let remap = self.theater.identity_remap();
                visuals.push(Visual::new(source, icon, self.tile_origin(tile), remap));
            }
        }

        for id in missing {
            let theater = self.theater.name();
            self.warnings.push(format!("template '{}' not found in theater {}", id, theater));
        }
        Ok(visuals)
    }

    fn terrain(&mut self, id: &str, tile: TilePos, trigger: Option<String>) -> Option<Sprite> {
        let source = self.asset("terrain", id, tile)?;
        let ts = self.profile.tile_size;
        let lepton = source.frame(0).map_or(Lepton::CENTER, |f| {
            Lepton::footprint_center(f.width().div_ceil(ts), f.height().div_ceil(ts))
        });
        let visual = Visual::new(source, 0, self.tile_origin(tile), self.theater.identity_remap());
        Some(
            Sprite::new(id, tile, SpriteKind::Terrain, visual)
                .with_lepton(lepton)
                .with_trigger(trigger),
        )
    }

    /// Overlay sprites in row-major order, with connection frames applied.
    fn overlay(&mut self, declarations: &Declarations) -> Vec<Sprite> {
        let mut grid: TileGrid<Sprite> =
            TileGrid::new(self.profile.map_width, self.profile.map_height);
        for decl in &declarations.overlay {
            let Some(source) = self.asset("overlay", &decl.id, decl.tile) else { continue };
            let origin = self.tile_origin(decl.tile);
            let visual = Visual::new(source, 0, origin, self.theater.identity_remap());
            let sprite = Sprite::new(decl.id.as_str(), decl.tile, SpriteKind::Overlay, visual);
            if let Err(rejected) = grid.replace(sprite) {
                log::debug!("overlay '{}' at {} outside the grid", rejected.id, rejected.tile);
            }
        }

        let frames: Vec<(TilePos, usize)> = grid
            .all_occupied()
            .filter_map(|(pos, sprite)| {
                let frame = match overlay_class(&sprite.id) {
                    OverlayClass::Wall => wall_mask(&grid, pos, &sprite.id),
                    OverlayClass::Resource => {
                        let count = Direction::ALL
                            .iter()
                            .filter(|&&dir| {
                                grid.adjacent(pos, dir)
                                    .is_some_and(|n| overlay_class(&n.id) == OverlayClass::Resource)
                            })
                            .count();
                        RESOURCE_FRAMES[count].min(sprite.frame_count().saturating_sub(1))
                    }
                    OverlayClass::Crate | OverlayClass::Plain => return None,
                };
                Some((pos, frame))
            })
            .collect();
        for (pos, frame) in frames {
            if let Some(sprite) = grid.get_mut(pos) {
                sprite.visual_mut().frame = frame;
            }
        }

        let mut sprites: Vec<Sprite> = grid.into_occupied().collect();
        if self.config.highlight_crates {
            let white = self.theater.palette().nearest_index([63, 63, 63]);
            let brighten = self.theater.fade(FadeParams::full_palette(white, CRATE_HIGHLIGHT));
            let crates = sprites.iter_mut().filter(|s| overlay_class(&s.id) == OverlayClass::Crate);
            for sprite in crates {
                sprite.plane = PriorityPlane::ExposedCrate;
                sprite.set_remap(Arc::clone(&brighten));
            }
        }
        sprites
    }

    fn unit(&mut self, decl: &UnitDecl) -> Option<Sprite> {
        let source = self.asset("unit", &decl.id, decl.tile)?;
        let facing = body_facing(decl.direction);
        let remap = self.theater.house_remap(&decl.house);
        let offset = self.centered(source.as_ref(), facing, decl.tile, self.tile_center());

        let mut sprite = Sprite::new(
            decl.id.as_str(),
            decl.tile,
            SpriteKind::Unit,
            Visual::new(Arc::clone(&source), facing, offset, Arc::clone(&remap)),
        )
        .with_trigger(decl.trigger.clone());
        if has_turret(&decl.id) {
            sprite.push_chained(Visual::new(source, TURRET_FRAME_BASE + facing, offset, remap));
        }
        self.conceal(&mut sprite);
        Some(sprite)
    }

    fn infantry(&mut self, decl: &InfantryDecl) -> Result<Option<Sprite>> {
        let invalid =
            || RenderError::InvalidSubcell { id: decl.id.clone(), value: decl.subcell as i64 };
        let lepton = subcell_lepton(decl.subcell).ok_or_else(invalid)?;
        let point = subcell_pixel(decl.subcell, self.profile.tile_size).ok_or_else(invalid)?;

        let Some(source) = self.asset("infantry", &decl.id, decl.tile) else {
            return Ok(None);
        };
        let facing = infantry_facing(decl.direction);
        let offset = self.centered(source.as_ref(), facing, decl.tile, point);
        let remap = self.theater.house_remap(&decl.house);

        let visual = Visual::new(source, facing, offset, remap);
        let mut sprite = Sprite::new(decl.id.as_str(), decl.tile, SpriteKind::Infantry, visual)
            .with_lepton(lepton)
            .with_trigger(decl.trigger.clone());
        self.conceal(&mut sprite);
        Ok(Some(sprite))
    }

    /// Aircraft body lifted off the ground, and its shadow on the ground.
    fn aircraft(&mut self, decl: &UnitDecl) -> Option<(Sprite, Sprite)> {
        let source = self.asset("aircraft", &decl.id, decl.tile)?;
        let facing = body_facing(decl.direction);
        let offset = self.centered(source.as_ref(), facing, decl.tile, self.tile_center());
        let remap = self.theater.house_remap(&decl.house);

        let shadow_visual =
            Visual::new(Arc::clone(&source), facing, offset, self.theater.identity_remap())
                .with_mode(DrawMode::ShadowFiltered);
        let shadow = Sprite::new(decl.id.as_str(), decl.tile, SpriteKind::Shadow, shadow_visual);

        let visual = Visual::new(source, facing, offset, remap);
        let mut body = Sprite::new(decl.id.as_str(), decl.tile, SpriteKind::Aircraft, visual)
            .with_trigger(decl.trigger.clone());
        body.shift(0, -(self.profile.tile_size as i32 / 2));
        self.conceal(&mut body);
        Some((body, shadow))
    }

    fn structure_sprite(
        &mut self,
        id: &str,
        tile: TilePos,
        house: &str,
        health: i32,
        state: StructureState,
    ) -> Option<Sprite> {
        let source = self.asset("structure", id, tile)?;
        let count = source.frame_count();
        let frame = if health <= DAMAGED_HEALTH && count >= 2 { count / 2 } else { 0 };
        let lepton = Lepton::footprint_center(state.footprint.width, state.footprint.height);
        let remap = self.theater.house_remap(house);
        let visual = Visual::new(source, frame, self.tile_origin(tile), remap);
        let mut sprite =
            Sprite::new(id, tile, SpriteKind::Structure(state), visual).with_lepton(lepton);
        self.conceal(&mut sprite);
        Some(sprite)
    }

    fn structure(&mut self, decl: &StructureDecl) -> Option<Sprite> {
        let state = StructureState::placed(decl.house.as_str(), structure_type(&decl.id));
        let sprite = self.structure_sprite(&decl.id, decl.tile, &decl.house, decl.health, state)?;
        Some(sprite.with_trigger(decl.trigger.clone()))
    }

    fn base_structure(
        &mut self,
        house: &str,
        id: &str,
        tile: TilePos,
        number: i32,
    ) -> Option<Sprite> {
        let state = StructureState::base(house, number, structure_type(id));
        self.structure_sprite(id, tile, house, i32::MAX, state)
    }
}

/// Neighbor mask of same-id walls: north 1, east 2, south 4, west 8.
fn wall_mask(grid: &TileGrid<Sprite>, pos: TilePos, id: &str) -> usize {
    Direction::ALL
        .iter()
        .enumerate()
        .filter(|(_, &dir)| grid.adjacent(pos, dir).is_some_and(|n| n.id.eq_ignore_ascii_case(id)))
        .map(|(bit, _)| 1 << bit)
        .sum()
}
