//! Theater context: palette, assets, shadow filters and render caches
//!
//! A [`Theater`] bundles the visual resources of one environment. Its caches
//! hold pure functions of their keys (remap tables by parameters, mini-tiles
//! by frame identity), so reusing a theater across maps is safe.

use std::collections::HashMap;
use std::sync::Arc;

use crate::composite::ShadowFilter;
use crate::models::{FrameKey, FrameSource};
use crate::palette::Palette;
use crate::radar::{decompose_frame, MiniTileSet};
use crate::remap::{build_fade_table, FadeParams, RemapKey, RemapTable};

/// Shared visual resources for rendering maps of one environment.
#[derive(Debug)]
pub struct Theater {
    name: String,
    palette: Palette,
    palette_id: u32,
    assets: HashMap<String, Arc<dyn FrameSource>>,
    templates: HashMap<String, Arc<dyn FrameSource>>,
    shadow_filters: Vec<ShadowFilter>,
    identity: Arc<RemapTable>,
    remap_cache: HashMap<RemapKey, Arc<RemapTable>>,
    mini_tile_cache: HashMap<(FrameKey, u32), Arc<MiniTileSet>>,
}

impl Theater {
    pub fn new(name: impl Into<String>, palette: Palette) -> Self {
        let palette_id = palette.fingerprint();
        Self {
            name: name.into(),
            palette,
            palette_id,
            assets: HashMap::new(),
            templates: HashMap::new(),
            shadow_filters: Vec::new(),
            identity: Arc::new(RemapTable::identity()),
            remap_cache: HashMap::new(),
            mini_tile_cache: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Register an object asset (unit, structure, overlay, smudge, ...).
    pub fn add_asset(&mut self, id: &str, source: Arc<dyn FrameSource>) {
        self.assets.insert(id.to_ascii_uppercase(), source);
    }

    pub fn with_asset(mut self, id: &str, source: Arc<dyn FrameSource>) -> Self {
        self.add_asset(id, source);
        self
    }

    /// Register a terrain template asset.
    pub fn add_template(&mut self, id: &str, source: Arc<dyn FrameSource>) {
        self.templates.insert(id.to_ascii_uppercase(), source);
    }

    pub fn with_template(mut self, id: &str, source: Arc<dyn FrameSource>) -> Self {
        self.add_template(id, source);
        self
    }

    pub fn asset(&self, id: &str) -> Option<Arc<dyn FrameSource>> {
        self.assets.get(&id.to_ascii_uppercase()).cloned()
    }

    pub fn template(&self, id: &str) -> Option<Arc<dyn FrameSource>> {
        self.templates.get(&id.to_ascii_uppercase()).cloned()
    }

    /// Append a filter to the shadow chain; earlier filters take precedence.
    pub fn add_shadow_filter(&mut self, filter: ShadowFilter) {
        self.shadow_filters.push(filter);
    }

    pub fn shadow_filters(&self) -> &[ShadowFilter] {
        &self.shadow_filters
    }

    pub fn identity_remap(&self) -> Arc<RemapTable> {
        Arc::clone(&self.identity)
    }

    /// Fade table for this theater's palette, built once per parameter set.
    pub fn fade(&mut self, params: FadeParams) -> Arc<RemapTable> {
        let key = RemapKey::Fade { palette: self.palette_id, params };
        if let Some(table) = self.remap_cache.get(&key) {
            log::trace!("fade table cache hit: {:?}", params);
            return Arc::clone(table);
        }
        let table = Arc::new(build_fade_table(&self.palette, &params));
        self.remap_cache.insert(key, Arc::clone(&table));
        table
    }

    /// House-color table; unknown houses draw with their original colors.
    pub fn house_remap(&mut self, house: &str) -> Arc<RemapTable> {
        let Some(ramp) = crate::catalog::house_ramp(house) else {
            return self.identity_remap();
        };
        Arc::clone(
            self.remap_cache
                .entry(RemapKey::House(ramp))
                .or_insert_with(|| Arc::new(RemapTable::house(&ramp))),
        )
    }

    /// Mini-tiles of one frame, decomposed once per frame identity.
    ///
    /// The flag reports whether decomposing probed outside the frame; cache
    /// hits report `false` since nothing was sampled.
    pub fn mini_tiles(
        &mut self,
        source: &dyn FrameSource,
        frame: usize,
        tile_size: u32,
    ) -> Option<(Arc<MiniTileSet>, bool)> {
        let key = (source.frame_key(frame), tile_size);
        if let Some(tiles) = self.mini_tile_cache.get(&key) {
            log::trace!("mini-tile cache hit: {} frame {}", source.name(), frame);
            return Some((Arc::clone(tiles), false));
        }
        let decomposition = decompose_frame(source.frame(frame)?, tile_size);
        let tiles = Arc::new(decomposition.tiles);
        self.mini_tile_cache.insert(key, Arc::clone(&tiles));
        Some((tiles, decomposition.probed_outside))
    }

    pub fn cached_remaps(&self) -> usize {
        self.remap_cache.len()
    }

    pub fn cached_mini_tiles(&self) -> usize {
        self.mini_tile_cache.len()
    }
}
