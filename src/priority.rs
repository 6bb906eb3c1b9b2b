//! Draw order of sprites.
//!
//! The key is a single integer: the plane dominates, then the sort point's
//! row, then its column. Ties keep declaration order.

use crate::models::LEPTONS_PER_TILE;
use crate::profile::GameProfile;
use crate::sprite::Sprite;

/// Sort point of a sprite in leptons from the map origin.
pub fn sort_point(sprite: &Sprite) -> (i64, i64) {
    let leptons = LEPTONS_PER_TILE as i64;
    (
        sprite.tile.x as i64 * leptons + sprite.lepton.x as i64,
        sprite.tile.y as i64 * leptons + sprite.lepton.y as i64,
    )
}

/// Sort key of a sprite; lower draws first.
///
/// The sort point is clamped to the grid first, so a footprint hanging past
/// the last row can never reach into the next plane.
pub fn priority_key(sprite: &Sprite, profile: &GameProfile) -> i64 {
    let (pos_x, pos_y) = sort_point(sprite);
    let (max_x, max_y) = profile.max_lepton();
    let row = profile.map_width as i64 * LEPTONS_PER_TILE as i64;
    let position = pos_x.clamp(0, max_x) + pos_y.clamp(0, max_y) * row;
    position + sprite.plane.value() * profile.plane_constant()
}

/// Stable sort by [`priority_key`].
pub fn sort_by_priority(sprites: &mut [Sprite], profile: &GameProfile) {
    sprites.sort_by_cached_key(|sprite| priority_key(sprite, profile));
}
