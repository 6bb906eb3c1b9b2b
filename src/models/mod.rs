//! Data models consumed by the renderer (tiles, frames, map records)

mod frame;
mod map;
mod tile;

// Re-export all public types
pub use frame::{Frame, FrameKey, FrameSource, SourceId, SpriteSheet};
pub use map::{MapDescription, Record, TemplateCell};
pub use tile::{Direction, Lepton, MapBounds, Rect, TilePos, LEPTONS_PER_TILE};
