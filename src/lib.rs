//! mapraster - pixel-accurate renderer for legacy RTS maps
//!
//! This library provides functionality to:
//! - Decode ordered map section records into typed declarations
//! - Assemble sprites with the original engine's placement and smudge rules
//! - Composite them in draw-priority order into an indexed image
//! - Render scaled radar images and a map-info annotation overlay
//!
//! Decoding of archive, sprite-sheet and palette files is left to callers;
//! they hand in decoded [`models::Frame`]s and a [`palette::Palette`].

pub mod catalog;
pub mod composite;
pub mod config;
pub mod decl;
pub mod error;
pub mod font;
pub mod merge;
pub mod models;
pub mod occupancy;
pub mod overlay;
pub mod palette;
pub mod priority;
pub mod profile;
pub mod radar;
pub mod remap;
pub mod render;
pub mod scene;
pub mod sprite;
pub mod theater;

pub use config::RenderConfig;
pub use error::{RenderError, Warning};
pub use profile::{Game, GameProfile};
pub use render::{
    render_batch, render_map, render_map_into, render_radar, RenderContext, RenderOutput,
};
pub use theater::Theater;
