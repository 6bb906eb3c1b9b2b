//! Configuration schema for map rendering
//!
//! Every field is optional in TOML; missing fields take the defaults below.

use serde::{Deserialize, Serialize};

use crate::profile::{Game, GameProfile};

/// Flags and lists that steer one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Coordinate profile and fade preset family
    pub game: Game,
    /// Draw smudges whose id is not a known crater, scorch mark or bib
    pub include_undefined: bool,
    /// Draw concealed objects (stealth units, mines) dithered instead of hiding them
    pub expose_concealed: bool,
    /// Lift crates above everything else and brighten them
    pub highlight_crates: bool,
    pub draw_base_numbers: bool,
    pub draw_waypoints: bool,
    pub draw_cell_triggers: bool,
    pub draw_sprite_triggers: bool,
    /// Pixel edge of one tile in each radar image
    pub radar_scales: Vec<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            game: Game::default(),
            include_undefined: false,
            expose_concealed: false,
            highlight_crates: false,
            draw_base_numbers: false,
            draw_waypoints: false,
            draw_cell_triggers: false,
            draw_sprite_triggers: false,
            radar_scales: default_radar_scales(),
        }
    }
}

fn default_radar_scales() -> Vec<u32> {
    vec![3]
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Name of the invalid field
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' {}", self.field, self.message)
    }
}

impl RenderConfig {
    pub fn profile(&self) -> GameProfile {
        GameProfile::for_game(self.game)
    }

    /// Whether any map-info annotation is enabled.
    pub fn draws_overlay(&self) -> bool {
        self.draw_base_numbers
            || self.draw_waypoints
            || self.draw_cell_triggers
            || self.draw_sprite_triggers
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.radar_scales.is_empty() {
            errors.push(ConfigValidationError {
                field: "radar_scales".to_string(),
                message: "must list at least one scale".to_string(),
            });
        }
        if self.radar_scales.contains(&0) {
            errors.push(ConfigValidationError {
                field: "radar_scales".to_string(),
                message: "scales must be positive integers".to_string(),
            });
        }

        errors
    }
}
