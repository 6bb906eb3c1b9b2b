//! Render configuration
//!
//! Provides types and parsing for TOML render settings.

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::*;
