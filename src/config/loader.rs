//! Configuration loading for render settings files

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::schema::RenderConfig;

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse render config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Parse and validate TOML render settings.
///
/// # Example
/// ```
/// use mapraster::config::parse_config;
///
/// let config = parse_config("game = \"red-alert\"\nradar_scales = [3, 6]").unwrap();
/// assert_eq!(config.radar_scales, vec![3, 6]);
/// ```
pub fn parse_config(contents: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = toml::from_str(contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Load render settings from a file.
pub fn load_config(path: &Path) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    log::debug!("loading render config from {}", path.display());
    parse_config(&contents)
}
