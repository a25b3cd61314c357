//! Configuration loading from TOML files

mod constants;
mod effects;
mod roster;

pub use constants::{BattleConstants, EvasionConstants, RoundConstants};
pub use effects::{load_effect_registry, parse_effect_registry, EffectsConfig};
pub use roster::{load_battle_setup, parse_battle_setup, BattleSetup};

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load a TOML string and deserialize it
pub fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    Ok(config)
}
