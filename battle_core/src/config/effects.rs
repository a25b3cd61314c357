//! Effect catalogue loading

use super::ConfigError;
use crate::effect::{EffectRegistry, EffectTemplate, ImmunityTemplate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Container for effect and immunity definitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default)]
    pub effects: Vec<EffectTemplate>,
    #[serde(default)]
    pub immunities: Vec<ImmunityTemplate>,
}

impl EffectsConfig {
    /// Reject definitions the engine cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for effect in &self.effects {
            if !seen.insert(effect.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "effect '{}' is defined twice",
                    effect.name
                )));
            }
            if effect.lifetime == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "effect '{}' has a lifetime of 0",
                    effect.name
                )));
            }
            if !effect.magnitude.is_finite() || effect.magnitude < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "effect '{}' has invalid magnitude {}",
                    effect.name, effect.magnitude
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for immunity in &self.immunities {
            if !seen.insert(immunity.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "immunity '{}' is defined twice",
                    immunity.name
                )));
            }
            if immunity.lifetime == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "immunity '{}' has a lifetime of 0",
                    immunity.name
                )));
            }
        }

        Ok(())
    }

    pub fn into_registry(self) -> EffectRegistry {
        let mut registry = EffectRegistry::new();
        for effect in self.effects {
            registry.register_effect(effect);
        }
        for immunity in self.immunities {
            registry.register_immunity(immunity);
        }
        registry
    }
}

/// Load an effect registry from a TOML file
pub fn load_effect_registry(path: &Path) -> Result<EffectRegistry, ConfigError> {
    let config: EffectsConfig = super::load_toml(path)?;
    config.validate()?;
    Ok(config.into_registry())
}

/// Load an effect registry from a TOML string
pub fn parse_effect_registry(content: &str) -> Result<EffectRegistry, ConfigError> {
    let config: EffectsConfig = super::parse_toml(content)?;
    config.validate()?;
    Ok(config.into_registry())
}
