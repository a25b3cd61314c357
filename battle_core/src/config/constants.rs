//! Battle constants configuration

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunable battle constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConstants {
    #[serde(default)]
    pub rounds: RoundConstants,
    #[serde(default)]
    pub evasion: EvasionConstants,
}

impl Default for BattleConstants {
    fn default() -> Self {
        BattleConstants {
            rounds: RoundConstants::default(),
            evasion: EvasionConstants::default(),
        }
    }
}

impl BattleConstants {
    /// Probability that a hit against `evasion` is dodged
    pub fn evade_chance(&self, evasion: f64) -> f64 {
        self.evasion.chance(evasion)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds.cap == 0 {
            return Err(ConfigError::ValidationError(
                "rounds.cap must be at least 1".to_string(),
            ));
        }
        self.evasion.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundConstants {
    /// Rounds before a battle is declared a draw
    #[serde(default = "default_round_cap")]
    pub cap: u32,
}

impl Default for RoundConstants {
    fn default() -> Self {
        RoundConstants {
            cap: default_round_cap(),
        }
    }
}

fn default_round_cap() -> u32 {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvasionConstants {
    /// Formula constant: chance = evasion / (evasion + scale)
    #[serde(default = "default_evasion_scale")]
    pub scale: f64,
    /// Upper bound on the dodge chance
    #[serde(default = "default_max_chance")]
    pub max_chance: f64,
}

impl Default for EvasionConstants {
    fn default() -> Self {
        EvasionConstants {
            scale: default_evasion_scale(),
            max_chance: default_max_chance(),
        }
    }
}

impl EvasionConstants {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "evasion.scale must be finite and positive, got {}",
                self.scale
            )));
        }
        if !(0.0..=1.0).contains(&self.max_chance) {
            return Err(ConfigError::ValidationError(format!(
                "evasion.max_chance must be within [0, 1], got {}",
                self.max_chance
            )));
        }
        Ok(())
    }

    pub fn chance(&self, evasion: f64) -> f64 {
        if evasion.is_nan() || evasion <= 0.0 {
            return 0.0;
        }
        // min/max rather than clamp: a NaN bound must not panic
        let cap = self.max_chance.min(1.0).max(0.0);
        (evasion / (evasion + self.scale)).min(cap).max(0.0)
    }
}

fn default_evasion_scale() -> f64 {
    100.0
}

fn default_max_chance() -> f64 {
    0.75
}
