//! Battle setup loading

use super::{BattleConstants, ConfigError};
use crate::battle::BattleConfig;
use crate::params::CharacterSnapshot;
use crate::types::Side;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to start one battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSetup {
    /// Overrides `constants.rounds.cap` when present
    #[serde(default)]
    pub round_cap: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub first_side: Side,
    #[serde(default)]
    pub constants: BattleConstants,
    #[serde(default)]
    pub attackers: Vec<CharacterSnapshot>,
    #[serde(default)]
    pub defenders: Vec<CharacterSnapshot>,
}

impl BattleSetup {
    /// Orchestrator settings described by this setup
    pub fn config(&self) -> BattleConfig {
        BattleConfig {
            round_cap: self.round_cap.unwrap_or(self.constants.rounds.cap),
            first_side: self.first_side,
            constants: self.constants.clone(),
        }
    }

    /// Reject setups that can never produce a battle
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attackers.is_empty() || self.defenders.is_empty() {
            return Err(ConfigError::ValidationError(
                "both rosters need at least one character".to_string(),
            ));
        }
        if self.config().round_cap == 0 {
            return Err(ConfigError::ValidationError(
                "round cap must be at least 1".to_string(),
            ));
        }
        self.constants.evasion.validate()
    }
}

/// Load a battle setup from a TOML file
pub fn load_battle_setup(path: &Path) -> Result<BattleSetup, ConfigError> {
    let setup: BattleSetup = super::load_toml(path)?;
    setup.validate()?;
    Ok(setup)
}

/// Load a battle setup from a TOML string
pub fn parse_battle_setup(content: &str) -> Result<BattleSetup, ConfigError> {
    let setup: BattleSetup = super::parse_toml(content)?;
    setup.validate()?;
    Ok(setup)
}
