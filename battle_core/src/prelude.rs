//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Stat model
pub use crate::params::{aggregate, CharacterSnapshot, CombatParameters, ParameterMultipliers};
pub use crate::types::{Attribute, CombatantId, Side, TriggerCondition};

// Abilities and targeting
pub use crate::ability::AbilityDefinition;
pub use crate::targeting::TargetSpec;

// Effects
pub use crate::effect::{EffectKind, EffectRegistry};

// Battle
pub use crate::battle::{simulate, Battle, BattleConfig, BattleLog, BattleReport, Outcome};
pub use crate::combatant::Combatant;

// Config
pub use crate::config::{load_battle_setup, BattleConstants, BattleSetup};
