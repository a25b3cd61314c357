//! battle_core - Round-based combat resolution engine
//!
//! This library provides:
//! - CombatParameters: Additive/multiplicative stat records and the modifier chain
//! - AbilityDefinition: Skill data with trigger, target rule and payload
//! - TargetSpec: The `scope:quantity[:method[:param]]` targeting language
//! - EffectSet: Status effect and immunity lifecycle
//! - Combatant: Runtime state of one character in a battle
//! - Battle: The round loop, turn order and termination
//! - BattleLog: Ordered, JSON-exportable event record

pub mod ability;
pub mod battle;
pub mod combatant;
pub mod config;
pub mod effect;
pub mod params;
pub mod prelude;
pub mod targeting;
pub mod types;

// Re-export core types for convenience
pub use ability::{AbilityDefinition, AbilityError, EffectPayload, ResolvedAbility};
pub use battle::{
    simulate, ActionEvent, ActionSource, Battle, BattleConfig, BattleError, BattleEvent, BattleLog,
    BattleReport, BattleState, DrawReason, Outcome, TargetOutcome,
};
pub use combatant::{ActionPlan, Combatant, DamageOutcome, HealOutcome};
pub use config::{BattleConstants, BattleSetup, ConfigError};
pub use effect::{EffectKind, EffectMode, EffectRegistry, RegistryError};
pub use params::{
    aggregate, AggregateError, CharacterSnapshot, CombatParameters, ModifierSource,
    ParameterMultipliers,
};
pub use targeting::{TargetParseError, TargetSpec};
pub use types::{Attribute, CombatantId, Side, TriggerCondition};
