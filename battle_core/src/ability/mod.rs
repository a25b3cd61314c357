//! AbilityDefinition - Immutable skill description loaded from character data

use crate::effect::{EffectRegistry, EffectTemplate, ImmunityTemplate};
use crate::targeting::{TargetParseError, TargetSpec};
use crate::types::TriggerCondition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Highest ability tier; tier 0 is the passive pool
pub const MAX_TIER: u8 = 5;

/// Display name used in the log for the fallback attack
pub const BASIC_ATTACK_NAME: &str = "basic attack";

/// Target rule of the fallback attack
pub const BASIC_ATTACK_RULE: &str = "enemy:1:random";

/// Effect/immunity names plus free-form parameters carried by an ability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectPayload {
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub immunity: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

/// Describes a skill: when it fires, whom it hits and what it does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Unique ability identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// 0 = passive pool, 1-5 = active pool
    #[serde(default)]
    pub tier: u8,
    #[serde(default = "default_trigger")]
    pub trigger: TriggerCondition,
    /// Target rule, e.g. `enemy:2:highest:damage`
    #[serde(default = "default_target")]
    pub target: String,
    /// Probability of firing when off cooldown
    #[serde(default = "default_chance")]
    pub chance: f64,
    /// Motion-end decays before the ability is ready again
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default)]
    pub damage: f64,
    #[serde(default)]
    pub healing: f64,
    #[serde(default)]
    pub payload: EffectPayload,
}

fn default_trigger() -> TriggerCondition {
    TriggerCondition::Passive
}

fn default_target() -> String {
    BASIC_ATTACK_RULE.to_string()
}

fn default_chance() -> f64 {
    1.0
}

impl AbilityDefinition {
    /// A certain-to-fire ability with no payload aimed at one random enemy
    pub fn new(id: impl Into<String>, name: impl Into<String>, tier: u8) -> Self {
        AbilityDefinition {
            id: id.into(),
            name: name.into(),
            tier,
            trigger: default_trigger(),
            target: default_target(),
            chance: default_chance(),
            cooldown: 0,
            damage: 0.0,
            healing: 0.0,
            payload: EffectPayload::default(),
        }
    }

    pub fn with_target(mut self, rule: impl Into<String>) -> Self {
        self.target = rule.into();
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerCondition) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = chance;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_damage(mut self, damage: f64) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_healing(mut self, healing: f64) -> Self {
        self.healing = healing;
        self
    }

    pub fn with_effect(mut self, name: impl Into<String>) -> Self {
        self.payload.effect = Some(name.into());
        self
    }

    pub fn with_immunity(mut self, name: impl Into<String>) -> Self {
        self.payload.immunity = Some(name.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.payload.params.insert(key.into(), value);
        self
    }

    pub fn is_passive(&self) -> bool {
        self.tier == 0
    }

    /// Check the numeric ranges of the definition
    pub fn validate(&self) -> Result<(), AbilityError> {
        if self.tier > MAX_TIER {
            return Err(AbilityError::TierOutOfRange {
                ability: self.id.clone(),
                tier: self.tier,
            });
        }
        if !(0.0..=1.0).contains(&self.chance) {
            return Err(AbilityError::ChanceOutOfRange {
                ability: self.id.clone(),
                chance: self.chance,
            });
        }
        if self.damage.is_nan() || self.damage < 0.0 {
            return Err(AbilityError::NegativeDamage {
                ability: self.id.clone(),
                damage: self.damage,
            });
        }
        if self.healing.is_nan() || self.healing < 0.0 {
            return Err(AbilityError::NegativeHealing {
                ability: self.id.clone(),
                healing: self.healing,
            });
        }
        Ok(())
    }
}

/// Invalid ability data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbilityError {
    #[error("ability '{ability}' has tier {tier}, expected 0-5")]
    TierOutOfRange { ability: String, tier: u8 },
    #[error("ability '{ability}' has chance {chance}, expected 0.0-1.0")]
    ChanceOutOfRange { ability: String, chance: f64 },
    #[error("ability '{ability}' has negative damage {damage}")]
    NegativeDamage { ability: String, damage: f64 },
    #[error("ability '{ability}' has negative healing {healing}")]
    NegativeHealing { ability: String, healing: f64 },
    #[error("character '{character}' selects both '{first}' and '{second}' for tier {tier}")]
    DuplicateTier {
        character: String,
        tier: u8,
        first: String,
        second: String,
    },
    #[error("character '{character}' carries ability id '{ability}' more than once")]
    DuplicateId { character: String, ability: String },
}

/// An ability with its target rule parsed and payload names resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAbility {
    pub definition: AbilityDefinition,
    /// Parse result kept as-is; a bad rule whiffs when the ability fires
    pub target: Result<TargetSpec, TargetParseError>,
    pub effect: Option<EffectTemplate>,
    pub immunity: Option<ImmunityTemplate>,
}

impl ResolvedAbility {
    /// Validate a definition and resolve it against the effect catalogue
    ///
    /// Unknown effect or immunity names are dropped with a warning; the
    /// ability keeps its damage and healing.
    pub fn resolve(
        definition: &AbilityDefinition,
        registry: &EffectRegistry,
    ) -> Result<Self, AbilityError> {
        definition.validate()?;

        let effect = definition.payload.effect.as_deref().and_then(|name| {
            registry
                .effect(name)
                .map_err(|err| {
                    tracing::warn!(ability = %definition.id, %err, "dropping effect payload");
                })
                .ok()
                .cloned()
        });
        let immunity = definition.payload.immunity.as_deref().and_then(|name| {
            registry
                .immunity(name)
                .map_err(|err| {
                    tracing::warn!(ability = %definition.id, %err, "dropping immunity payload");
                })
                .ok()
                .cloned()
        });

        Ok(ResolvedAbility {
            definition: definition.clone(),
            target: TargetSpec::parse(&definition.target),
            effect,
            immunity,
        })
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn tier(&self) -> u8 {
        self.definition.tier
    }

    pub fn params(&self) -> &BTreeMap<String, f64> {
        &self.definition.payload.params
    }
}
