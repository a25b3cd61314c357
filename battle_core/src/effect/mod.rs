//! Status effects and immunities
//!
//! Effect kinds form a closed catalogue. Ability data names effects by free
//! text; those names are resolved once against an [`EffectRegistry`] when a
//! combatant is built, so nothing is looked up by string during a round.

mod active;
mod engine;

pub use active::{ActiveEffect, Immunity};
pub use engine::{AttachOutcome, EffectSet, EffectTick, ImmunityOutcome, StatusImpact, TickSummary};

use crate::params::CombatParameters;
use crate::types::CombatantId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Payload parameter overriding an effect's lifetime
pub const PARAM_LIFETIME: &str = "lifetime";
/// Payload parameter overriding an effect's magnitude
pub const PARAM_MAGNITUDE: &str = "magnitude";
/// Payload parameter overriding an immunity's lifetime
pub const PARAM_IMMUNITY_LIFETIME: &str = "immunity_lifetime";

/// How an effect delivers its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMode {
    /// Reapplies its payload once per round until the lifetime runs out
    Cycle,
    /// Applies once on attach and once (reverted) on detach
    StartEnd,
}

/// Every effect the engine knows how to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Poison,
    Burn,
    Bleed,
    Regeneration,
    Stun,
    Weakness,
    Fortify,
    Haste,
}

impl EffectKind {
    pub fn mode(self) -> EffectMode {
        match self {
            EffectKind::Poison | EffectKind::Burn | EffectKind::Bleed | EffectKind::Regeneration => {
                EffectMode::Cycle
            }
            EffectKind::Stun | EffectKind::Weakness | EffectKind::Fortify | EffectKind::Haste => {
                EffectMode::StartEnd
            }
        }
    }

    /// Beneficial effects fire `on_buff` passives, the rest `on_debuff`
    pub fn is_buff(self) -> bool {
        matches!(
            self,
            EffectKind::Regeneration | EffectKind::Fortify | EffectKind::Haste
        )
    }

    /// Payload applied on every round tick (cycle effects only)
    pub fn tick_impact(self, magnitude: f64) -> Option<StatusImpact> {
        match self {
            EffectKind::Poison | EffectKind::Burn | EffectKind::Bleed => {
                Some(StatusImpact::Damage(magnitude))
            }
            EffectKind::Regeneration => Some(StatusImpact::Heal(magnitude)),
            _ => None,
        }
    }

    /// Stat delta applied when a start-end effect attaches
    pub fn attach_impact(self, magnitude: f64) -> Option<StatusImpact> {
        let delta = match self {
            EffectKind::Weakness => CombatParameters {
                damage: -magnitude,
                ..CombatParameters::zero()
            },
            EffectKind::Fortify => CombatParameters {
                resistance: magnitude,
                ..CombatParameters::zero()
            },
            EffectKind::Haste => CombatParameters {
                speed: magnitude,
                ..CombatParameters::zero()
            },
            _ => return None,
        };
        Some(StatusImpact::Adjust(delta))
    }

    /// Stat delta applied when a start-end effect detaches; undoes the attach delta
    pub fn detach_impact(self, magnitude: f64) -> Option<StatusImpact> {
        match self.attach_impact(magnitude) {
            Some(StatusImpact::Adjust(delta)) => Some(StatusImpact::Adjust(-delta)),
            _ => None,
        }
    }
}

/// Named effect definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub name: String,
    pub kind: EffectKind,
    pub lifetime: u32,
    #[serde(default)]
    pub magnitude: f64,
}

impl EffectTemplate {
    /// Build a live effect, letting payload parameters override the defaults
    pub fn instantiate(&self, params: &BTreeMap<String, f64>, source: CombatantId) -> ActiveEffect {
        let lifetime = lifetime_param(params, PARAM_LIFETIME).unwrap_or(self.lifetime);
        let magnitude = params
            .get(PARAM_MAGNITUDE)
            .copied()
            .filter(|m| m.is_finite() && *m >= 0.0)
            .unwrap_or(self.magnitude);
        ActiveEffect::new(self.name.clone(), self.kind, lifetime, magnitude, source)
    }
}

/// Named immunity definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmunityTemplate {
    pub name: String,
    pub guards: EffectKind,
    pub lifetime: u32,
}

impl ImmunityTemplate {
    pub fn instantiate(&self, params: &BTreeMap<String, f64>) -> Immunity {
        let lifetime = lifetime_param(params, PARAM_IMMUNITY_LIFETIME).unwrap_or(self.lifetime);
        Immunity::new(self.name.clone(), self.guards, lifetime)
    }
}

fn lifetime_param(params: &BTreeMap<String, f64>, key: &str) -> Option<u32> {
    params
        .get(key)
        .copied()
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v as u32)
}

/// Name lookup failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown effect '{0}'")]
    UnknownEffect(String),
    #[error("unknown immunity '{0}'")]
    UnknownImmunity(String),
}

/// Effect and immunity definitions keyed by name
///
/// Passed explicitly into battle construction so every battle can run with its
/// own catalogue.
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: HashMap<String, EffectTemplate>,
    immunities: HashMap<String, ImmunityTemplate>,
}

impl EffectRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        EffectRegistry::default()
    }

    /// Register an effect under its name
    pub fn register_effect(&mut self, template: EffectTemplate) {
        self.effects.insert(template.name.clone(), template);
    }

    /// Register an immunity under its name
    pub fn register_immunity(&mut self, template: ImmunityTemplate) {
        self.immunities.insert(template.name.clone(), template);
    }

    pub fn effect(&self, name: &str) -> Result<&EffectTemplate, RegistryError> {
        self.effects
            .get(name)
            .ok_or_else(|| RegistryError::UnknownEffect(name.to_string()))
    }

    pub fn immunity(&self, name: &str) -> Result<&ImmunityTemplate, RegistryError> {
        self.immunities
            .get(name)
            .ok_or_else(|| RegistryError::UnknownImmunity(name.to_string()))
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    pub fn immunity_count(&self) -> usize {
        self.immunities.len()
    }

    /// Registry with one effect per kind and one immunity guarding each kind
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        let effects = [
            ("poison", EffectKind::Poison, 3, 4.0),
            ("burn", EffectKind::Burn, 2, 6.0),
            ("bleed", EffectKind::Bleed, 4, 2.0),
            ("regeneration", EffectKind::Regeneration, 3, 5.0),
            ("stun", EffectKind::Stun, 2, 0.0),
            ("weakness", EffectKind::Weakness, 2, 3.0),
            ("fortify", EffectKind::Fortify, 2, 1.0),
            ("haste", EffectKind::Haste, 2, 5.0),
        ];
        for (name, kind, lifetime, magnitude) in effects {
            registry.register_effect(EffectTemplate {
                name: name.to_string(),
                kind,
                lifetime,
                magnitude,
            });
            registry.register_immunity(ImmunityTemplate {
                name: format!("{}_immunity", name),
                guards: kind,
                lifetime: 3,
            });
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    fn source() -> CombatantId {
        CombatantId::new(Side::Attackers, 0)
    }

    #[test]
    fn test_modes() {
        assert_eq!(EffectKind::Poison.mode(), EffectMode::Cycle);
        assert_eq!(EffectKind::Regeneration.mode(), EffectMode::Cycle);
        assert_eq!(EffectKind::Stun.mode(), EffectMode::StartEnd);
        assert_eq!(EffectKind::Fortify.mode(), EffectMode::StartEnd);
    }

    #[test]
    fn test_detach_reverts_attach() {
        let attach = EffectKind::Weakness.attach_impact(3.0);
        let detach = EffectKind::Weakness.detach_impact(3.0);
        match (attach, detach) {
            (Some(StatusImpact::Adjust(a)), Some(StatusImpact::Adjust(d))) => {
                assert_eq!(a + d, CombatParameters::zero());
                assert!((a.damage + 3.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected impacts: {:?}", other),
        }
    }

    #[test]
    fn test_stun_has_no_stat_delta() {
        assert!(EffectKind::Stun.attach_impact(1.0).is_none());
        assert!(EffectKind::Stun.detach_impact(1.0).is_none());
        assert!(EffectKind::Stun.tick_impact(1.0).is_none());
    }

    #[test]
    fn test_default_registry() {
        let registry = EffectRegistry::with_defaults();
        assert_eq!(registry.effect_count(), 8);
        assert_eq!(registry.immunity_count(), 8);
        assert_eq!(registry.effect("poison").unwrap().kind, EffectKind::Poison);
        assert_eq!(
            registry.immunity("poison_immunity").unwrap().guards,
            EffectKind::Poison
        );
    }

    #[test]
    fn test_unknown_names() {
        let registry = EffectRegistry::with_defaults();
        assert_eq!(
            registry.effect("frostbite"),
            Err(RegistryError::UnknownEffect("frostbite".to_string()))
        );
        assert!(registry.immunity("poison").is_err());
    }

    #[test]
    fn test_params_override_template() {
        let template = EffectTemplate {
            name: "poison".to_string(),
            kind: EffectKind::Poison,
            lifetime: 3,
            magnitude: 4.0,
        };
        let mut params = BTreeMap::new();
        params.insert(PARAM_LIFETIME.to_string(), 5.0);
        params.insert(PARAM_MAGNITUDE.to_string(), 10.0);

        let effect = template.instantiate(&params, source());
        assert_eq!(effect.lifetime, 5);
        assert!((effect.magnitude - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_params_fall_back() {
        let template = EffectTemplate {
            name: "burn".to_string(),
            kind: EffectKind::Burn,
            lifetime: 2,
            magnitude: 6.0,
        };
        let mut params = BTreeMap::new();
        params.insert(PARAM_LIFETIME.to_string(), 0.0);
        params.insert(PARAM_MAGNITUDE.to_string(), -1.0);

        let effect = template.instantiate(&params, source());
        assert_eq!(effect.lifetime, 2);
        assert!((effect.magnitude - 6.0).abs() < f64::EPSILON);
    }
}
