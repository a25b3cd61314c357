//! Modifier chain - Derives a combatant's baseline parameters from a character snapshot

use super::{CombatParameters, ParameterMultipliers};
use crate::ability::AbilityDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Smallest resistance a combatant may carry; damage is divided by it
pub const MIN_RESISTANCE: f64 = 1e-6;

/// A class, race or subclass: additive and multiplicative bonuses plus the
/// passive abilities it grants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifierSource {
    pub name: String,
    #[serde(default)]
    pub additive: CombatParameters,
    #[serde(default)]
    pub multiplicative: ParameterMultipliers,
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

impl ModifierSource {
    /// A source that leaves every parameter untouched
    pub fn neutral(name: impl Into<String>) -> Self {
        ModifierSource {
            name: name.into(),
            ..ModifierSource::default()
        }
    }
}

/// An equipped item; only its multipliers take part in the chain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GearModifier {
    pub name: String,
    #[serde(default)]
    pub multiplicative: ParameterMultipliers,
}

/// A socketed rune; contributes passive abilities only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuneSource {
    pub name: String,
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

/// Fully resolved, read-only character aggregate consumed by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default = "CombatParameters::character_baseline")]
    pub additive: CombatParameters,
    #[serde(default)]
    pub multiplicative: ParameterMultipliers,
    #[serde(default)]
    pub class: Option<ModifierSource>,
    #[serde(default)]
    pub race: Option<ModifierSource>,
    #[serde(default)]
    pub subclass: Option<ModifierSource>,
    #[serde(default)]
    pub items: Vec<GearModifier>,
    #[serde(default)]
    pub runes: Vec<RuneSource>,
    /// Abilities the character knows, tiers 0 through 5
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

fn default_level() -> u32 {
    1
}

impl CharacterSnapshot {
    /// A level-1 character with baseline stats and neutral class, race and subclass
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        CharacterSnapshot {
            id: id.into(),
            name: name.into(),
            level: 1,
            additive: CombatParameters::character_baseline(),
            multiplicative: ParameterMultipliers::one(),
            class: Some(ModifierSource::neutral("class")),
            race: Some(ModifierSource::neutral("race")),
            subclass: Some(ModifierSource::neutral("subclass")),
            items: Vec::new(),
            runes: Vec::new(),
            abilities: Vec::new(),
        }
    }

    /// Replace the character's own additive record
    pub fn with_additive(mut self, additive: CombatParameters) -> Self {
        self.additive = additive;
        self
    }

    /// Add a known ability
    pub fn with_ability(mut self, ability: AbilityDefinition) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Abilities granted by class, race, subclass and runes, in that order
    pub fn granted_abilities(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.class
            .iter()
            .chain(self.race.iter())
            .chain(self.subclass.iter())
            .flat_map(|source| source.abilities.iter())
            .chain(self.runes.iter().flat_map(|rune| rune.abilities.iter()))
    }

    fn source(&self, kind: ModifierSourceKind) -> Result<&ModifierSource, AggregateError> {
        let source = match kind {
            ModifierSourceKind::Class => self.class.as_ref(),
            ModifierSourceKind::Race => self.race.as_ref(),
            ModifierSourceKind::Subclass => self.subclass.as_ref(),
        };
        source.ok_or_else(|| AggregateError::MissingModifierSource {
            character: self.id.clone(),
            kind,
        })
    }
}

/// Required modifier sources of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierSourceKind {
    Class,
    Race,
    Subclass,
}

impl fmt::Display for ModifierSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierSourceKind::Class => write!(f, "class"),
            ModifierSourceKind::Race => write!(f, "race"),
            ModifierSourceKind::Subclass => write!(f, "subclass"),
        }
    }
}

/// Stat aggregation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("character '{character}' has no {kind} modifier source")]
    MissingModifierSource {
        character: String,
        kind: ModifierSourceKind,
    },
    #[error("character '{character}' resolves to non-positive resistance {value}")]
    NonPositiveResistance { character: String, value: f64 },
    #[error("character '{character}' resolves to non-positive vitality {value}")]
    NonPositiveVitality { character: String, value: f64 },
}

/// Derive baseline parameters for a character
///
/// The chain is evaluated in a fixed order; the steps do not commute:
/// 1. `base = additive * (multiplicative * level)`
/// 2. `base += class.additive + race.additive + subclass.additive`
/// 3. `base *= class.multiplicative * race.multiplicative * subclass.multiplicative`
/// 4. `base *= item.multiplicative` for each equipped item
pub fn aggregate(character: &CharacterSnapshot) -> Result<CombatParameters, AggregateError> {
    let class = character.source(ModifierSourceKind::Class)?;
    let race = character.source(ModifierSourceKind::Race)?;
    let subclass = character.source(ModifierSourceKind::Subclass)?;

    let mut base = character.additive * (character.multiplicative * character.level as f64);
    base += class.additive + race.additive + subclass.additive;
    base *= class.multiplicative * race.multiplicative * subclass.multiplicative;
    for item in &character.items {
        base *= item.multiplicative;
    }

    if base.resistance.is_nan() || base.resistance < MIN_RESISTANCE {
        return Err(AggregateError::NonPositiveResistance {
            character: character.id.clone(),
            value: base.resistance,
        });
    }
    if base.vitality.is_nan() || base.vitality <= 0.0 {
        return Err(AggregateError::NonPositiveVitality {
            character: character.id.clone(),
            value: base.vitality,
        });
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter() -> CharacterSnapshot {
        CharacterSnapshot::new("hero", "Hero").with_additive(CombatParameters {
            damage: 10.0,
            vitality: 100.0,
            speed: 5.0,
            resistance: 1.0,
            evasion: 0.0,
        })
    }

    #[test]
    fn test_neutral_sources_keep_base() {
        let stats = aggregate(&fighter()).unwrap();
        assert!((stats.damage - 10.0).abs() < f64::EPSILON);
        assert!((stats.vitality - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_level_scales_character_record() {
        let mut hero = fighter();
        hero.level = 3;
        let stats = aggregate(&hero).unwrap();
        assert!((stats.damage - 30.0).abs() < f64::EPSILON);
        assert!((stats.resistance - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chain_order_adds_before_multiplying() {
        let mut hero = fighter();
        hero.class = Some(ModifierSource {
            name: "warrior".to_string(),
            additive: CombatParameters {
                damage: 5.0,
                ..CombatParameters::zero()
            },
            multiplicative: ParameterMultipliers {
                damage: 2.0,
                ..ParameterMultipliers::one()
            },
            abilities: Vec::new(),
        });
        hero.race = Some(ModifierSource {
            name: "orc".to_string(),
            additive: CombatParameters {
                damage: 1.0,
                ..CombatParameters::zero()
            },
            multiplicative: ParameterMultipliers {
                damage: 1.5,
                ..ParameterMultipliers::one()
            },
            abilities: Vec::new(),
        });
        hero.items.push(GearModifier {
            name: "axe".to_string(),
            multiplicative: ParameterMultipliers {
                damage: 1.1,
                ..ParameterMultipliers::one()
            },
        });

        // (10 + 5 + 1) * (2 * 1.5) * 1.1
        let stats = aggregate(&hero).unwrap();
        assert!((stats.damage - 52.8).abs() < 1e-9);
    }

    #[test]
    fn test_items_apply_in_sequence() {
        let mut hero = fighter();
        for factor in [2.0, 0.5, 3.0] {
            hero.items.push(GearModifier {
                name: format!("ring_{}", factor),
                multiplicative: ParameterMultipliers {
                    vitality: factor,
                    ..ParameterMultipliers::one()
                },
            });
        }
        let stats = aggregate(&hero).unwrap();
        assert!((stats.vitality - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_race_is_rejected() {
        let mut hero = fighter();
        hero.race = None;
        let err = aggregate(&hero).unwrap_err();
        assert_eq!(
            err,
            AggregateError::MissingModifierSource {
                character: "hero".to_string(),
                kind: ModifierSourceKind::Race,
            }
        );
    }

    #[test]
    fn test_zero_resistance_is_rejected() {
        let mut hero = fighter();
        hero.additive.resistance = 0.0;
        assert!(matches!(
            aggregate(&hero),
            Err(AggregateError::NonPositiveResistance { .. })
        ));
    }

    #[test]
    fn test_nan_resistance_is_rejected() {
        let mut hero = fighter();
        hero.additive.resistance = f64::NAN;
        assert!(matches!(
            aggregate(&hero),
            Err(AggregateError::NonPositiveResistance { .. })
        ));
    }

    #[test]
    fn test_zero_vitality_is_rejected() {
        let mut hero = fighter();
        hero.additive.vitality = 0.0;
        assert!(matches!(
            aggregate(&hero),
            Err(AggregateError::NonPositiveVitality { .. })
        ));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let hero = fighter();
        assert_eq!(aggregate(&hero).unwrap(), aggregate(&hero).unwrap());
    }

    #[test]
    fn test_granted_abilities_order() {
        let mut hero = fighter();
        hero.class.as_mut().unwrap().abilities.push(AbilityDefinition::new("rally", "Rally", 0));
        hero.runes.push(RuneSource {
            name: "rune".to_string(),
            abilities: vec![AbilityDefinition::new("spark", "Spark", 0)],
        });
        let ids: Vec<_> = hero.granted_abilities().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["rally", "spark"]);
    }
}
