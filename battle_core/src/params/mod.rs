//! CombatParameters - Additive and multiplicative stat records
//!
//! Two record kinds share the same five fields:
//! - [`CombatParameters`]: additive, baseline 0, combined by field-wise addition
//! - [`ParameterMultipliers`]: multiplicative, baseline 1, combined by field-wise product
//!
//! `CombatParameters * ParameterMultipliers` yields a `CombatParameters`
//! (field-wise product), which is how gear and class multipliers are applied.

mod aggregator;

pub use aggregator::{
    aggregate, AggregateError, CharacterSnapshot, GearModifier, ModifierSource, ModifierSourceKind,
    RuneSource, MIN_RESISTANCE,
};

use crate::types::Attribute;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

/// Additive stat record (baseline 0)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatParameters {
    pub damage: f64,
    pub vitality: f64,
    pub speed: f64,
    pub resistance: f64,
    pub evasion: f64,
}

impl CombatParameters {
    /// The additive identity
    pub fn zero() -> Self {
        CombatParameters::default()
    }

    /// Baseline for a character's own record: resistance starts at 1 so damage
    /// passes through unchanged.
    pub fn character_baseline() -> Self {
        CombatParameters {
            resistance: 1.0,
            ..CombatParameters::default()
        }
    }

    /// Read a field by attribute name
    ///
    /// `Health` has no counterpart in a stat record and reads as vitality.
    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Damage => self.damage,
            Attribute::Vitality | Attribute::Health => self.vitality,
            Attribute::Speed => self.speed,
            Attribute::Resistance => self.resistance,
            Attribute::Evasion => self.evasion,
        }
    }

    fn zip(self, other: CombatParameters, f: impl Fn(f64, f64) -> f64) -> CombatParameters {
        CombatParameters {
            damage: f(self.damage, other.damage),
            vitality: f(self.vitality, other.vitality),
            speed: f(self.speed, other.speed),
            resistance: f(self.resistance, other.resistance),
            evasion: f(self.evasion, other.evasion),
        }
    }
}

/// Multiplicative stat record (baseline 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterMultipliers {
    pub damage: f64,
    pub vitality: f64,
    pub speed: f64,
    pub resistance: f64,
    pub evasion: f64,
}

impl Default for ParameterMultipliers {
    fn default() -> Self {
        ParameterMultipliers::one()
    }
}

impl ParameterMultipliers {
    /// The multiplicative identity
    pub fn one() -> Self {
        ParameterMultipliers::uniform(1.0)
    }

    /// Every field set to the same factor
    pub fn uniform(factor: f64) -> Self {
        ParameterMultipliers {
            damage: factor,
            vitality: factor,
            speed: factor,
            resistance: factor,
            evasion: factor,
        }
    }

    fn scale(self, factor: f64) -> ParameterMultipliers {
        ParameterMultipliers {
            damage: self.damage * factor,
            vitality: self.vitality * factor,
            speed: self.speed * factor,
            resistance: self.resistance * factor,
            evasion: self.evasion * factor,
        }
    }
}

impl Add for CombatParameters {
    type Output = CombatParameters;

    fn add(self, rhs: CombatParameters) -> CombatParameters {
        self.zip(rhs, |a, b| a + b)
    }
}

impl AddAssign for CombatParameters {
    fn add_assign(&mut self, rhs: CombatParameters) {
        *self = *self + rhs;
    }
}

impl Sub for CombatParameters {
    type Output = CombatParameters;

    fn sub(self, rhs: CombatParameters) -> CombatParameters {
        self.zip(rhs, |a, b| a - b)
    }
}

impl Neg for CombatParameters {
    type Output = CombatParameters;

    fn neg(self) -> CombatParameters {
        CombatParameters::zero() - self
    }
}

impl Mul<ParameterMultipliers> for CombatParameters {
    type Output = CombatParameters;

    fn mul(self, rhs: ParameterMultipliers) -> CombatParameters {
        CombatParameters {
            damage: self.damage * rhs.damage,
            vitality: self.vitality * rhs.vitality,
            speed: self.speed * rhs.speed,
            resistance: self.resistance * rhs.resistance,
            evasion: self.evasion * rhs.evasion,
        }
    }
}

impl MulAssign<ParameterMultipliers> for CombatParameters {
    fn mul_assign(&mut self, rhs: ParameterMultipliers) {
        *self = *self * rhs;
    }
}

impl Mul for ParameterMultipliers {
    type Output = ParameterMultipliers;

    fn mul(self, rhs: ParameterMultipliers) -> ParameterMultipliers {
        ParameterMultipliers {
            damage: self.damage * rhs.damage,
            vitality: self.vitality * rhs.vitality,
            speed: self.speed * rhs.speed,
            resistance: self.resistance * rhs.resistance,
            evasion: self.evasion * rhs.evasion,
        }
    }
}

impl Mul<f64> for ParameterMultipliers {
    type Output = ParameterMultipliers;

    fn mul(self, rhs: f64) -> ParameterMultipliers {
        self.scale(rhs)
    }
}
