//! Live effect and immunity instances on a combatant

use super::{EffectKind, EffectMode};
use crate::types::CombatantId;
use serde::{Deserialize, Serialize};

/// An effect attached to a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Registry name the effect was created from
    pub name: String,
    pub kind: EffectKind,
    /// Rounds remaining
    pub lifetime: u32,
    pub magnitude: f64,
    /// Combatant whose ability attached the effect
    pub source: CombatantId,
}

impl ActiveEffect {
    pub fn new(
        name: String,
        kind: EffectKind,
        lifetime: u32,
        magnitude: f64,
        source: CombatantId,
    ) -> Self {
        ActiveEffect {
            name,
            kind,
            lifetime,
            magnitude,
            source,
        }
    }

    pub fn mode(&self) -> EffectMode {
        self.kind.mode()
    }

    pub fn is_active(&self) -> bool {
        self.lifetime > 0
    }

    /// Reapplication keeps the longer of the two lifetimes
    pub fn refresh(&mut self, lifetime: u32) {
        self.lifetime = self.lifetime.max(lifetime);
    }
}

/// A timed block against one effect kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Immunity {
    pub name: String,
    pub guards: EffectKind,
    /// Rounds remaining
    pub lifetime: u32,
}

impl Immunity {
    pub fn new(name: String, guards: EffectKind, lifetime: u32) -> Self {
        Immunity {
            name,
            guards,
            lifetime,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifetime > 0
    }

    pub fn blocks(&self, kind: EffectKind) -> bool {
        self.is_active() && self.guards == kind
    }

    pub fn refresh(&mut self, lifetime: u32) {
        self.lifetime = self.lifetime.max(lifetime);
    }
}
