//! Core identifiers and enums shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two rosters in a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Attackers,
    Defenders,
}

impl Side {
    /// The opposing roster
    pub fn opponent(self) -> Side {
        match self {
            Side::Attackers => Side::Defenders,
            Side::Defenders => Side::Attackers,
        }
    }
}

impl Default for Side {
    fn default() -> Self {
        Side::Attackers
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Attackers => write!(f, "attackers"),
            Side::Defenders => write!(f, "defenders"),
        }
    }
}

/// Roster-scoped identifier of a combatant
///
/// `slot` is the position inside the side's roster as it was supplied to the
/// battle, so identifiers are stable for the whole battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId {
    pub side: Side,
    pub slot: usize,
}

impl CombatantId {
    pub fn new(side: Side, slot: usize) -> Self {
        CombatantId { side, slot }
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.side, self.slot)
    }
}

/// When an ability fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    OnStart,
    OnMotionEnd,
    OnCommonAttack,
    OnUltimateAttack,
    Passive,
    OnBuff,
    OnDebuff,
    OnDeath,
    OnTeammateAttack,
    OnRevive,
    OnSummoned,
}

impl TriggerCondition {
    /// Whether a passive with this condition fires for the given battle event.
    ///
    /// `Passive` rides along with the end-of-motion hook.
    pub fn matches(self, event: TriggerCondition) -> bool {
        self == event || (self == TriggerCondition::Passive && event == TriggerCondition::OnMotionEnd)
    }
}

/// Numeric combatant attributes usable by `highest`/`lowest` target rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Damage,
    Vitality,
    Speed,
    Resistance,
    Evasion,
    Health,
}

impl Attribute {
    /// Parse an attribute from its target-rule spelling
    pub fn from_name(name: &str) -> Option<Attribute> {
        match name {
            "damage" => Some(Attribute::Damage),
            "vitality" | "max_health" => Some(Attribute::Vitality),
            "speed" => Some(Attribute::Speed),
            "resistance" => Some(Attribute::Resistance),
            "evasion" => Some(Attribute::Evasion),
            "health" => Some(Attribute::Health),
            _ => None,
        }
    }
}
