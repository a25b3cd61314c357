//! BattleLog - Append-only record of everything that happened in a battle

use crate::combatant::{AppliedTick, DamageOutcome, HealOutcome};
use crate::effect::{AttachOutcome, EffectKind, ImmunityOutcome};
use crate::types::{CombatantId, TriggerCondition};
use serde::{Deserialize, Serialize};

/// Why an action happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    /// The combatant's own turn
    Turn,
    /// A passive answering a battle event
    Trigger(TriggerCondition),
}

/// What an action did to one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target: CombatantId,
    #[serde(default)]
    pub evaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing: Option<HealOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immunity: Option<ImmunityOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<AttachOutcome>,
}

impl TargetOutcome {
    pub fn new(target: CombatantId) -> Self {
        TargetOutcome {
            target,
            evaded: false,
            damage: None,
            healing: None,
            immunity: None,
            effect: None,
        }
    }

    pub fn is_killing_blow(&self) -> bool {
        self.damage.map_or(false, |d| d.is_killing_blow)
    }
}

/// One ability use or basic attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub round: u32,
    pub actor: CombatantId,
    /// Ability name, or "basic attack"
    pub ability: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability_id: Option<String>,
    pub source: ActionSource,
    pub targets: Vec<CombatantId>,
    pub outcomes: Vec<TargetOutcome>,
    /// Set when the target rule did not parse and the action hit nobody
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whiff: Option<String>,
}

impl ActionEvent {
    pub fn is_whiff(&self) -> bool {
        self.whiff.is_some()
    }

    pub fn total_damage(&self) -> f64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.damage.as_ref())
            .map(|d| d.dealt)
            .sum()
    }

    pub fn total_healing(&self) -> f64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.healing.as_ref())
            .map(|h| h.healed)
            .sum()
    }
}

/// Why a combatant lost its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Stunned,
}

/// A log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    Action(ActionEvent),
    Skipped {
        round: u32,
        combatant: CombatantId,
        reason: SkipReason,
    },
    EffectTick {
        round: u32,
        combatant: CombatantId,
        tick: AppliedTick,
    },
    /// An immunity ran out
    Expired {
        round: u32,
        combatant: CombatantId,
        guards: EffectKind,
    },
    Death {
        round: u32,
        combatant: CombatantId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        killer: Option<CombatantId>,
    },
}

impl BattleEvent {
    pub fn round(&self) -> u32 {
        match self {
            BattleEvent::Action(action) => action.round,
            BattleEvent::Skipped { round, .. }
            | BattleEvent::EffectTick { round, .. }
            | BattleEvent::Expired { round, .. }
            | BattleEvent::Death { round, .. } => *round,
        }
    }
}

/// Ordered battle history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleLog {
    events: Vec<BattleEvent>,
}

impl BattleLog {
    pub fn new() -> Self {
        BattleLog::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    /// Only the action entries
    pub fn actions(&self) -> impl Iterator<Item = &ActionEvent> {
        self.events.iter().filter_map(|event| match event {
            BattleEvent::Action(action) => Some(action),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    fn action(round: u32) -> ActionEvent {
        ActionEvent {
            round,
            actor: CombatantId::new(Side::Attackers, 0),
            ability: "basic attack".to_string(),
            ability_id: None,
            source: ActionSource::Turn,
            targets: vec![CombatantId::new(Side::Defenders, 0)],
            outcomes: Vec::new(),
            whiff: None,
        }
    }

    #[test]
    fn test_push_keeps_order() {
        let mut log = BattleLog::new();
        log.push(BattleEvent::Action(action(1)));
        log.push(BattleEvent::Death {
            round: 1,
            combatant: CombatantId::new(Side::Defenders, 0),
            killer: None,
        });
        log.push(BattleEvent::Action(action(2)));

        assert_eq!(log.len(), 3);
        let rounds: Vec<u32> = log.iter().map(|e| e.round()).collect();
        assert_eq!(rounds, vec![1, 1, 2]);
        assert_eq!(log.actions().count(), 2);
    }

    #[test]
    fn test_json_tags() {
        let mut log = BattleLog::new();
        log.push(BattleEvent::Action(action(1)));
        log.push(BattleEvent::Skipped {
            round: 1,
            combatant: CombatantId::new(Side::Defenders, 1),
            reason: SkipReason::Stunned,
        });

        let value: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        assert_eq!(value[0]["event"], "action");
        assert_eq!(value[0]["ability"], "basic attack");
        assert_eq!(value[0]["source"], "turn");
        assert!(value[0].get("whiff").is_none());
        assert_eq!(value[1]["event"], "skipped");
        assert_eq!(value[1]["reason"], "stunned");
    }

    #[test]
    fn test_trigger_source_serializes_condition() {
        let mut event = action(1);
        event.source = ActionSource::Trigger(TriggerCondition::OnDeath);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["source"]["trigger"], "on_death");
    }

    #[test]
    fn test_json_parses_back() {
        let mut log = BattleLog::new();
        log.push(BattleEvent::Action(action(3)));
        let parsed: BattleLog = serde_json::from_str(&log.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, log);
    }
}
