//! Plain-text transcript of a battle report

use battle_core::battle::SkipReason;
use battle_core::combatant::AppliedTick;
use battle_core::effect::AttachOutcome;
use battle_core::{
    ActionEvent, ActionSource, Battle, BattleEvent, BattleReport, CombatantId, DrawReason, Outcome,
};
use rand::Rng;
use std::collections::BTreeMap;

/// Display names by combatant id, captured before the battle runs
pub struct Names(BTreeMap<CombatantId, String>);

impl Names {
    pub fn from_battle<R: Rng>(battle: &Battle<R>) -> Self {
        Names(
            battle
                .combatants()
                .iter()
                .map(|c| (c.id(), c.name().to_string()))
                .collect(),
        )
    }

    fn get(&self, id: CombatantId) -> String {
        self.0
            .get(&id)
            .map(|name| format!("{} ({})", name, id))
            .unwrap_or_else(|| id.to_string())
    }
}

pub fn transcript(report: &BattleReport, names: &Names) -> Vec<String> {
    let mut lines = Vec::new();
    let mut round = None;

    for event in report.log.iter() {
        if round != Some(event.round()) {
            round = Some(event.round());
            lines.push(match event.round() {
                0 => "=== Opening ===".to_string(),
                n => format!("=== Round {} ===", n),
            });
        }
        lines.push(describe(event, names));
    }

    lines.push(String::new());
    lines.push(match report.outcome {
        Outcome::Victory { winner } => format!("{} win after {} round(s)", winner, report.rounds),
        Outcome::Draw {
            reason: DrawReason::RoundCap,
        } => format!("Draw: round cap reached after {} round(s)", report.rounds),
        Outcome::Draw {
            reason: DrawReason::MutualDefeat,
        } => format!("Draw: both sides fell in round {}", report.rounds),
    });
    lines
}

fn describe(event: &BattleEvent, names: &Names) -> String {
    match event {
        BattleEvent::Action(action) => describe_action(action, names),
        BattleEvent::Skipped {
            combatant,
            reason: SkipReason::Stunned,
            ..
        } => format!("  {} is stunned and loses the turn", names.get(*combatant)),
        BattleEvent::EffectTick {
            combatant, tick, ..
        } => describe_tick(names.get(*combatant), tick),
        BattleEvent::Expired {
            combatant, guards, ..
        } => format!(
            "  {} is no longer immune to {:?}",
            names.get(*combatant),
            guards
        ),
        BattleEvent::Death {
            combatant, killer, ..
        } => match killer {
            Some(killer) => format!(
                "  {} is slain by {}",
                names.get(*combatant),
                names.get(*killer)
            ),
            None => format!("  {} succumbs", names.get(*combatant)),
        },
    }
}

fn describe_action(action: &ActionEvent, names: &Names) -> String {
    let mut line = format!("  {} uses {}", names.get(action.actor), action.ability);
    if let ActionSource::Trigger(condition) = action.source {
        line.push_str(&format!(" [{:?}]", condition));
    }

    if let Some(reason) = &action.whiff {
        line.push_str(&format!(" but it whiffs ({})", reason));
        return line;
    }
    if action.targets.is_empty() {
        line.push_str(" but finds no target");
        return line;
    }

    for outcome in &action.outcomes {
        let mut parts = Vec::new();
        if outcome.evaded {
            parts.push("evaded".to_string());
        }
        if let Some(damage) = &outcome.damage {
            parts.push(damage.summary());
        }
        if let Some(heal) = &outcome.healing {
            parts.push(format!("{:.1} healed", heal.healed));
        }
        if let Some(immunity) = &outcome.immunity {
            parts.push(format!("immune to {:?} for {}", immunity.guards, immunity.lifetime));
        }
        match &outcome.effect {
            Some(AttachOutcome::Attached { kind, lifetime })
            | Some(AttachOutcome::Refreshed { kind, lifetime }) => {
                parts.push(format!("{:?} for {}", kind, lifetime))
            }
            Some(AttachOutcome::Blocked { kind, immunity }) => {
                parts.push(format!("{:?} blocked by {}", kind, immunity))
            }
            None => {}
        }
        if parts.is_empty() {
            parts.push("no effect".to_string());
        }
        line.push_str(&format!("\n    -> {}: {}", names.get(outcome.target), parts.join(", ")));
    }
    line
}

fn describe_tick(name: String, tick: &AppliedTick) -> String {
    let mut line = format!("  {:?} on {}", tick.kind, name);
    if let Some(damage) = &tick.damage {
        line.push_str(&format!(": {}", damage.summary()));
    }
    if let Some(heal) = &tick.healing {
        line.push_str(&format!(": {:.1} healed", heal.healed));
    }
    if tick.expired {
        line.push_str(" (wears off)");
    }
    line
}
