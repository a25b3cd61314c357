//! Effect lifecycle: attachment, immunity suppression and per-round ticks
//!
//! [`EffectSet`] is pure bookkeeping. Every operation reports the
//! [`StatusImpact`]s it produced and the owning combatant applies them to its
//! health and stats.

use super::{ActiveEffect, EffectKind, EffectMode, Immunity};
use crate::params::CombatParameters;
use serde::{Deserialize, Serialize};

/// A change an effect makes to its bearer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StatusImpact {
    Damage(f64),
    Heal(f64),
    Adjust(CombatParameters),
}

/// Result of trying to attach an effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttachOutcome {
    Attached { kind: EffectKind, lifetime: u32 },
    Refreshed { kind: EffectKind, lifetime: u32 },
    Blocked { kind: EffectKind, immunity: String },
}

impl AttachOutcome {
    /// Whether the effect is now on the bearer (new or refreshed)
    pub fn landed(&self) -> bool {
        !matches!(self, AttachOutcome::Blocked { .. })
    }
}

/// Result of attaching an immunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmunityOutcome {
    pub guards: EffectKind,
    pub lifetime: u32,
    /// Active effects of the guarded kind removed on attach
    pub purged: Vec<EffectKind>,
}

/// One effect's share of a round update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectTick {
    pub kind: EffectKind,
    pub impact: Option<StatusImpact>,
    pub expired: bool,
}

/// Everything a round update did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub effects: Vec<EffectTick>,
    pub expired_immunities: Vec<EffectKind>,
}

/// Active effects and immunities of one combatant
#[derive(Debug, Clone, Default)]
pub struct EffectSet {
    effects: Vec<ActiveEffect>,
    immunities: Vec<Immunity>,
}

impl EffectSet {
    pub fn new() -> Self {
        EffectSet::default()
    }

    pub fn effects(&self) -> &[ActiveEffect] {
        &self.effects
    }

    pub fn immunities(&self) -> &[Immunity] {
        &self.immunities
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind && e.is_active())
    }

    /// The active immunity guarding `kind`, if any
    pub fn immunity_against(&self, kind: EffectKind) -> Option<&Immunity> {
        self.immunities.iter().find(|i| i.blocks(kind))
    }

    pub fn is_immune(&self, kind: EffectKind) -> bool {
        self.immunity_against(kind).is_some()
    }

    /// Attach an effect unless an active immunity guards its kind
    ///
    /// An effect of a kind that is already active only refreshes the lifetime,
    /// so start-end deltas are never applied twice.
    pub fn attach_effect(&mut self, effect: ActiveEffect) -> (AttachOutcome, Option<StatusImpact>) {
        if let Some(immunity) = self.immunity_against(effect.kind) {
            let outcome = AttachOutcome::Blocked {
                kind: effect.kind,
                immunity: immunity.name.clone(),
            };
            return (outcome, None);
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == effect.kind) {
            existing.refresh(effect.lifetime);
            let outcome = AttachOutcome::Refreshed {
                kind: existing.kind,
                lifetime: existing.lifetime,
            };
            return (outcome, None);
        }

        let impact = match effect.mode() {
            EffectMode::StartEnd => effect.kind.attach_impact(effect.magnitude),
            EffectMode::Cycle => None,
        };
        let outcome = AttachOutcome::Attached {
            kind: effect.kind,
            lifetime: effect.lifetime,
        };
        self.effects.push(effect);
        (outcome, impact)
    }

    /// Attach an immunity, purging active effects of the guarded kind
    ///
    /// Purged start-end effects report their detach impact.
    pub fn attach_immunity(&mut self, immunity: Immunity) -> (ImmunityOutcome, Vec<StatusImpact>) {
        let guards = immunity.guards;

        let (purged, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.effects)
            .into_iter()
            .partition(|e| e.kind == guards);
        self.effects = kept;

        let impacts = purged
            .iter()
            .filter(|e| e.mode() == EffectMode::StartEnd)
            .filter_map(|e| e.kind.detach_impact(e.magnitude))
            .collect();

        let lifetime = match self.immunities.iter_mut().find(|i| i.guards == guards) {
            Some(existing) => {
                existing.refresh(immunity.lifetime);
                existing.lifetime
            }
            None => {
                let lifetime = immunity.lifetime;
                self.immunities.push(immunity);
                lifetime
            }
        };

        let outcome = ImmunityOutcome {
            guards,
            lifetime,
            purged: purged.iter().map(|e| e.kind).collect(),
        };
        (outcome, impacts)
    }

    /// Advance every effect and immunity by one round
    ///
    /// Cycle effects apply their payload, start-end effects reaching zero apply
    /// their detach payload, then immunities age. Anything at zero is removed.
    pub fn tick(&mut self) -> TickSummary {
        let mut summary = TickSummary::default();

        for effect in &mut self.effects {
            let impact = match effect.mode() {
                EffectMode::Cycle => {
                    let impact = effect.kind.tick_impact(effect.magnitude);
                    effect.lifetime = effect.lifetime.saturating_sub(1);
                    impact
                }
                EffectMode::StartEnd => {
                    effect.lifetime = effect.lifetime.saturating_sub(1);
                    if effect.lifetime == 0 {
                        effect.kind.detach_impact(effect.magnitude)
                    } else {
                        None
                    }
                }
            };

            summary.effects.push(EffectTick {
                kind: effect.kind,
                impact,
                expired: !effect.is_active(),
            });
        }
        self.effects.retain(|e| e.is_active());

        for immunity in &mut self.immunities {
            immunity.lifetime = immunity.lifetime.saturating_sub(1);
            if !immunity.is_active() {
                summary.expired_immunities.push(immunity.guards);
            }
        }
        self.immunities.retain(|i| i.is_active());

        summary
    }

    /// Drop everything without applying detach payloads (bearer left play)
    pub fn clear(&mut self) {
        self.effects.clear();
        self.immunities.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.immunities.is_empty()
    }

    /// Sum of the stat deltas of every active start-end effect
    pub fn stat_delta(&self) -> CombatParameters {
        self.effects
            .iter()
            .filter(|e| e.is_active() && e.mode() == EffectMode::StartEnd)
            .filter_map(|e| match e.kind.attach_impact(e.magnitude) {
                Some(StatusImpact::Adjust(delta)) => Some(delta),
                _ => None,
            })
            .fold(CombatParameters::zero(), |total, delta| total + delta)
    }
}
