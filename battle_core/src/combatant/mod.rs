//! Combatant - Runtime battle state for one character

mod action;
mod result;

pub use action::{perform_action, ActionPlan};
pub use result::{DamageOutcome, HealOutcome};

use crate::ability::{AbilityError, ResolvedAbility};
use crate::battle::BattleError;
use crate::effect::{
    ActiveEffect, AttachOutcome, EffectKind, EffectRegistry, EffectSet, Immunity, ImmunityOutcome,
    StatusImpact,
};
use crate::params::{aggregate, CharacterSnapshot, CombatParameters, MIN_RESISTANCE};
use crate::targeting::Targetable;
use crate::types::{Attribute, CombatantId, Side, TriggerCondition};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What an effect did to its bearer during a round update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedTick {
    pub kind: EffectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healing: Option<HealOutcome>,
    pub expired: bool,
}

/// Everything one round update did to a combatant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectUpdate {
    pub ticks: Vec<AppliedTick>,
    /// Kinds whose immunity ran out
    pub expired_immunities: Vec<EffectKind>,
}

/// One character's state for the length of a single battle
#[derive(Debug, Clone)]
pub struct Combatant {
    id: CombatantId,
    character_id: String,
    name: String,
    /// Parameters from the modifier chain
    base: CombatParameters,
    /// Parameters after start-end effect deltas
    stats: CombatParameters,
    health: f64,
    max_health: f64,
    /// Active pool, one ability per tier, iterated tier-ascending
    active: BTreeMap<u8, ResolvedAbility>,
    /// Tier-0 pool fired by trigger conditions
    passives: Vec<ResolvedAbility>,
    cooldowns: BTreeMap<String, u32>,
    effects: EffectSet,
}

impl Combatant {
    /// Build a combatant from a read-only character snapshot
    pub fn from_character(
        id: CombatantId,
        character: &CharacterSnapshot,
        registry: &EffectRegistry,
    ) -> Result<Self, BattleError> {
        let base = aggregate(character)?;

        let mut active: BTreeMap<u8, ResolvedAbility> = BTreeMap::new();
        let mut passives = Vec::new();
        // Cooldowns are keyed by id
        let mut seen = BTreeSet::new();

        for definition in character.abilities.iter().chain(character.granted_abilities()) {
            if !seen.insert(definition.id.as_str()) {
                return Err(AbilityError::DuplicateId {
                    character: character.id.clone(),
                    ability: definition.id.clone(),
                }
                .into());
            }
            let ability = ResolvedAbility::resolve(definition, registry)?;
            if definition.is_passive() {
                passives.push(ability);
                continue;
            }
            if let Some(existing) = active.get(&definition.tier) {
                return Err(AbilityError::DuplicateTier {
                    character: character.id.clone(),
                    tier: definition.tier,
                    first: existing.id().to_string(),
                    second: definition.id.clone(),
                }
                .into());
            }
            active.insert(definition.tier, ability);
        }

        Ok(Combatant {
            id,
            character_id: character.id.clone(),
            name: character.name.clone(),
            base,
            stats: base,
            health: base.vitality,
            max_health: base.vitality,
            active,
            passives,
            cooldowns: BTreeMap::new(),
            effects: EffectSet::new(),
        })
    }

    pub fn id(&self) -> CombatantId {
        self.id
    }

    pub fn character_id(&self) -> &str {
        &self.character_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn max_health(&self) -> f64 {
        self.max_health
    }

    /// Parameters as derived from the character, before effects
    pub fn base_stats(&self) -> &CombatParameters {
        &self.base
    }

    /// Current parameters including effect deltas
    pub fn stats(&self) -> &CombatParameters {
        &self.stats
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_stunned(&self) -> bool {
        self.effects.has_effect(EffectKind::Stun)
    }

    pub fn effects(&self) -> &EffectSet {
        &self.effects
    }

    pub fn active_abilities(&self) -> impl Iterator<Item = &ResolvedAbility> {
        self.active.values()
    }

    pub fn passive_abilities(&self) -> &[ResolvedAbility] {
        &self.passives
    }

    /// Remaining cooldown of an ability (0 when ready)
    pub fn cooldown(&self, ability_id: &str) -> u32 {
        self.cooldowns.get(ability_id).copied().unwrap_or(0)
    }

    /// Pick this turn's action
    ///
    /// Tiers are tried in ascending order; the first ability that is off
    /// cooldown and passes its chance roll wins. Otherwise a basic attack.
    pub fn choose_action<R: Rng + ?Sized>(&self, rng: &mut R) -> ActionPlan {
        for ability in self.active.values() {
            if self.cooldown(ability.id()) > 0 {
                continue;
            }
            if rng.gen_bool(ability.definition.chance) {
                return ActionPlan::Ability(ability.clone());
            }
        }
        ActionPlan::Basic
    }

    /// Put an ability on cooldown after it fired
    pub fn start_cooldown(&mut self, ability: &ResolvedAbility) {
        if ability.definition.cooldown > 0 {
            self.cooldowns
                .insert(ability.id().to_string(), ability.definition.cooldown);
        }
    }

    /// Tick every cooldown down by one, stopping at zero
    pub fn decay_cooldowns(&mut self) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.cooldowns.retain(|_, remaining| *remaining > 0);
    }

    /// Passives answering `event` that are ready and pass their chance roll
    ///
    /// Fired passives go on cooldown immediately.
    pub fn triggered_passives<R: Rng + ?Sized>(
        &mut self,
        event: TriggerCondition,
        rng: &mut R,
    ) -> Vec<ResolvedAbility> {
        let mut fired = Vec::new();
        for ability in &self.passives {
            if !ability.definition.trigger.matches(event) || self.cooldown(ability.id()) > 0 {
                continue;
            }
            if rng.gen_bool(ability.definition.chance) {
                fired.push(ability.clone());
            }
        }
        for ability in &fired {
            self.start_cooldown(ability);
        }
        fired
    }

    /// Take damage reduced by resistance: `health -= amount / resistance`
    pub fn receive_damage(&mut self, amount: f64) -> DamageOutcome {
        let raw = amount.max(0.0);
        let real = raw / self.stats.resistance.max(MIN_RESISTANCE);
        let health_before = self.health;
        self.health = (self.health - real).max(0.0);

        DamageOutcome {
            raw,
            resisted: raw - real,
            dealt: health_before - self.health,
            health_before,
            health_after: self.health,
            is_killing_blow: health_before > 0.0 && self.health <= 0.0,
        }
    }

    /// Restore health up to the maximum; the dead cannot be healed
    pub fn receive_healing(&mut self, amount: f64) -> HealOutcome {
        let amount = amount.max(0.0);
        let health_before = self.health;
        if self.is_alive() {
            self.health = (self.health + amount).min(self.max_health);
        }

        HealOutcome {
            amount,
            healed: self.health - health_before,
            health_before,
            health_after: self.health,
        }
    }

    /// Attach an effect, applying any on-attach stat delta
    pub fn attach_effect(&mut self, effect: ActiveEffect) -> AttachOutcome {
        let (outcome, impact) = self.effects.attach_effect(effect);
        if let Some(impact) = impact {
            self.apply_impact(impact);
        }
        outcome
    }

    /// Attach an immunity, reverting any purged start-end effects
    pub fn attach_immunity(&mut self, immunity: Immunity) -> ImmunityOutcome {
        let (outcome, impacts) = self.effects.attach_immunity(immunity);
        for impact in impacts {
            self.apply_impact(impact);
        }
        outcome
    }

    /// Advance effects and immunities by one round
    pub fn tick_effects(&mut self) -> EffectUpdate {
        let summary = self.effects.tick();
        let ticks = summary
            .effects
            .into_iter()
            .map(|tick| {
                let (damage, healing) = match tick.impact {
                    Some(impact) => self.apply_impact(impact),
                    None => (None, None),
                };
                AppliedTick {
                    kind: tick.kind,
                    damage,
                    healing,
                    expired: tick.expired,
                }
            })
            .collect();

        EffectUpdate {
            ticks,
            expired_immunities: summary.expired_immunities,
        }
    }

    /// Remove the combatant's effects when it leaves play
    pub fn leave_play(&mut self) {
        self.effects.clear();
    }

    fn apply_impact(&mut self, impact: StatusImpact) -> (Option<DamageOutcome>, Option<HealOutcome>) {
        match impact {
            StatusImpact::Damage(amount) => (Some(self.receive_damage(amount)), None),
            StatusImpact::Heal(amount) => (None, Some(self.receive_healing(amount))),
            StatusImpact::Adjust(_) => {
                self.refresh_stats();
                (None, None)
            }
        }
    }

    /// Rebuild current stats from the base record and the live start-end effects
    ///
    /// Deltas are never accumulated, so reverting an effect restores the base
    /// values exactly.
    fn refresh_stats(&mut self) {
        let mut stats = self.base + self.effects.stat_delta();
        stats.resistance = stats.resistance.max(MIN_RESISTANCE);
        self.stats = stats;
    }
}

impl Targetable for Combatant {
    fn side(&self) -> Side {
        self.id.side
    }

    fn is_alive(&self) -> bool {
        Combatant::is_alive(self)
    }

    fn attribute(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Health => self.health,
            Attribute::Vitality => self.max_health,
            other => self.stats.get(other),
        }
    }
}
