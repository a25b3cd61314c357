//! Action resolution: targets, damage, healing and payload attachment

use super::Combatant;
use crate::ability::{ResolvedAbility, BASIC_ATTACK_NAME};
use crate::battle::{ActionEvent, ActionSource, TargetOutcome};
use crate::config::BattleConstants;
use crate::targeting::{select_targets, TargetSpec};
use rand::Rng;
use tracing::{debug, warn};

/// What a combatant decided to do this turn
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPlan {
    /// Physical attack against one random live enemy
    Basic,
    Ability(ResolvedAbility),
}

impl ActionPlan {
    pub fn name(&self) -> &str {
        match self {
            ActionPlan::Basic => BASIC_ATTACK_NAME,
            ActionPlan::Ability(ability) => ability.name(),
        }
    }
}

/// Resolve one action by `roster[actor]` and describe what it did
///
/// Per target: an evasion roll for damaging hits on enemies, then damage,
/// healing, the immunity payload and finally the effect payload, so an
/// immunity attached in the same action can block the effect that follows.
/// Targets killed by the hit receive no payload.
pub fn perform_action<R: Rng + ?Sized>(
    roster: &mut [Combatant],
    actor: usize,
    plan: &ActionPlan,
    source: ActionSource,
    round: u32,
    constants: &BattleConstants,
    rng: &mut R,
) -> ActionEvent {
    let actor_id = roster[actor].id();

    let (spec, damage, healing, ability) = match plan {
        ActionPlan::Basic => (
            Ok(TargetSpec::single_random_enemy()),
            roster[actor].stats().damage.max(0.0),
            0.0,
            None,
        ),
        ActionPlan::Ability(ability) => (
            ability.target.clone(),
            ability.definition.damage,
            ability.definition.healing,
            Some(ability),
        ),
    };

    let mut event = ActionEvent {
        round,
        actor: actor_id,
        ability: plan.name().to_string(),
        ability_id: ability.map(|a| a.id().to_string()),
        source,
        targets: Vec::new(),
        outcomes: Vec::new(),
        whiff: None,
    };

    let spec = match spec {
        Ok(spec) => spec,
        Err(err) => {
            warn!(
                actor = %actor_id,
                ability = %event.ability,
                rule = ability.map(|a| a.definition.target.as_str()).unwrap_or_default(),
                %err,
                "malformed target rule, action whiffs"
            );
            event.whiff = Some(err.to_string());
            return event;
        }
    };

    let targets = select_targets(&spec, actor, &*roster, rng);
    event.targets = targets.iter().map(|&t| roster[t].id()).collect();

    for target in targets {
        let mut outcome = TargetOutcome::new(roster[target].id());
        let hostile = roster[target].id().side != actor_id.side;

        if hostile && damage > 0.0 {
            let chance = constants.evade_chance(roster[target].stats().evasion);
            if chance > 0.0 && rng.gen_bool(chance) {
                outcome.evaded = true;
                event.outcomes.push(outcome);
                continue;
            }
        }

        let combatant = &mut roster[target];
        if damage > 0.0 {
            outcome.damage = Some(combatant.receive_damage(damage));
        }
        if healing > 0.0 {
            outcome.healing = Some(combatant.receive_healing(healing));
        }

        if let Some(ability) = ability {
            if combatant.is_alive() {
                if let Some(template) = &ability.immunity {
                    outcome.immunity = Some(combatant.attach_immunity(template.instantiate(ability.params())));
                }
                if let Some(template) = &ability.effect {
                    let effect = template.instantiate(ability.params(), actor_id);
                    outcome.effect = Some(combatant.attach_effect(effect));
                }
            }
        }

        event.outcomes.push(outcome);
    }

    debug!(
        round,
        actor = %actor_id,
        ability = %event.ability,
        targets = event.targets.len(),
        damage = event.total_damage(),
        healing = event.total_healing(),
        "action resolved"
    );

    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityDefinition;
    use crate::effect::{AttachOutcome, EffectKind, EffectRegistry};
    use crate::params::{CharacterSnapshot, CombatParameters};
    use crate::types::{CombatantId, Side};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn stats(damage: f64, vitality: f64, resistance: f64, evasion: f64) -> CombatParameters {
        CombatParameters {
            damage,
            vitality,
            speed: 1.0,
            resistance,
            evasion,
        }
    }

    fn combatant(side: Side, slot: usize, params: CombatParameters, abilities: Vec<AbilityDefinition>) -> Combatant {
        let mut character = CharacterSnapshot::new(format!("{}-{}", side, slot), "Fighter").with_additive(params);
        character.abilities = abilities;
        Combatant::from_character(CombatantId::new(side, slot), &character, &EffectRegistry::with_defaults())
            .unwrap()
    }

    fn ability_of(roster: &[Combatant], actor: usize) -> ActionPlan {
        ActionPlan::Ability(roster[actor].active_abilities().next().unwrap().clone())
    }

    fn act(roster: &mut [Combatant], actor: usize, plan: &ActionPlan) -> ActionEvent {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        perform_action(
            roster,
            actor,
            plan,
            ActionSource::Turn,
            1,
            &BattleConstants::default(),
            &mut rng,
        )
    }

    #[test]
    fn test_basic_attack_uses_damage_over_resistance() {
        let mut roster = vec![
            combatant(Side::Attackers, 0, stats(10.0, 30.0, 1.0, 0.0), vec![]),
            combatant(Side::Defenders, 0, stats(1.0, 50.0, 2.0, 0.0), vec![]),
        ];
        let event = act(&mut roster, 0, &ActionPlan::Basic);

        assert_eq!(event.ability, BASIC_ATTACK_NAME);
        assert_eq!(event.targets, vec![CombatantId::new(Side::Defenders, 0)]);
        assert!((roster[1].health() - 45.0).abs() < f64::EPSILON);
        assert!(!event.is_whiff());
    }

    #[test]
    fn test_malformed_rule_whiffs() {
        let bad = AbilityDefinition::new("bad", "Bad", 1)
            .with_target("enemy:lots")
            .with_damage(10.0);
        let mut roster = vec![
            combatant(Side::Attackers, 0, stats(10.0, 30.0, 1.0, 0.0), vec![bad]),
            combatant(Side::Defenders, 0, stats(1.0, 50.0, 1.0, 0.0), vec![]),
        ];
        let plan = ability_of(&roster, 0);
        let event = act(&mut roster, 0, &plan);

        assert!(event.is_whiff());
        assert!(event.targets.is_empty());
        assert!((roster[1].health() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_heal_targets_mates() {
        let heal = AbilityDefinition::new("mend", "Mend", 1)
            .with_target("mate:1:lowest:health")
            .with_healing(15.0);
        let mut roster = vec![
            combatant(Side::Attackers, 0, stats(1.0, 40.0, 1.0, 0.0), vec![heal]),
            combatant(Side::Attackers, 1, stats(1.0, 40.0, 1.0, 0.0), vec![]),
            combatant(Side::Defenders, 0, stats(1.0, 40.0, 1.0, 0.0), vec![]),
        ];
        roster[1].receive_damage(30.0);

        let plan = ability_of(&roster, 0);
        let event = act(&mut roster, 0, &plan);

        assert_eq!(event.targets, vec![CombatantId::new(Side::Attackers, 1)]);
        assert!((roster[1].health() - 25.0).abs() < f64::EPSILON);
        assert!((event.total_healing() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_immunity_in_same_action_blocks_effect() {
        let odd = AbilityDefinition::new("odd", "Odd Brew", 1)
            .with_target("enemy:1")
            .with_effect("poison")
            .with_immunity("poison_immunity");
        let mut roster = vec![
            combatant(Side::Attackers, 0, stats(1.0, 40.0, 1.0, 0.0), vec![odd]),
            combatant(Side::Defenders, 0, stats(1.0, 40.0, 1.0, 0.0), vec![]),
        ];
        let plan = ability_of(&roster, 0);
        let event = act(&mut roster, 0, &plan);

        let outcome = &event.outcomes[0];
        assert!(outcome.immunity.is_some());
        assert!(matches!(
            outcome.effect,
            Some(AttachOutcome::Blocked {
                kind: EffectKind::Poison,
                ..
            })
        ));
        assert!(!roster[1].effects().has_effect(EffectKind::Poison));
    }

    #[test]
    fn test_killed_target_gets_no_payload() {
        let finisher = AbilityDefinition::new("finisher", "Finisher", 1)
            .with_target("enemy:1")
            .with_damage(100.0)
            .with_effect("burn");
        let mut roster = vec![
            combatant(Side::Attackers, 0, stats(1.0, 40.0, 1.0, 0.0), vec![finisher]),
            combatant(Side::Defenders, 0, stats(1.0, 10.0, 1.0, 0.0), vec![]),
        ];
        let plan = ability_of(&roster, 0);
        let event = act(&mut roster, 0, &plan);

        assert!(event.outcomes[0].is_killing_blow());
        assert!(event.outcomes[0].effect.is_none());
        assert!(roster[1].effects().is_empty());
    }

    #[test]
    fn test_zero_evasion_never_dodges() {
        let mut roster = vec![
            combatant(Side::Attackers, 0, stats(4.0, 40.0, 1.0, 0.0), vec![]),
            combatant(Side::Defenders, 0, stats(1.0, 1000.0, 1.0, 0.0), vec![]),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for round in 1..=50 {
            let event = perform_action(
                &mut roster,
                0,
                &ActionPlan::Basic,
                ActionSource::Turn,
                round,
                &BattleConstants::default(),
                &mut rng,
            );
            assert!(!event.outcomes[0].evaded);
        }
        assert!((roster[1].health() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_evasion_dodges_sometimes() {
        let mut roster = vec![
            combatant(Side::Attackers, 0, stats(1.0, 40.0, 1.0, 0.0), vec![]),
            combatant(Side::Defenders, 0, stats(1.0, 1000.0, 1.0, 100.0), vec![]),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let dodged = (0..200)
            .filter(|&round| {
                let event = perform_action(
                    &mut roster,
                    0,
                    &ActionPlan::Basic,
                    ActionSource::Turn,
                    round,
                    &BattleConstants::default(),
                    &mut rng,
                );
                event.outcomes[0].evaded
            })
            .count();
        // 50% dodge chance
        assert!(dodged > 50 && dodged < 150, "dodged {}", dodged);
    }
}
