//! Property tests for the numeric and parsing guarantees of the engine

use battle_core::effect::{ActiveEffect, Immunity};
use battle_core::params::MIN_RESISTANCE;
use battle_core::targeting::{Method, Quantity, Scope};
use battle_core::{
    AbilityDefinition, Battle, BattleConfig, CharacterSnapshot, CombatParameters, Combatant,
    CombatantId, EffectKind, EffectRegistry, Side, TargetSpec, TriggerCondition,
};
use proptest::prelude::*;

fn combatant(vitality: f64, resistance: f64) -> Combatant {
    let character = CharacterSnapshot::new("c", "C").with_additive(CombatParameters {
        damage: 1.0,
        vitality,
        speed: 1.0,
        resistance,
        evasion: 0.0,
    });
    Combatant::from_character(
        CombatantId::new(Side::Defenders, 0),
        &character,
        &EffectRegistry::with_defaults(),
    )
    .unwrap()
}

fn fighter(id: usize, damage: f64, vitality: f64, speed: f64, evasion: f64) -> CharacterSnapshot {
    CharacterSnapshot::new(format!("f{}", id), format!("Fighter {}", id))
        .with_additive(CombatParameters {
            damage,
            vitality,
            speed,
            resistance: 1.0,
            evasion,
        })
        .with_ability(
            AbilityDefinition::new("venom", "Venom", 1)
                .with_target("enemy:1:lowest:health")
                .with_chance(0.3)
                .with_cooldown(2)
                .with_damage(damage)
                .with_effect("poison"),
        )
        .with_ability(
            AbilityDefinition::new("mend", "Mend", 2)
                .with_target("mate:all")
                .with_chance(0.3)
                .with_cooldown(3)
                .with_healing(vitality / 4.0)
                .with_effect("regeneration"),
        )
        .with_ability(
            AbilityDefinition::new("guard", "Guard", 0)
                .with_trigger(TriggerCondition::OnMotionEnd)
                .with_target("self:1")
                .with_chance(0.2)
                .with_effect("fortify"),
        )
}

fn roster() -> impl Strategy<Value = Vec<CharacterSnapshot>> {
    prop::collection::vec(
        (0.0..20.0f64, 1.0..60.0f64, 0.0..10.0f64, 0.0..50.0f64),
        1..4,
    )
    .prop_map(|stats| {
        stats
            .into_iter()
            .enumerate()
            .map(|(i, (damage, vitality, speed, evasion))| fighter(i, damage, vitality, speed, evasion))
            .collect()
    })
}

fn valid_rule() -> impl Strategy<Value = String> {
    let scope = prop_oneof![Just("self"), Just("mate"), Just("enemy")];
    let quantity = prop_oneof![(1usize..50).prop_map(|n| n.to_string()), Just("all".to_string())];
    let method = prop_oneof![
        Just(String::new()),
        Just(":random".to_string()),
        Just(":highest:damage".to_string()),
        Just(":lowest:health".to_string()),
        Just(":highest:speed".to_string()),
        Just(":lowest:evasion".to_string()),
    ];
    (scope, quantity, method).prop_map(|(s, q, m)| format!("{}:{}{}", s, q, m))
}

proptest! {
    #[test]
    fn damage_is_amount_over_resistance(
        vitality in 1.0..1000.0f64,
        resistance in 0.1..10.0f64,
        amount in 0.0..2000.0f64,
    ) {
        let mut c = combatant(vitality, resistance);
        let outcome = c.receive_damage(amount);
        let expected = (amount / resistance).min(vitality);

        prop_assert!((outcome.dealt - expected).abs() < 1e-9);
        prop_assert!((c.health() - (vitality - expected)).abs() < 1e-9);
        prop_assert!(c.health() >= 0.0);
    }

    #[test]
    fn healing_caps_at_max_health(
        vitality in 1.0..1000.0f64,
        damage in 0.0..999.0f64,
        heal in 0.0..2000.0f64,
    ) {
        let mut c = combatant(vitality, 1.0);
        c.receive_damage(damage.min(vitality - 0.5));
        let before = c.health();
        c.receive_healing(heal);

        prop_assert!((c.health() - (before + heal).min(vitality)).abs() < 1e-9);
        prop_assert!(c.health() <= c.max_health());
    }

    #[test]
    fn reverted_stat_effects_restore_base_stats(
        resistance in prop_oneof![Just(MIN_RESISTANCE), MIN_RESISTANCE..10.0f64],
        effects in prop::collection::vec(
            (
                prop_oneof![Just(EffectKind::Weakness), Just(EffectKind::Fortify), Just(EffectKind::Haste)],
                1u32..4,
                prop_oneof![0.0..10.0f64, 1e10..1e18f64],
            ),
            1..6,
        ),
        purge in any::<bool>(),
    ) {
        let mut c = combatant(100.0, resistance);
        let source = CombatantId::new(Side::Attackers, 0);
        for (kind, lifetime, magnitude) in &effects {
            c.attach_effect(ActiveEffect::new(
                format!("{:?}", kind).to_lowercase(),
                *kind,
                *lifetime,
                *magnitude,
                source,
            ));
            prop_assert!(c.stats().resistance >= MIN_RESISTANCE);
        }

        if purge {
            for kind in [EffectKind::Weakness, EffectKind::Fortify, EffectKind::Haste] {
                c.attach_immunity(Immunity::new("ward".to_string(), kind, 1));
            }
        } else {
            for _ in 0..4 {
                c.tick_effects();
            }
        }

        prop_assert!(c.effects().effects().is_empty());
        prop_assert_eq!(c.stats(), c.base_stats());
        prop_assert!(c.stats().resistance >= MIN_RESISTANCE);
        prop_assert!(c.receive_damage(1.0).dealt.is_finite());
    }

    #[test]
    fn parser_never_panics(rule in ".{0,40}") {
        let _ = TargetSpec::parse(&rule);
    }

    #[test]
    fn parser_accepts_the_grammar(rule in valid_rule()) {
        let spec = TargetSpec::parse(&rule);
        prop_assert!(spec.is_ok(), "rule {:?} failed: {:?}", rule, spec);
        let spec = spec.unwrap();
        prop_assert_eq!(TargetSpec::parse(&spec.to_string()), Ok(spec));
        if rule.ends_with(":all") {
            prop_assert_eq!(spec.quantity, Quantity::All);
        }
        if rule.starts_with("self") {
            prop_assert_eq!(spec.scope, Scope::Actor);
        }
        if !rule.contains("highest") && !rule.contains("lowest") {
            prop_assert_eq!(spec.method, Method::Random);
        }
    }

    #[test]
    fn rejects_bad_quantities(scope in "(self|mate|enemy)", quantity in "(0|-[0-9]{1,3}|[a-z]{1,5}|[0-9]+\\.[0-9])") {
        prop_assume!(quantity != "all");
        let rule = format!("{}:{}", scope, quantity);
        prop_assert!(TargetSpec::parse(&rule).is_err());
    }

    #[test]
    fn battles_keep_health_in_bounds(
        attackers in roster(),
        defenders in roster(),
        cap in 1u32..15,
        seed in any::<u64>(),
    ) {
        let config = BattleConfig::default().with_round_cap(cap);
        let mut battle = Battle::seeded(&attackers, &defenders, &EffectRegistry::with_defaults(), config, seed)
            .unwrap();

        while !battle.is_finished() {
            battle.step();
            for c in battle.combatants() {
                prop_assert!(c.health() >= 0.0);
                prop_assert!(c.health() <= c.max_health() + 1e-9);
            }
            prop_assert!(battle.round() <= cap);
        }

        // Dead combatants carry no effects
        for c in battle.combatants().iter().filter(|c| !c.is_alive()) {
            prop_assert!(c.effects().is_empty());
        }
    }

    #[test]
    fn same_seed_same_battle(
        attackers in roster(),
        defenders in roster(),
        seed in any::<u64>(),
    ) {
        let registry = EffectRegistry::with_defaults();
        let run = || {
            Battle::seeded(&attackers, &defenders, &registry, BattleConfig::default().with_round_cap(10), seed)
                .unwrap()
                .run()
        };
        prop_assert_eq!(run().log.to_json().unwrap(), run().log.to_json().unwrap());
    }
}
