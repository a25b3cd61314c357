//! BattleOrchestrator - Drives two rosters through rounds until one side falls
//!
//! A round is two side phases (the designated first side, then the other)
//! followed by a round update that ticks every live combatant's effects.
//! [`Battle::step`] advances exactly one of those transitions so callers can
//! watch a battle unfold; [`Battle::run`] drives it to the end.

mod log;

pub use log::{ActionEvent, ActionSource, BattleEvent, BattleLog, SkipReason, TargetOutcome};

use crate::ability::{AbilityError, MAX_TIER};
use crate::combatant::{perform_action, ActionPlan, Combatant};
use crate::config::BattleConstants;
use crate::effect::{AttachOutcome, EffectKind, EffectRegistry};
use crate::params::{AggregateError, CharacterSnapshot};
use crate::types::{CombatantId, Side, TriggerCondition};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Battle setup failure
#[derive(Error, Debug)]
pub enum BattleError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Ability(#[from] AbilityError),
    #[error("{0} roster is empty")]
    EmptyRoster(Side),
    #[error("round cap must be at least 1")]
    ZeroRoundCap,
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleConfig {
    /// Rounds before the battle ends in a draw
    pub round_cap: u32,
    /// Side that acts first in every round
    pub first_side: Side,
    pub constants: BattleConstants,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig::from_constants(BattleConstants::default())
    }
}

impl BattleConfig {
    pub fn from_constants(constants: BattleConstants) -> Self {
        BattleConfig {
            round_cap: constants.rounds.cap,
            first_side: Side::Attackers,
            constants,
        }
    }

    pub fn with_round_cap(mut self, round_cap: u32) -> Self {
        self.round_cap = round_cap;
        self
    }

    pub fn with_first_side(mut self, side: Side) -> Self {
        self.first_side = side;
        self
    }
}

/// Why a battle ended without a winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// The round cap was reached with both sides standing
    RoundCap,
    /// Both rosters fell in the same action or round update
    MutualDefeat,
}

/// Terminal result of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Victory { winner: Side },
    Draw { reason: DrawReason },
}

impl Outcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Victory { winner } => Some(*winner),
            Outcome::Draw { .. } => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw { .. })
    }
}

/// Orchestrator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BattleState {
    /// Rosters assigned, nobody has acted
    Created,
    /// `side` is about to take its phase of `round`
    RoundInProgress { round: u32, side: Side },
    /// Both sides moved; effects tick next
    RoundComplete { round: u32 },
    Finished(Outcome),
}

/// Final result handed back to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub outcome: Outcome,
    /// Rounds started before the battle ended
    pub rounds: u32,
    pub survivors: Vec<CombatantId>,
    pub log: BattleLog,
}

/// One battle between two rosters
///
/// Both rosters live in a single vector, attackers first; teams are index
/// ranges into it.
pub struct Battle<R: Rng = ChaCha8Rng> {
    roster: Vec<Combatant>,
    config: BattleConfig,
    state: BattleState,
    log: BattleLog,
    rng: R,
    last_round: u32,
}

impl Battle<ChaCha8Rng> {
    /// Battle with a reproducible random source
    pub fn seeded(
        attackers: &[CharacterSnapshot],
        defenders: &[CharacterSnapshot],
        registry: &EffectRegistry,
        config: BattleConfig,
        seed: u64,
    ) -> Result<Self, BattleError> {
        Battle::new(
            attackers,
            defenders,
            registry,
            config,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> Battle<R> {
    /// Build every combatant from its snapshot
    ///
    /// Fails before any round runs when a character cannot be aggregated or
    /// carries invalid abilities.
    pub fn new(
        attackers: &[CharacterSnapshot],
        defenders: &[CharacterSnapshot],
        registry: &EffectRegistry,
        config: BattleConfig,
        rng: R,
    ) -> Result<Self, BattleError> {
        if config.round_cap == 0 {
            return Err(BattleError::ZeroRoundCap);
        }

        let mut roster = Vec::with_capacity(attackers.len() + defenders.len());
        for (side, characters) in [(Side::Attackers, attackers), (Side::Defenders, defenders)] {
            if characters.is_empty() {
                return Err(BattleError::EmptyRoster(side));
            }
            for (slot, character) in characters.iter().enumerate() {
                roster.push(Combatant::from_character(
                    CombatantId::new(side, slot),
                    character,
                    registry,
                )?);
            }
        }

        Ok(Battle {
            roster,
            config,
            state: BattleState::Created,
            log: BattleLog::new(),
            rng,
            last_round: 0,
        })
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.roster
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.roster.iter().find(|c| c.id() == id)
    }

    /// Live combatants of one side, roster order
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Combatant> {
        self.roster
            .iter()
            .filter(move |c| c.id().side == side && c.is_alive())
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, BattleState::Finished(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            BattleState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Current round, 0 before the first round starts
    pub fn round(&self) -> u32 {
        match self.state {
            BattleState::Created => 0,
            BattleState::RoundInProgress { round, .. } | BattleState::RoundComplete { round } => {
                round
            }
            BattleState::Finished(_) => self.last_round,
        }
    }

    /// Advance one state transition
    pub fn step(&mut self) -> BattleState {
        self.state = match self.state {
            BattleState::Created => {
                self.fire_on_start();
                self.settled(0).unwrap_or(BattleState::RoundInProgress {
                    round: 1,
                    side: self.config.first_side,
                })
            }
            BattleState::RoundInProgress { round, side } => {
                self.run_phase(round, side);
                self.settled(round).unwrap_or(if side == self.config.first_side {
                    BattleState::RoundInProgress {
                        round,
                        side: side.opponent(),
                    }
                } else {
                    BattleState::RoundComplete { round }
                })
            }
            BattleState::RoundComplete { round } => {
                self.update_effects(round);
                if let Some(finished) = self.settled(round) {
                    finished
                } else if round >= self.config.round_cap {
                    self.finish(
                        round,
                        Outcome::Draw {
                            reason: DrawReason::RoundCap,
                        },
                    )
                } else {
                    BattleState::RoundInProgress {
                        round: round + 1,
                        side: self.config.first_side,
                    }
                }
            }
            finished @ BattleState::Finished(_) => finished,
        };
        self.state
    }

    /// Step until the battle is finished
    pub fn run(mut self) -> BattleReport {
        loop {
            if let BattleState::Finished(outcome) = self.step() {
                let survivors = self
                    .roster
                    .iter()
                    .filter(|c| c.is_alive())
                    .map(|c| c.id())
                    .collect();
                return BattleReport {
                    outcome,
                    rounds: self.last_round,
                    survivors,
                    log: self.log,
                };
            }
        }
    }
}

// Round mechanics
impl<R: Rng> Battle<R> {
    fn side_alive(&self, side: Side) -> bool {
        self.living(side).next().is_some()
    }

    fn decided(&self) -> bool {
        !self.side_alive(Side::Attackers) || !self.side_alive(Side::Defenders)
    }

    fn index_of(&self, id: CombatantId) -> Option<usize> {
        self.roster.iter().position(|c| c.id() == id)
    }

    /// Finished state if either roster is wiped out
    fn settled(&mut self, round: u32) -> Option<BattleState> {
        let outcome = match (self.side_alive(Side::Attackers), self.side_alive(Side::Defenders)) {
            (true, true) => return None,
            (true, false) => Outcome::Victory {
                winner: Side::Attackers,
            },
            (false, true) => Outcome::Victory {
                winner: Side::Defenders,
            },
            (false, false) => Outcome::Draw {
                reason: DrawReason::MutualDefeat,
            },
        };
        Some(self.finish(round, outcome))
    }

    fn finish(&mut self, round: u32, outcome: Outcome) -> BattleState {
        self.last_round = round;
        info!(rounds = round, ?outcome, events = self.log.len(), "battle finished");
        BattleState::Finished(outcome)
    }

    /// Speed descending, ties in roster order
    fn turn_order(&self, side: Side) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.roster.len())
            .filter(|&i| self.roster[i].id().side == side)
            .collect();
        order.sort_by(|&a, &b| {
            self.roster[b]
                .stats()
                .speed
                .total_cmp(&self.roster[a].stats().speed)
        });
        order
    }

    /// `on_start` passives, first side first; logged as round 0
    fn fire_on_start(&mut self) {
        let first = self.config.first_side;
        for side in [first, first.opponent()] {
            for actor in 0..self.roster.len() {
                if self.roster[actor].id().side == side {
                    self.fire_triggers(0, actor, TriggerCondition::OnStart);
                }
            }
        }
    }

    fn run_phase(&mut self, round: u32, side: Side) {
        for actor in self.turn_order(side) {
            if self.decided() {
                return;
            }
            self.take_turn(round, actor);
        }
        if self.decided() {
            return;
        }

        for actor in 0..self.roster.len() {
            let combatant = &mut self.roster[actor];
            if combatant.id().side != side || !combatant.is_alive() {
                continue;
            }
            combatant.decay_cooldowns();
            self.fire_triggers(round, actor, TriggerCondition::OnMotionEnd);
        }
    }

    fn take_turn(&mut self, round: u32, actor: usize) {
        let combatant = &self.roster[actor];
        let id = combatant.id();
        if !combatant.is_alive() {
            return;
        }
        if combatant.is_stunned() {
            debug!(round, combatant = %id, "stunned, turn skipped");
            self.log.push(BattleEvent::Skipped {
                round,
                combatant: id,
                reason: SkipReason::Stunned,
            });
            return;
        }

        let plan = self.roster[actor].choose_action(&mut self.rng);
        if let ActionPlan::Ability(ability) = &plan {
            self.roster[actor].start_cooldown(ability);
        }
        let event = perform_action(
            &mut self.roster,
            actor,
            &plan,
            ActionSource::Turn,
            round,
            &self.config.constants,
            &mut self.rng,
        );
        self.record_action(round, event, true);

        if self.decided() {
            return;
        }

        let reaction = match &plan {
            ActionPlan::Basic => Some(TriggerCondition::OnCommonAttack),
            ActionPlan::Ability(ability) if ability.tier() == MAX_TIER => {
                Some(TriggerCondition::OnUltimateAttack)
            }
            ActionPlan::Ability(_) => None,
        };
        if let Some(condition) = reaction {
            self.fire_triggers(round, actor, condition);
        }

        let mates: Vec<usize> = (0..self.roster.len())
            .filter(|&i| i != actor && self.roster[i].id().side == id.side)
            .collect();
        for mate in mates {
            self.fire_triggers(round, mate, TriggerCondition::OnTeammateAttack);
        }
    }

    /// Log an action and settle its consequences
    ///
    /// With `reactions` off (for triggered actions) deaths are still processed
    /// but no further passives fire.
    fn record_action(&mut self, round: u32, event: ActionEvent, reactions: bool) {
        let killer = event.actor;
        let killed: Vec<CombatantId> = event
            .outcomes
            .iter()
            .filter(|o| o.is_killing_blow())
            .map(|o| o.target)
            .collect();
        let afflicted: Vec<(CombatantId, EffectKind)> = event
            .outcomes
            .iter()
            .filter_map(|o| match &o.effect {
                Some(AttachOutcome::Attached { kind, .. })
                | Some(AttachOutcome::Refreshed { kind, .. }) => Some((o.target, *kind)),
                _ => None,
            })
            .collect();

        self.log.push(BattleEvent::Action(event));

        for target in killed {
            self.handle_death(round, target, Some(killer), reactions);
        }

        if reactions {
            for (target, kind) in afflicted {
                let condition = if kind.is_buff() {
                    TriggerCondition::OnBuff
                } else {
                    TriggerCondition::OnDebuff
                };
                if let Some(index) = self.index_of(target) {
                    self.fire_triggers(round, index, condition);
                }
            }
        }
    }

    fn handle_death(&mut self, round: u32, id: CombatantId, killer: Option<CombatantId>, reactions: bool) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.roster[index].leave_play();
        debug!(round, combatant = %id, "combatant died");
        self.log.push(BattleEvent::Death {
            round,
            combatant: id,
            killer,
        });
        if reactions {
            self.fire_triggers(round, index, TriggerCondition::OnDeath);
        }
    }

    /// Run every passive of `roster[actor]` that answers `condition`
    fn fire_triggers(&mut self, round: u32, actor: usize, condition: TriggerCondition) {
        if condition != TriggerCondition::OnDeath && !self.roster[actor].is_alive() {
            return;
        }
        let fired = self.roster[actor].triggered_passives(condition, &mut self.rng);
        for ability in fired {
            let event = perform_action(
                &mut self.roster,
                actor,
                &ActionPlan::Ability(ability),
                ActionSource::Trigger(condition),
                round,
                &self.config.constants,
                &mut self.rng,
            );
            self.record_action(round, event, false);
        }
    }

    /// End-of-round effect update for every live combatant, roster order
    fn update_effects(&mut self, round: u32) {
        for index in 0..self.roster.len() {
            if !self.roster[index].is_alive() {
                continue;
            }
            let id = self.roster[index].id();
            let update = self.roster[index].tick_effects();

            let mut died = false;
            for tick in update.ticks {
                debug!(round, combatant = %id, kind = ?tick.kind, expired = tick.expired, "effect tick");
                died |= tick.damage.map_or(false, |d| d.is_killing_blow);
                self.log.push(BattleEvent::EffectTick {
                    round,
                    combatant: id,
                    tick,
                });
            }
            for guards in update.expired_immunities {
                self.log.push(BattleEvent::Expired {
                    round,
                    combatant: id,
                    guards,
                });
            }

            if died {
                self.handle_death(round, id, None, true);
            }
        }
    }
}

/// Run a complete battle in one call
///
/// Without a seed the random source is seeded from the operating system.
pub fn simulate(
    attackers: &[CharacterSnapshot],
    defenders: &[CharacterSnapshot],
    registry: &EffectRegistry,
    round_cap: Option<u32>,
    seed: Option<u64>,
) -> Result<BattleReport, BattleError> {
    let mut config = BattleConfig::default();
    if let Some(cap) = round_cap {
        config.round_cap = cap;
    }
    let rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    Ok(Battle::new(attackers, defenders, registry, config, rng)?.run())
}
