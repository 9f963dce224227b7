//! Battle session state machine.
//!
//! A session owns the two combatants and the player's combo stack for one
//! encounter. It moves `NotStarted -> Active -> Ended` exactly once; calling
//! a transition in the wrong phase is an error, never a gameplay result.

pub mod drops;

pub use drops::{BattleOutcome, Side, roll_drops};

use tracing::{info, warn};

use crate::combo::ComboStack;
use crate::config::BattleConfig;
use crate::error::{EngineError, EngineResult};
use crate::executor::{ActionOptions, ExecutionResult, execute_enemy_skill, execute_player_skill};
use crate::model::{Combatant, Skill, SpecialMode, TypingResult};
use crate::probability::calculate_drop_rate;
use crate::rng::{RandomSource, pick_index, roll_percent};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    /// Created, `start` not yet called.
    NotStarted,
    /// Turns are being taken.
    Active,
    /// A winner has been recorded.
    Ended,
}

/// One player-versus-enemy encounter.
#[derive(Debug, Clone)]
pub struct BattleSession {
    player: Combatant,
    enemy: Combatant,
    config: BattleConfig,
    phase: BattlePhase,
    turn: u32,
    actor: Side,
    combo: ComboStack,
    special_mode: Option<SpecialMode>,
    outcome: Option<BattleOutcome>,
    drops_rolled: bool,
}

impl BattleSession {
    /// Create a session that has not started yet.
    pub fn new(player: Combatant, enemy: Combatant, config: BattleConfig) -> Self {
        Self {
            player,
            enemy,
            config,
            phase: BattlePhase::NotStarted,
            turn: 0,
            actor: Side::Player,
            combo: ComboStack::new(),
            special_mode: None,
            outcome: None,
            drops_rolled: false,
        }
    }

    /// Start the battle at turn 1.
    ///
    /// The side with higher agility acts first. An exact tie costs one
    /// coin-flip draw; otherwise no draw is made.
    pub fn start(&mut self, rng: &mut dyn RandomSource) -> EngineResult<Side> {
        if self.phase != BattlePhase::NotStarted {
            return Err(EngineError::AlreadyStarted);
        }
        let player_agility = self.player.stats().agility;
        let enemy_agility = self.enemy.stats().agility;
        self.actor = match player_agility.cmp(&enemy_agility) {
            std::cmp::Ordering::Greater => Side::Player,
            std::cmp::Ordering::Less => Side::Enemy,
            std::cmp::Ordering::Equal => {
                if roll_percent(rng, 50.0) {
                    Side::Player
                } else {
                    Side::Enemy
                }
            }
        };
        self.turn = 1;
        self.phase = BattlePhase::Active;
        info!(
            player = self.player.name(),
            enemy = self.enemy.name(),
            first = %self.actor,
            "battle started"
        );
        Ok(self.actor)
    }

    /// Side whose turn it is.
    pub fn current_actor(&self) -> EngineResult<Side> {
        if self.phase == BattlePhase::NotStarted {
            return Err(EngineError::NotStarted);
        }
        Ok(self.actor)
    }

    /// Current turn number, starting at 1.
    pub fn turn(&self) -> EngineResult<u32> {
        if self.phase == BattlePhase::NotStarted {
            return Err(EngineError::NotStarted);
        }
        Ok(self.turn)
    }

    /// Advance the turn counter and hand the turn to the other side.
    pub fn next_turn(&mut self) -> EngineResult<u32> {
        self.ensure_active()?;
        self.turn += 1;
        self.actor = self.actor.opposite();
        Ok(self.turn)
    }

    /// Set or clear the special mode passed to every following action.
    pub fn set_special_mode(&mut self, mode: Option<SpecialMode>) {
        self.special_mode = mode;
    }

    /// Use one of the player's skills.
    pub fn player_action(
        &mut self,
        skill_id: &str,
        typing: Option<TypingResult>,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<ExecutionResult> {
        self.ensure_turn(Side::Player)?;
        let skill = self
            .player
            .skill(skill_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSkill(skill_id.to_string()))?;
        let options = ActionOptions {
            typing,
            special_mode: self.special_mode.clone(),
        };
        Ok(execute_player_skill(
            &skill,
            &mut self.player,
            &mut self.enemy,
            &mut self.combo,
            rng,
            &options,
        ))
    }

    /// Let the enemy act.
    ///
    /// Uses the enemy's queued `next_skill_id` when it names a known skill,
    /// otherwise a uniform random pick. Afterwards the following skill is
    /// picked and queued so a driver can telegraph it.
    pub fn enemy_action(&mut self, rng: &mut dyn RandomSource) -> EngineResult<ExecutionResult> {
        self.ensure_turn(Side::Enemy)?;
        let queued = self
            .enemy
            .next_skill_id()
            .and_then(|id| self.enemy.skill(id))
            .cloned();
        let skill = match queued {
            Some(skill) => skill,
            None => self.random_enemy_skill(rng)?,
        };
        let options = ActionOptions {
            typing: None,
            special_mode: self.special_mode.clone(),
        };
        let result = execute_enemy_skill(&skill, &mut self.enemy, &mut self.player, rng, &options);

        let next = self.random_enemy_skill(rng)?;
        self.enemy.set_next_skill_id(Some(next.id().to_string()));
        Ok(result)
    }

    /// Check for a winner after an action.
    ///
    /// The side not holding the turn is checked first, then the actor (a
    /// skill can knock out its own user). Records the outcome and returns
    /// true once the battle is over; calling again after that is a no-op.
    pub fn check_battle_end(&mut self) -> EngineResult<bool> {
        match self.phase {
            BattlePhase::NotStarted => return Err(EngineError::NotStarted),
            BattlePhase::Ended => return Ok(true),
            BattlePhase::Active => {}
        }
        let idle = self.actor.opposite();
        let loser = if self.combatant(idle).is_defeated() {
            idle
        } else if self.combatant(self.actor).is_defeated() {
            self.actor
        } else {
            return Ok(false);
        };

        let winner = loser.opposite();
        let (message, defeated_enemy) = match winner {
            Side::Player => (
                format!("Victory! {} was defeated.", self.enemy.name()),
                Some(self.enemy.name().to_string()),
            ),
            Side::Enemy => (format!("Defeat... {} has fallen.", self.player.name()), None),
        };
        info!(winner = %winner, turns = self.turn, "battle ended");
        self.outcome = Some(BattleOutcome {
            winner,
            message,
            turns: self.turn,
            defeated_enemy,
            drops: Vec::new(),
        });
        self.phase = BattlePhase::Ended;
        self.combo.clear();
        Ok(true)
    }

    /// Roll the enemy's drops after a player victory.
    ///
    /// The aggregate rate comes from the player's fortune and the configured
    /// world level. The first call rolls and records; later calls return the
    /// recorded drops.
    pub fn calculate_drops(&mut self, rng: &mut dyn RandomSource) -> EngineResult<Vec<String>> {
        let won = self
            .outcome
            .as_ref()
            .is_some_and(|o| o.winner == Side::Player);
        if !won {
            return Err(EngineError::NoPlayerVictory);
        }
        if self.drops_rolled {
            return Ok(self
                .outcome
                .as_ref()
                .map(|o| o.drops.clone())
                .unwrap_or_default());
        }

        let rate = calculate_drop_rate(self.player.stats().fortune, self.config.world_level);
        let drops = match self.enemy.drops() {
            Some(table) => roll_drops(table, rate, rng),
            None => Vec::new(),
        };
        info!(enemy = self.enemy.name(), rate, count = drops.len(), "drops rolled");
        if let Some(outcome) = self.outcome.as_mut() {
            outcome.drops = drops.clone();
        }
        self.drops_rolled = true;
        Ok(drops)
    }

    /// The recorded result, once the battle has ended.
    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    /// Current phase.
    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// Returns true while turns are being taken.
    pub fn is_active(&self) -> bool {
        self.phase == BattlePhase::Active
    }

    /// The player combatant.
    pub fn player(&self) -> &Combatant {
        &self.player
    }

    /// The enemy combatant.
    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    /// The player's live combo boosts.
    pub fn combo(&self) -> &ComboStack {
        &self.combo
    }

    /// Session configuration.
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn ensure_active(&self) -> EngineResult<()> {
        match self.phase {
            BattlePhase::NotStarted => Err(EngineError::NotStarted),
            BattlePhase::Ended => Err(EngineError::BattleEnded),
            BattlePhase::Active => Ok(()),
        }
    }

    fn ensure_turn(&self, side: Side) -> EngineResult<()> {
        self.ensure_active()?;
        if self.actor != side {
            warn!(expected = %side, actual = %self.actor, "action out of turn");
            return Err(EngineError::NotYourTurn(match side {
                Side::Player => "player",
                Side::Enemy => "enemy",
            }));
        }
        Ok(())
    }

    fn random_enemy_skill(&self, rng: &mut dyn RandomSource) -> EngineResult<Skill> {
        let skills = self.enemy.skills();
        pick_index(rng, skills.len())
            .and_then(|i| skills.get(i))
            .cloned()
            .ok_or_else(|| EngineError::UnknownSkill(format!("no skills on '{}'", self.enemy.id())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::model::{DropEntry, DropTable, Effect, Skill, SkillData, Stats, SuccessRateSpec};
    use crate::rng::SequenceRandom;

    fn sure_hit(id: &str, power: i64) -> Skill {
        Skill::new(SkillData {
            success_rate: Some(SuccessRateSpec {
                base: 100.0,
                agility_influence: 0.0,
                typing_influence: 0.0,
            }),
            ..SkillData::simple(id, id, vec![Effect::damage(power).unwrap()])
        })
        .unwrap()
    }

    fn fighter(id: &str, agility: u32, health: u32, skills: &[Skill]) -> Combatant {
        let mut builder = Combatant::builder(id, id)
            .stats(Stats::new(0, 0, agility, 0))
            .health(health)
            .evasion(0.0, 0.0);
        for skill in skills {
            builder = builder.skill(skill.clone());
        }
        builder.build(&InMemoryCatalog::default()).unwrap()
    }

    fn session(player_agility: u32, enemy_agility: u32) -> BattleSession {
        BattleSession::new(
            fighter("hero", player_agility, 100, &[sure_hit("smite", 60)]),
            fighter("goblin", enemy_agility, 100, &[sure_hit("claw", 10)]),
            BattleConfig::default(),
        )
    }

    #[test]
    fn faster_side_starts_without_a_draw() {
        let mut rng = SequenceRandom::new([0.9]);
        let mut battle = session(100, 50);
        assert_eq!(battle.start(&mut rng).unwrap(), Side::Player);
        assert_eq!(rng.draws(), 0);

        let mut battle = session(50, 100);
        assert_eq!(battle.start(&mut rng).unwrap(), Side::Enemy);
        assert_eq!(rng.draws(), 0);
        assert_eq!(battle.turn().unwrap(), 1);
    }

    #[test]
    fn tie_costs_exactly_one_draw() {
        let mut rng = SequenceRandom::new([0.2]);
        let mut battle = session(70, 70);
        assert_eq!(battle.start(&mut rng).unwrap(), Side::Player);
        assert_eq!(rng.draws(), 1);

        let mut rng = SequenceRandom::new([0.7]);
        let mut battle = session(70, 70);
        assert_eq!(battle.start(&mut rng).unwrap(), Side::Enemy);
        assert_eq!(rng.draws(), 1);
    }

    #[test]
    fn lifecycle_misuse_is_an_error() {
        let mut rng = SequenceRandom::new([0.0]);
        let mut battle = session(100, 50);
        assert!(matches!(battle.current_actor(), Err(EngineError::NotStarted)));
        assert!(matches!(battle.turn(), Err(EngineError::NotStarted)));
        assert!(matches!(battle.next_turn(), Err(EngineError::NotStarted)));
        assert!(matches!(battle.check_battle_end(), Err(EngineError::NotStarted)));
        assert!(matches!(
            battle.player_action("smite", None, &mut rng),
            Err(EngineError::NotStarted)
        ));

        battle.start(&mut rng).unwrap();
        assert!(matches!(battle.start(&mut rng), Err(EngineError::AlreadyStarted)));
        assert!(matches!(
            battle.enemy_action(&mut rng),
            Err(EngineError::NotYourTurn("enemy"))
        ));
        assert!(matches!(
            battle.player_action("fireball", None, &mut rng),
            Err(EngineError::UnknownSkill(_))
        ));
        assert!(matches!(
            battle.calculate_drops(&mut rng),
            Err(EngineError::NoPlayerVictory)
        ));
    }

    #[test]
    fn turns_alternate() {
        let mut rng = SequenceRandom::new([0.0]);
        let mut battle = session(100, 50);
        battle.start(&mut rng).unwrap();
        assert_eq!(battle.next_turn().unwrap(), 2);
        assert_eq!(battle.current_actor().unwrap(), Side::Enemy);
        assert_eq!(battle.next_turn().unwrap(), 3);
        assert_eq!(battle.current_actor().unwrap(), Side::Player);
    }

    #[test]
    fn player_victory_records_outcome_once() {
        // success, evasion, effect, crit for each hit
        let mut rng = SequenceRandom::new([0.0, 0.99, 0.0, 0.99]);
        let mut battle = session(100, 50);
        battle.start(&mut rng).unwrap();

        let first = battle.player_action("smite", None, &mut rng).unwrap();
        assert_eq!(first.total_damage, 60);
        assert!(!battle.check_battle_end().unwrap());
        battle.next_turn().unwrap();

        battle.enemy_action(&mut rng).unwrap();
        assert!(!battle.check_battle_end().unwrap());
        assert!(battle.enemy().next_skill_id().is_some());
        battle.next_turn().unwrap();

        let second = battle.player_action("smite", None, &mut rng).unwrap();
        assert!(second.target_defeated);
        assert!(battle.check_battle_end().unwrap());
        assert!(battle.check_battle_end().unwrap());

        let outcome = battle.outcome().unwrap();
        assert_eq!(outcome.winner, Side::Player);
        assert_eq!(outcome.turns, 3);
        assert_eq!(outcome.defeated_enemy.as_deref(), Some("goblin"));
        assert_eq!(battle.phase(), BattlePhase::Ended);
        assert!(matches!(battle.next_turn(), Err(EngineError::BattleEnded)));
        assert!(matches!(
            battle.player_action("smite", None, &mut rng),
            Err(EngineError::BattleEnded)
        ));
    }

    #[test]
    fn enemy_victory_has_no_drops() {
        let mut rng = SequenceRandom::new([0.0, 0.99, 0.0, 0.99]);
        let mut battle = BattleSession::new(
            fighter("hero", 10, 5, &[sure_hit("poke", 1)]),
            fighter("dragon", 90, 500, &[sure_hit("flame", 50)]),
            BattleConfig::default(),
        );
        assert_eq!(battle.start(&mut rng).unwrap(), Side::Enemy);
        battle.enemy_action(&mut rng).unwrap();
        assert!(battle.check_battle_end().unwrap());
        let outcome = battle.outcome().unwrap();
        assert_eq!(outcome.winner, Side::Enemy);
        assert_eq!(outcome.defeated_enemy, None);
        assert!(matches!(
            battle.calculate_drops(&mut rng),
            Err(EngineError::NoPlayerVictory)
        ));
    }

    #[test]
    fn queued_enemy_skill_is_used() {
        let catalog = InMemoryCatalog::new([sure_hit("claw", 10), sure_hit("bite", 30)]);
        let mut data = fighter("goblin", 0, 100, &[sure_hit("claw", 10)]).snapshot();
        data.skills = vec!["claw".into(), "bite".into()];
        data.next_skill_id = Some("bite".into());
        let goblin = Combatant::from_data(data, &catalog).unwrap();
        let mut battle = BattleSession::new(
            fighter("hero", 0, 100, &[sure_hit("poke", 1)]),
            goblin,
            BattleConfig::default(),
        );
        // tie-break to enemy, then the bite resolves and the next pick is drawn
        let mut rng = SequenceRandom::new([0.9, 0.0, 0.99, 0.0, 0.99, 0.0]);
        battle.start(&mut rng).unwrap();
        let result = battle.enemy_action(&mut rng).unwrap();
        assert_eq!(result.skill_id, "bite");
        assert_eq!(battle.player().health().current, 70);
        assert_eq!(battle.enemy().next_skill_id(), Some("claw"));
    }

    #[test]
    fn drops_follow_world_level_and_entry_rates() {
        let drops = DropTable::new(vec![
            DropEntry {
                item_id: "gold".into(),
                rate: 100.0,
            },
            DropEntry {
                item_id: "relic".into(),
                rate: 0.0,
            },
        ])
        .unwrap();
        let goblin = Combatant::builder("goblin", "goblin")
            .health(10)
            .evasion(0.0, 0.0)
            .skill(sure_hit("claw", 1))
            .drops(drops)
            .build(&InMemoryCatalog::default())
            .unwrap();
        let mut battle = BattleSession::new(
            fighter("hero", 100, 100, &[sure_hit("smite", 60)]),
            goblin,
            BattleConfig::default().with_world_level(5),
        );
        // hit: success, evasion, effect, crit; then drops: gate (rate 35), gold, relic
        let mut rng = SequenceRandom::new([0.0, 0.99, 0.0, 0.99, 0.3, 0.5, 0.5]);
        battle.start(&mut rng).unwrap();
        battle.player_action("smite", None, &mut rng).unwrap();
        assert!(battle.check_battle_end().unwrap());

        let rolled = battle.calculate_drops(&mut rng).unwrap();
        assert_eq!(rolled, ["gold"]);
        assert_eq!(battle.outcome().unwrap().drops, ["gold"]);
        assert_eq!(rng.draws(), 7);
        // recorded, not re-rolled
        assert_eq!(battle.calculate_drops(&mut rng).unwrap(), ["gold"]);
        assert_eq!(rng.draws(), 7);
    }

    #[test]
    fn combo_is_cleared_when_battle_ends() {
        let mut finisher = SkillData::simple("smite", "smite", vec![Effect::damage(200).unwrap()]);
        finisher.combo_boosts = vec![crate::model::ComboBoost::once(
            crate::model::BoostKind::DamageMultiplier,
            0.5,
        )];
        finisher.success_rate = Some(SuccessRateSpec {
            base: 100.0,
            agility_influence: 0.0,
            typing_influence: 0.0,
        });
        let mut battle = BattleSession::new(
            fighter("hero", 100, 100, &[Skill::new(finisher).unwrap()]),
            fighter("goblin", 0, 100, &[sure_hit("claw", 1)]),
            BattleConfig::default(),
        );
        let mut rng = SequenceRandom::new([0.0, 0.99, 0.0, 0.99]);
        battle.start(&mut rng).unwrap();
        battle.player_action("smite", None, &mut rng).unwrap();
        assert_eq!(battle.combo().len(), 1);
        battle.check_battle_end().unwrap();
        assert!(battle.combo().is_empty());
    }
}
