//! Action executor: one skill use, end to end.
//!
//! Gameplay setbacks (insufficient resource, a missed roll, an evasion) are
//! ordinary results with `success == false` and a message. Only the
//! attacker's and defender's health, resource and statuses change here.

use serde::Serialize;
use tracing::{debug, warn};

use crate::combo::ComboStack;
use crate::model::{
    Combatant, ConditionContext, EffectKind, Skill, SpecialMode, TargetSelector, TypingModifiers,
    TypingResult,
};
use crate::probability::{
    EffectOutcome, JudgmentResult, calculate_resource_restore, execute_three_layer_judgment,
    is_effect_conditions_met, merge_potential_effects,
};
use crate::rng::RandomSource;

/// Driver-supplied inputs for a skill use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOptions {
    /// Result of the typing minigame, if one was played.
    pub typing: Option<TypingResult>,
    /// Active special mode, if any.
    pub special_mode: Option<SpecialMode>,
}

impl ActionOptions {
    /// Options carrying a typing result.
    pub fn typed(typing: TypingResult) -> Self {
        Self {
            typing: Some(typing),
            special_mode: None,
        }
    }

    /// Set the active special mode.
    pub fn with_special_mode(mut self, mode: SpecialMode) -> Self {
        self.special_mode = Some(mode);
        self
    }
}

/// A status added to or removed from one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// Which side changed, relative to the attacker.
    pub side: TargetSelector,
    /// Status name.
    pub status: String,
    /// True for an addition, false for a removal.
    pub added: bool,
}

/// Structured result of one skill use.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// The skill that was used.
    pub skill_id: String,
    /// The skill passed its success roll and was not evaded.
    pub success: bool,
    /// Raw judgment; default when the action was rejected before judging.
    pub judgment: JudgmentResult,
    /// Damage dealt by landed damage effects.
    pub total_damage: u32,
    /// Health restored by landed heal effects.
    pub total_heal: u32,
    /// Resource gained from the skill's restore.
    pub resource_restored: u32,
    /// Any effect rolled a critical.
    pub is_critical: bool,
    /// The defender ended the action with zero health.
    pub target_defeated: bool,
    /// Status changes in effect order.
    pub status_changes: Vec<StatusChange>,
    /// Human-readable transcript lines in order.
    pub messages: Vec<String>,
}

impl ExecutionResult {
    fn rejected(skill: &Skill, message: String) -> Self {
        Self {
            skill_id: skill.id().to_string(),
            success: false,
            judgment: JudgmentResult::default(),
            total_damage: 0,
            total_heal: 0,
            resource_restored: 0,
            is_critical: false,
            target_defeated: false,
            status_changes: Vec::new(),
            messages: vec![message],
        }
    }
}

/// Execute a player skill.
///
/// Live combo boosts shape the skill first, and the resource check uses the
/// boosted cost. A rejected action mutates nothing and leaves the combo
/// stack untouched. Otherwise the stack is consumed once, and the skill's
/// own boosts are registered if it landed.
pub fn execute_player_skill(
    skill: &Skill,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    combo: &mut ComboStack,
    rng: &mut dyn RandomSource,
    options: &ActionOptions,
) -> ExecutionResult {
    let effective = combo.apply_to_skill(skill);
    let cost = effective.resource_cost();

    if !attacker.can_afford(cost) {
        let available = attacker.resource().map_or(0, |r| r.current);
        warn!(
            attacker = attacker.id(),
            skill = skill.id(),
            cost,
            available,
            "insufficient resource"
        );
        return ExecutionResult::rejected(
            skill,
            format!(
                "{} does not have enough resource for {} ({available}/{cost}).",
                attacker.name(),
                skill.name()
            ),
        );
    }

    if let Some(pool) = attacker.resource_mut() {
        pool.drain(cost);
    }

    let result = resolve(&effective, attacker, defender, rng, options);

    combo.consume_once();
    if result.success {
        combo.register(skill.combo_boosts());
    }
    debug!(
        skill = skill.id(),
        success = result.success,
        damage = result.total_damage,
        combo = combo.len(),
        "player skill executed"
    );
    result
}

/// Execute an enemy skill: no typing, no resource gate, no combo stack.
pub fn execute_enemy_skill(
    skill: &Skill,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    rng: &mut dyn RandomSource,
    options: &ActionOptions,
) -> ExecutionResult {
    let options = ActionOptions {
        typing: None,
        special_mode: options.special_mode.clone(),
    };
    let result = resolve(skill, attacker, defender, rng, &options);
    debug!(
        skill = skill.id(),
        success = result.success,
        damage = result.total_damage,
        "enemy skill executed"
    );
    result
}

fn condition_context(
    attacker: &Combatant,
    defender: &Combatant,
    options: &ActionOptions,
) -> ConditionContext {
    let typing = options.typing.as_ref();
    ConditionContext {
        speed: typing.map(|t| t.speed_rating),
        accuracy: typing.and_then(|t| t.accuracy_rating),
        typing_perfect: typing.is_some_and(TypingResult::is_perfect),
        user_health_percent: attacker.health().percent(),
        opponent_health_percent: defender.health().percent(),
        special_mode: options.special_mode.clone(),
    }
}

fn resolve(
    skill: &Skill,
    attacker: &mut Combatant,
    defender: &mut Combatant,
    rng: &mut dyn RandomSource,
    options: &ActionOptions,
) -> ExecutionResult {
    let ctx = condition_context(attacker, defender, options);
    let effects = merge_potential_effects(skill.effects(), skill.potential_effects(), &ctx)
        .into_iter()
        .filter(|e| is_effect_conditions_met(e.conditions(), &ctx))
        .collect();
    let judged = skill.with_effects(effects);

    let modifiers = options
        .typing
        .as_ref()
        .map_or_else(TypingModifiers::none, TypingResult::modifiers);
    let stats = *attacker.stats();
    let judgment = execute_three_layer_judgment(&judged, defender, &stats, modifiers, rng);

    let mut messages = vec![format!("{} uses {}!", attacker.name(), skill.name())];
    let mut total_damage = 0u32;
    let mut total_heal = 0u32;
    let mut status_changes = Vec::new();

    if !judgment.skill_success {
        messages.push(format!("{} missed!", skill.name()));
    } else if judgment.evaded {
        messages.push(format!("{} evaded {}!", defender.name(), skill.name()));
    } else {
        for outcome in &judgment.effects {
            let target = match outcome.target {
                TargetSelector::User => &mut *attacker,
                TargetSelector::Opponent => &mut *defender,
            };
            apply_outcome(
                outcome,
                target,
                &mut total_damage,
                &mut total_heal,
                &mut status_changes,
                &mut messages,
            );
        }
    }

    let mut resource_restored = 0;
    if judgment.skill_success && skill.resource_restore() > 0 {
        let amount = calculate_resource_restore(skill.resource_restore(), modifiers.accuracy);
        if let Some(pool) = attacker.resource_mut() {
            resource_restored = pool.fill(amount);
        }
        if resource_restored > 0 {
            messages.push(format!(
                "{} charges {resource_restored} resource.",
                attacker.name()
            ));
        }
    }

    let target_defeated = defender.is_defeated();
    if target_defeated {
        messages.push(format!("{} is defeated!", defender.name()));
    }

    ExecutionResult {
        skill_id: skill.id().to_string(),
        success: judgment.landed(),
        is_critical: judgment.is_critical,
        judgment,
        total_damage,
        total_heal,
        resource_restored,
        target_defeated,
        status_changes,
        messages,
    }
}

fn apply_outcome(
    outcome: &EffectOutcome,
    target: &mut Combatant,
    total_damage: &mut u32,
    total_heal: &mut u32,
    status_changes: &mut Vec<StatusChange>,
    messages: &mut Vec<String>,
) {
    if !outcome.success {
        if let EffectKind::AddStatus { status } = &outcome.kind {
            messages.push(format!("{} resisted {status}.", target.name()));
        }
        return;
    }
    if outcome.critical && !outcome.kind.is_status() {
        messages.push("Critical hit!".to_string());
    }

    match &outcome.kind {
        EffectKind::Damage => {
            target.health_mut().drain(outcome.power);
            *total_damage = total_damage.saturating_add(outcome.power);
            messages.push(format!("{} takes {} damage.", target.name(), outcome.power));
        }
        EffectKind::Heal => {
            let healed = target.health_mut().fill(outcome.power);
            *total_heal = total_heal.saturating_add(healed);
            messages.push(format!("{} recovers {healed} health.", target.name()));
        }
        EffectKind::AddStatus { status } => {
            if target.add_status(status) {
                status_changes.push(StatusChange {
                    side: outcome.target,
                    status: status.clone(),
                    added: true,
                });
                messages.push(format!("{} is now {status}.", target.name()));
            }
        }
        EffectKind::RemoveStatus { status } => {
            if target.remove_status(status) {
                status_changes.push(StatusChange {
                    side: outcome.target,
                    status: status.clone(),
                    added: false,
                });
                messages.push(format!("{} is no longer {status}.", target.name()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::model::{
        AccuracyRating, BoostKind, ComboBoost, Comparison, Condition, Effect, PotentialEffect,
        SkillData, SpeedRating, Stats, SuccessRateSpec,
    };
    use crate::rng::SequenceRandom;

    fn sure(data: SkillData) -> Skill {
        Skill::new(SkillData {
            success_rate: Some(SuccessRateSpec {
                base: 100.0,
                agility_influence: 0.0,
                typing_influence: 0.0,
            }),
            ..data
        })
        .unwrap()
    }

    fn slash() -> Skill {
        sure(SkillData {
            resource_cost: 10,
            combo_boosts: vec![ComboBoost::once(BoostKind::DamageMultiplier, 1.0)],
            ..SkillData::simple("slash", "Slash", vec![Effect::damage(12).unwrap()])
        })
    }

    fn hero(resource: u32) -> Combatant {
        Combatant::builder("hero", "Hero")
            .health(100)
            .resource(50)
            .current_resource(resource)
            .evasion(0.0, 0.0)
            .skill(slash())
            .build(&InMemoryCatalog::default())
            .unwrap()
    }

    fn slime(health: u32) -> Combatant {
        Combatant::builder("slime", "Slime")
            .health(health)
            .evasion(0.0, 0.0)
            .skill(Skill::simple("ooze", "Ooze", vec![Effect::damage(3).unwrap()]).unwrap())
            .build(&InMemoryCatalog::default())
            .unwrap()
    }

    // success, evasion, effect success, crit
    fn clean_hit() -> SequenceRandom {
        SequenceRandom::new([0.0, 0.99, 0.0, 0.99])
    }

    #[test]
    fn insufficient_resource_mutates_nothing() {
        let mut player = hero(5);
        let mut enemy = slime(30);
        let mut combo = ComboStack::new();
        combo.register(&[ComboBoost::once(BoostKind::SkillSuccessAdd, 5.0)]);
        let mut rng = SequenceRandom::new([0.0]);

        let result = execute_player_skill(
            &slash(),
            &mut player,
            &mut enemy,
            &mut combo,
            &mut rng,
            &ActionOptions::default(),
        );

        assert!(!result.success);
        assert_eq!(result.messages.len(), 1);
        assert!(result.messages[0].contains("enough resource"));
        assert_eq!(player.resource().unwrap().current, 5);
        assert_eq!(enemy.health().current, 30);
        assert_eq!(combo.len(), 1);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn cost_reduction_lets_a_short_player_act() {
        let mut player = hero(5);
        let mut enemy = slime(30);
        let mut combo = ComboStack::new();
        combo.register(&[ComboBoost::once(BoostKind::ResourceCostReduction, 5.0)]);

        let result = execute_player_skill(
            &slash(),
            &mut player,
            &mut enemy,
            &mut combo,
            &mut clean_hit(),
            &ActionOptions::default(),
        );

        assert!(result.success);
        assert_eq!(player.resource().unwrap().current, 0);
        assert_eq!(enemy.health().current, 18);
    }

    #[test]
    fn landed_hit_deducts_damages_and_registers_boosts() {
        let mut player = hero(50);
        let mut enemy = slime(30);
        let mut combo = ComboStack::new();

        let result = execute_player_skill(
            &slash(),
            &mut player,
            &mut enemy,
            &mut combo,
            &mut clean_hit(),
            &ActionOptions::default(),
        );

        assert!(result.success);
        assert_eq!(result.total_damage, 12);
        assert_eq!(player.resource().unwrap().current, 40);
        assert_eq!(enemy.health().current, 18);
        assert_eq!(combo.len(), 1);
        assert_eq!(
            result.messages,
            ["Hero uses Slash!", "Slime takes 12 damage."]
        );

        // the registered multiplier doubles the next hit, then expires
        let second = execute_player_skill(
            &slash(),
            &mut player,
            &mut enemy,
            &mut combo,
            &mut clean_hit(),
            &ActionOptions::default(),
        );
        assert_eq!(second.total_damage, 24);
        assert!(second.target_defeated);
        assert_eq!(second.messages.last().unwrap(), "Slime is defeated!");
        // slash registered its boost again after landing
        assert_eq!(combo.entries()[0].kind, BoostKind::DamageMultiplier);
        assert_eq!(combo.len(), 1);
    }

    #[test]
    fn miss_consumes_combo_without_registering() {
        let mut player = hero(50);
        let mut enemy = slime(30);
        let mut combo = ComboStack::new();
        combo.register(&[ComboBoost::once(BoostKind::HealMultiplier, 1.0)]);
        let skill = Skill::simple("wild", "Wild Swing", vec![Effect::damage(5).unwrap()]).unwrap();
        let skill = Skill::new(SkillData {
            combo_boosts: vec![ComboBoost::once(BoostKind::SkillSuccessAdd, 10.0)],
            success_rate: Some(SuccessRateSpec {
                base: 10.0,
                agility_influence: 0.0,
                typing_influence: 0.0,
            }),
            ..SkillData::from(skill)
        })
        .unwrap();

        let result = execute_player_skill(
            &skill,
            &mut player,
            &mut enemy,
            &mut combo,
            &mut SequenceRandom::new([0.5]),
            &ActionOptions::default(),
        );

        assert!(!result.success);
        assert_eq!(result.messages, ["Hero uses Wild Swing!", "Wild Swing missed!"]);
        assert!(combo.is_empty());
        assert_eq!(enemy.health().current, 30);
    }

    #[test]
    fn evasion_is_reported() {
        let mut player = hero(50);
        let mut enemy = Combatant::builder("bat", "Bat")
            .health(10)
            .evasion(100.0, 100.0)
            .skill(Skill::simple("bite", "Bite", vec![Effect::damage(1).unwrap()]).unwrap())
            .build(&InMemoryCatalog::default())
            .unwrap();
        let mut combo = ComboStack::new();

        let result = execute_player_skill(
            &slash(),
            &mut player,
            &mut enemy,
            &mut combo,
            &mut SequenceRandom::new([0.0, 0.5]),
            &ActionOptions::default(),
        );

        assert!(!result.success);
        assert!(result.judgment.evaded);
        assert_eq!(result.messages[1], "Bat evaded Slash!");
        assert!(combo.is_empty());
        // resource was still spent
        assert_eq!(player.resource().unwrap().current, 40);
    }

    #[test]
    fn perfect_typing_unlocks_potential_and_scales_restore() {
        let skill = sure(SkillData {
            resource_restore: 10,
            potential_effects: vec![PotentialEffect {
                trigger: vec![Condition::TypingPerfect],
                effect: Effect::damage(8).unwrap(),
            }],
            ..SkillData::simple("focus", "Focus Strike", vec![Effect::damage(4).unwrap()])
        });
        let mut player = hero(20);
        let mut enemy = slime(50);
        let typing = TypingResult::rated(SpeedRating::Normal, AccuracyRating::Perfect);
        // success, evasion, two effects with their crit draws
        let mut rng = SequenceRandom::new([0.0, 0.99, 0.0, 0.99, 0.0, 0.99]);

        let result = execute_player_skill(
            &skill,
            &mut player,
            &mut enemy,
            &mut ComboStack::new(),
            &mut rng,
            &ActionOptions::typed(typing),
        );

        assert_eq!(result.judgment.effects.len(), 2);
        assert_eq!(result.total_damage, 12);
        assert_eq!(result.resource_restored, 15);
        assert_eq!(player.resource().unwrap().current, 35);
        assert!(result.messages.contains(&"Hero charges 15 resource.".to_string()));
    }

    #[test]
    fn conditional_effect_is_dropped_when_unmet() {
        let finisher = Effect::damage(50).unwrap().with_conditions(vec![Condition::Health {
            side: TargetSelector::Opponent,
            op: Comparison::Le,
            percent: 25.0,
        }]);
        let skill = sure(SkillData::simple(
            "execute",
            "Execute",
            vec![Effect::damage(2).unwrap(), finisher],
        ));
        let mut player = hero(50);
        let mut enemy = slime(100);

        let result = execute_player_skill(
            &skill,
            &mut player,
            &mut enemy,
            &mut ComboStack::new(),
            &mut clean_hit(),
            &ActionOptions::default(),
        );
        assert_eq!(result.judgment.effects.len(), 1);
        assert_eq!(enemy.health().current, 98);
    }

    #[test]
    fn statuses_and_self_heal() {
        let skill = sure(SkillData {
            target: TargetSelector::User,
            ..SkillData::simple(
                "purify",
                "Purify",
                vec![
                    Effect::new(
                        EffectKind::RemoveStatus {
                            status: "poison".into(),
                        },
                        TargetSelector::User,
                        0,
                    )
                    .unwrap(),
                    Effect::heal(20).unwrap(),
                ],
            )
        });
        let mut player = Combatant::builder("hero", "Hero")
            .health(100)
            .current_health(90)
            .skill(skill.clone())
            .build(&InMemoryCatalog::default())
            .unwrap();
        player.add_status("poison");
        let mut enemy = slime(10);
        // success, then per effect success + crit (no evasion for self skills)
        let mut rng = SequenceRandom::new([0.0, 0.0, 0.99, 0.0, 0.99]);

        let result = execute_player_skill(
            &skill,
            &mut player,
            &mut enemy,
            &mut ComboStack::new(),
            &mut rng,
            &ActionOptions::default(),
        );

        assert!(!player.has_status("poison"));
        assert_eq!(
            result.status_changes,
            [StatusChange {
                side: TargetSelector::User,
                status: "poison".into(),
                added: false,
            }]
        );
        assert_eq!(result.total_heal, 10);
        assert_eq!(player.health().current, 100);
        assert_eq!(rng.draws(), 5);
    }

    #[test]
    fn special_mode_gates_effects() {
        let surge = Effect::damage(30).unwrap().with_conditions(vec![Condition::SpecialModeGauge {
            op: Comparison::Ge,
            value: 50.0,
        }]);
        let skill = sure(SkillData::simple(
            "surge",
            "Surge",
            vec![Effect::damage(1).unwrap(), surge],
        ));
        let mut player = hero(50);
        let mut enemy = slime(100);
        let options = ActionOptions::default().with_special_mode(SpecialMode {
            kind: "overdrive".into(),
            gauge: 80.0,
        });
        // success, evasion, then success and crit for both effects
        let mut rng = SequenceRandom::new([0.0, 0.99, 0.0, 0.99, 0.0, 0.99]);

        let result = execute_player_skill(
            &skill,
            &mut player,
            &mut enemy,
            &mut ComboStack::new(),
            &mut rng,
            &options,
        );
        assert_eq!(result.total_damage, 31);
        assert_eq!(enemy.health().current, 69);
    }

    #[test]
    fn enemy_skill_ignores_resource_and_combo() {
        let mut enemy = Combatant::builder("ogre", "Ogre")
            .stats(Stats::new(10, 0, 0, 0))
            .health(40)
            .skill(slash())
            .build(&InMemoryCatalog::default())
            .unwrap();
        let mut player = hero(50);

        let result = execute_enemy_skill(
            &slash(),
            &mut enemy,
            &mut player,
            &mut clean_hit(),
            &ActionOptions::typed(TypingResult::rated(SpeedRating::Fast, AccuracyRating::Perfect)),
        );

        assert!(result.success);
        assert_eq!(player.health().current, 88);
        assert_eq!(result.resource_restored, 0);
    }
}
