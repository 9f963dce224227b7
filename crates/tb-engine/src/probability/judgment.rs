//! Three-layer judgment: skill success, then evasion, then each effect.
//!
//! Each layer draws independently from the [`RandomSource`]. A failed skill
//! roll or a successful evasion short-circuits; no later draws happen.

use tracing::debug;

use super::{
    CRITICAL_POWER_MULTIPLIER, SKILL_SUCCESS_BAND, calculate_critical_rate,
    calculate_effect_power, calculate_hit_rate, calculate_skill_critical_rate,
    calculate_skill_success_rate,
};
use crate::model::{
    Combatant, CriticalRateSpec, EffectKind, Skill, SkillCategory, SpeedRating, Stats,
    TargetSelector, TypingModifiers,
};
use crate::rng::{RandomSource, roll_percent};

/// Outcome of one effect within a judgment.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutcome {
    /// Position in the judged skill's effect list.
    pub index: usize,
    /// Effect kind.
    pub kind: EffectKind,
    /// Who the effect lands on.
    pub target: TargetSelector,
    /// Whether the effect's own roll succeeded.
    pub success: bool,
    /// Final power (0 when the effect failed).
    pub power: u32,
    /// Whether the critical roll succeeded.
    pub critical: bool,
}

/// Result of judging one skill use.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JudgmentResult {
    /// The skill-success layer passed.
    pub skill_success: bool,
    /// The target evaded.
    pub evaded: bool,
    /// Per-effect outcomes in declaration order; empty on failure or evasion.
    pub effects: Vec<EffectOutcome>,
    /// Sum of successful damage effect power.
    pub total_damage: u32,
    /// Any effect rolled a critical.
    pub is_critical: bool,
}

impl JudgmentResult {
    /// Zeroed result for a failed skill roll.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Zeroed result for an evaded skill.
    pub fn evaded() -> Self {
        Self {
            skill_success: true,
            evaded: true,
            ..Self::default()
        }
    }

    /// True when the skill succeeded and was not evaded.
    pub fn landed(&self) -> bool {
        self.skill_success && !self.evaded
    }
}

/// Roll the target's evasion for a skill category. One draw.
pub fn is_skill_evaded(
    category: SkillCategory,
    target: &Combatant,
    rng: &mut dyn RandomSource,
) -> bool {
    roll_percent(rng, target.evasion_against(category))
}

/// Success rate for a skill: its spec (or the user's hit rate when it has
/// none) plus any flat bonus, clamped to the success band.
pub fn skill_success_rate(skill: &Skill, stats: &Stats, speed: Option<SpeedRating>) -> f64 {
    let base = match skill.success_rate() {
        Some(spec) => calculate_skill_success_rate(spec, stats.agility, speed),
        None => calculate_hit_rate(stats.agility),
    };
    (base + skill.success_bonus()).clamp(SKILL_SUCCESS_BAND.0, SKILL_SUCCESS_BAND.1)
}

/// Critical rate for a skill: its spec, or the user's base critical rate.
pub fn skill_critical_rate(skill: &Skill, stats: &Stats, modifiers: TypingModifiers) -> f64 {
    let fallback;
    let spec = match skill.critical_rate() {
        Some(spec) => spec,
        None => {
            fallback = CriticalRateSpec {
                base: calculate_critical_rate(stats.fortune),
                fortune_influence: 0.0,
            };
            &fallback
        }
    };
    calculate_skill_critical_rate(spec, stats.fortune, stats.agility, modifiers.accuracy)
}

/// Judge a skill use against a target.
///
/// Draw order: one skill-success draw; one evasion draw when the skill is
/// aimed at the opponent; then per effect, one success draw and, on
/// success, one critical draw.
///
/// Self-targeted skills skip the evasion layer entirely, so a replayed
/// draw sequence has one fewer value for them than for attacks.
pub fn execute_three_layer_judgment(
    skill: &Skill,
    target: &Combatant,
    attacker_stats: &Stats,
    modifiers: TypingModifiers,
    rng: &mut dyn RandomSource,
) -> JudgmentResult {
    let success_rate = skill_success_rate(skill, attacker_stats, modifiers.speed);
    let success = roll_percent(rng, success_rate);
    debug!(skill = skill.id(), rate = success_rate, success, "skill success layer");
    if !success {
        return JudgmentResult::failed();
    }

    if skill.target() == TargetSelector::Opponent {
        let evaded = is_skill_evaded(skill.category(), target, rng);
        debug!(
            skill = skill.id(),
            rate = target.evasion_against(skill.category()),
            evaded,
            "evasion layer"
        );
        if evaded {
            return JudgmentResult::evaded();
        }
    }

    let critical_rate = skill_critical_rate(skill, attacker_stats, modifiers);
    let mut result = JudgmentResult {
        skill_success: true,
        ..JudgmentResult::default()
    };

    for (index, effect) in skill.effects().iter().enumerate() {
        let landed = roll_percent(rng, effect.success_rate());
        let mut outcome = EffectOutcome {
            index,
            kind: effect.kind().clone(),
            target: effect.target(),
            success: landed,
            power: 0,
            critical: false,
        };
        if landed {
            let power =
                calculate_effect_power(effect.power(), attacker_stats, effect.stat_influence());
            outcome.critical = roll_percent(rng, critical_rate);
            outcome.power = if outcome.critical {
                (f64::from(power) * CRITICAL_POWER_MULTIPLIER).floor() as u32
            } else {
                power
            };
            if outcome.kind == EffectKind::Damage {
                result.total_damage = result.total_damage.saturating_add(outcome.power);
            }
            result.is_critical |= outcome.critical;
        }
        debug!(
            skill = skill.id(),
            index,
            kind = %outcome.kind,
            success = outcome.success,
            power = outcome.power,
            critical = outcome.critical,
            "effect layer"
        );
        result.effects.push(outcome);
    }

    result
}
