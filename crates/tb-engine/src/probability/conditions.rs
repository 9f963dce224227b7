//! Condition evaluation and potential-effect merging.

use crate::model::{
    Comparison, Condition, ConditionContext, Effect, PotentialEffect, TargetSelector,
};

fn compare<T: PartialOrd>(op: Comparison, lhs: T, rhs: T) -> bool {
    match op {
        Comparison::Eq => lhs == rhs,
        Comparison::Ne => lhs != rhs,
        Comparison::Lt => lhs < rhs,
        Comparison::Le => lhs <= rhs,
        Comparison::Gt => lhs > rhs,
        Comparison::Ge => lhs >= rhs,
    }
}

/// Evaluate one condition. Conditions on typing or a special mode are false
/// when that input is absent.
pub fn is_condition_met(condition: &Condition, ctx: &ConditionContext) -> bool {
    match condition {
        Condition::TypingAccuracy { op, value } => ctx
            .accuracy
            .is_some_and(|actual| compare(*op, actual.rank(), value.rank())),
        Condition::TypingSpeed { op, value } => ctx
            .speed
            .is_some_and(|actual| compare(*op, actual.rank(), value.rank())),
        Condition::TypingPerfect => ctx.typing_perfect,
        Condition::Health { side, op, percent } => {
            let actual = match side {
                TargetSelector::User => ctx.user_health_percent,
                TargetSelector::Opponent => ctx.opponent_health_percent,
            };
            compare(*op, actual, *percent)
        }
        Condition::SpecialModeActive { active } => ctx.special_mode.is_some() == *active,
        Condition::SpecialModeKind { op, kind } => ctx
            .special_mode
            .as_ref()
            .is_some_and(|mode| compare(*op, mode.kind.as_str(), kind.as_str())),
        Condition::SpecialModeGauge { op, value } => ctx
            .special_mode
            .as_ref()
            .is_some_and(|mode| compare(*op, mode.gauge, *value)),
    }
}

/// True when every condition holds. An empty list always holds.
pub fn is_effect_conditions_met(conditions: &[Condition], ctx: &ConditionContext) -> bool {
    conditions.iter().all(|c| is_condition_met(c, ctx))
}

/// Base effects followed by every potential effect whose trigger holds,
/// in insertion order. Base effects are never replaced.
pub fn merge_potential_effects(
    base: &[Effect],
    potentials: &[PotentialEffect],
    ctx: &ConditionContext,
) -> Vec<Effect> {
    base.iter()
        .cloned()
        .chain(
            potentials
                .iter()
                .filter(|p| is_effect_conditions_met(&p.trigger, ctx))
                .map(|p| p.effect.clone()),
        )
        .collect()
}
