//! Probability engine: rate formulas and the three-layer judgment.
//!
//! Every rate is a percentage in `0..=100`. Stat-driven rates are linear
//! (`base + stat / divisor`) and clamped to a fixed band:
//!
//! | rate      | formula                         | band   |
//! |-----------|---------------------------------|--------|
//! | hit       | `80 + agility / 10`             | 50–100 |
//! | evade     | `5 + agility / 10`              | 5–30   |
//! | critical  | `5 + fortune / 10`              | 5–25   |
//! | drop      | `30 + fortune / 5 + world_level`| 30–80  |
//!
//! Skill success uses one canonical formula:
//! `base + agility * agility_influence + (speed_score - 100) * typing_influence`,
//! clamped to 10–100.

pub mod conditions;
pub mod judgment;

pub use conditions::{is_effect_conditions_met, merge_potential_effects};
pub use judgment::{EffectOutcome, JudgmentResult, execute_three_layer_judgment, is_skill_evaded};

use crate::model::{
    AccuracyRating, CriticalRateSpec, SpeedRating, StatInfluence, Stats, SuccessRateSpec,
};

/// Power multiplier applied to an effect on a critical roll.
pub const CRITICAL_POWER_MULTIPLIER: f64 = 1.5;
/// Multiplier [`calculate_damage`] applies on a critical hit.
pub const CRITICAL_DAMAGE_MULTIPLIER: f64 = 1.2;

/// Hit rate band.
pub const HIT_RATE_BAND: (f64, f64) = (50.0, 100.0);
/// Evade rate band.
pub const EVADE_RATE_BAND: (f64, f64) = (5.0, 30.0);
/// Base critical rate band.
pub const CRITICAL_RATE_BAND: (f64, f64) = (5.0, 25.0);
/// Drop rate band.
pub const DROP_RATE_BAND: (f64, f64) = (30.0, 80.0);
/// Skill success band.
pub const SKILL_SUCCESS_BAND: (f64, f64) = (10.0, 100.0);
/// Skill critical cap when typing accuracy scales the rate.
pub const TYPED_CRITICAL_CAP: f64 = 95.0;

/// Speed score neutral point; also used when there was no typing.
pub const NEUTRAL_SPEED_SCORE: f64 = 100.0;

/// Speed score table: Fast 150, Normal 120, Slow 80, Miss 60.
pub fn speed_score(speed: SpeedRating) -> f64 {
    match speed {
        SpeedRating::Fast => 150.0,
        SpeedRating::Normal => 120.0,
        SpeedRating::Slow => 80.0,
        SpeedRating::Miss => 60.0,
    }
}

/// Critical multiplier table: Perfect 2.0, Good 1.5, Poor 0.8.
pub fn accuracy_critical_multiplier(accuracy: AccuracyRating) -> f64 {
    match accuracy {
        AccuracyRating::Perfect => 2.0,
        AccuracyRating::Good => 1.5,
        AccuracyRating::Poor => 0.8,
    }
}

/// Resource restore multiplier: Perfect 1.5, Good 1.0, Poor 0.5.
pub fn accuracy_restore_multiplier(accuracy: AccuracyRating) -> f64 {
    match accuracy {
        AccuracyRating::Perfect => 1.5,
        AccuracyRating::Good => 1.0,
        AccuracyRating::Poor => 0.5,
    }
}

fn clamp_band(value: f64, band: (f64, f64)) -> f64 {
    value.clamp(band.0, band.1)
}

/// Fallback skill-success rate from agility.
pub fn calculate_hit_rate(agility: u32) -> f64 {
    clamp_band(80.0 + f64::from(agility) / 10.0, HIT_RATE_BAND)
}

/// Evasion rate from a stat (agility for physical, willpower for magical).
pub fn calculate_evade_rate(stat: u32) -> f64 {
    clamp_band(5.0 + f64::from(stat) / 10.0, EVADE_RATE_BAND)
}

/// Fallback critical rate from fortune.
pub fn calculate_critical_rate(fortune: u32) -> f64 {
    clamp_band(5.0 + f64::from(fortune) / 10.0, CRITICAL_RATE_BAND)
}

/// Aggregate drop rate from fortune and world level.
pub fn calculate_drop_rate(fortune: u32, world_level: u32) -> f64 {
    clamp_band(
        30.0 + f64::from(fortune) / 5.0 + f64::from(world_level),
        DROP_RATE_BAND,
    )
}

/// Skill-success rate from a spec, the user's agility, and the typing speed.
pub fn calculate_skill_success_rate(
    spec: &SuccessRateSpec,
    agility: u32,
    speed: Option<SpeedRating>,
) -> f64 {
    let score = speed.map_or(NEUTRAL_SPEED_SCORE, speed_score);
    let rate = spec.base
        + f64::from(agility) * spec.agility_influence
        + (score - NEUTRAL_SPEED_SCORE) * spec.typing_influence;
    clamp_band(rate, SKILL_SUCCESS_BAND)
}

/// Effect power: `floor(base + stat * rate)` with an influence, else `base`.
/// Never negative.
pub fn calculate_effect_power(base: u32, stats: &Stats, influence: Option<&StatInfluence>) -> u32 {
    match influence {
        Some(inf) => {
            let power = f64::from(base) + f64::from(stats.get(inf.stat)) * inf.rate;
            power.floor().max(0.0) as u32
        }
        None => base,
    }
}

/// Skill critical rate.
///
/// Without typing: `base + fortune * fortune_influence`, clamped 0–100.
/// With an accuracy rating the raw rate is scaled by the accuracy multiplier
/// and by `1 + agility / 200`, then clamped 0–95.
pub fn calculate_skill_critical_rate(
    spec: &CriticalRateSpec,
    fortune: u32,
    agility: u32,
    accuracy: Option<AccuracyRating>,
) -> f64 {
    let raw = spec.base + f64::from(fortune) * spec.fortune_influence;
    match accuracy {
        Some(rating) => {
            let agility_bonus = 1.0 + f64::from(agility) / 200.0;
            (raw * accuracy_critical_multiplier(rating) * agility_bonus).clamp(0.0, TYPED_CRITICAL_CAP)
        }
        None => raw.clamp(0.0, 100.0),
    }
}

/// Stat-vs-defense damage: `(attack - defense / 2) * multiplier`, times
/// [`CRITICAL_DAMAGE_MULTIPLIER`] on a critical, floored, never below 1.
pub fn calculate_damage(attack: u32, defense: u32, multiplier: f64, critical: bool) -> u32 {
    let mut damage = (f64::from(attack) - f64::from(defense) / 2.0) * multiplier;
    if critical {
        damage *= CRITICAL_DAMAGE_MULTIPLIER;
    }
    damage.floor().max(1.0) as u32
}

/// Resource restored on use, scaled by typing accuracy and floored.
pub fn calculate_resource_restore(base: u32, accuracy: Option<AccuracyRating>) -> u32 {
    let multiplier = accuracy.map_or(1.0, accuracy_restore_multiplier);
    (f64::from(base) * multiplier).floor() as u32
}
