//! Combat data model: combatants, skills, effects, conditions.
//!
//! Everything here is data plus construction-time validation. Records are
//! decoded through raw `*Data` structs and `TryFrom`, so a value of any of
//! these types has already passed its checks. Optional fields default to
//! "no effect".

pub mod combatant;
pub mod condition;
pub mod effect;
pub mod gauge;
pub mod skill;
pub mod typing;

pub use combatant::{
    Combatant, CombatantBuilder, CombatantData, CombatantSnapshot, DropEntry, DropTable,
};
pub use condition::{Comparison, Condition, ConditionContext, SpecialMode};
pub use effect::{Effect, EffectData, EffectKind, StatInfluence};
pub use gauge::Gauge;
pub use skill::{
    BoostKind, ComboBoost, CriticalRateSpec, PotentialEffect, Skill, SkillCategory, SkillData,
    SuccessRateSpec,
};
pub use typing::{AccuracyRating, SpeedRating, TypingModifiers, TypingResult};

use serde::{Deserialize, Serialize};

/// The four immutable combat stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Physical power.
    #[serde(default)]
    pub strength: u32,
    /// Magical power.
    #[serde(default)]
    pub willpower: u32,
    /// Speed, evasion, and skill success.
    #[serde(default)]
    pub agility: u32,
    /// Critical chance and drops.
    #[serde(default)]
    pub fortune: u32,
}

impl Stats {
    /// Create a stat block.
    pub fn new(strength: u32, willpower: u32, agility: u32, fortune: u32) -> Self {
        Self {
            strength,
            willpower,
            agility,
            fortune,
        }
    }

    /// Read one stat by kind.
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Strength => self.strength,
            StatKind::Willpower => self.willpower,
            StatKind::Agility => self.agility,
            StatKind::Fortune => self.fortune,
        }
    }
}

/// Selects one of the four stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    /// [`Stats::strength`].
    Strength,
    /// [`Stats::willpower`].
    Willpower,
    /// [`Stats::agility`].
    Agility,
    /// [`Stats::fortune`].
    Fortune,
}

impl std::fmt::Display for StatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strength => write!(f, "strength"),
            Self::Willpower => write!(f, "willpower"),
            Self::Agility => write!(f, "agility"),
            Self::Fortune => write!(f, "fortune"),
        }
    }
}

/// Who a skill or effect lands on, relative to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSelector {
    /// The other combatant.
    #[default]
    Opponent,
    /// The combatant using the skill.
    User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_lookup() {
        let stats = Stats::new(10, 20, 30, 40);
        assert_eq!(stats.get(StatKind::Strength), 10);
        assert_eq!(stats.get(StatKind::Willpower), 20);
        assert_eq!(stats.get(StatKind::Agility), 30);
        assert_eq!(stats.get(StatKind::Fortune), 40);
    }

    #[test]
    fn stats_default_missing_fields() {
        let stats: Stats = serde_json::from_str(r#"{"agility": 12}"#).unwrap();
        assert_eq!(stats, Stats::new(0, 0, 12, 0));
    }

    #[test]
    fn target_defaults_to_opponent() {
        assert_eq!(TargetSelector::default(), TargetSelector::Opponent);
        assert_eq!(StatKind::Fortune.to_string(), "fortune");
    }
}
