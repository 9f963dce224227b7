//! Skill effects.

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::{StatKind, TargetSelector};
use crate::error::{EngineError, EngineResult, check_rate};

/// What an effect does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Reduce the target's health.
    Damage,
    /// Restore the target's health.
    Heal,
    /// Apply a status marker.
    AddStatus {
        /// Status id.
        status: String,
    },
    /// Clear a status marker.
    RemoveStatus {
        /// Status id.
        status: String,
    },
}

impl EffectKind {
    /// True for [`EffectKind::AddStatus`] and [`EffectKind::RemoveStatus`].
    pub fn is_status(&self) -> bool {
        matches!(self, Self::AddStatus { .. } | Self::RemoveStatus { .. })
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Damage => write!(f, "damage"),
            Self::Heal => write!(f, "heal"),
            Self::AddStatus { status } => write!(f, "add {status}"),
            Self::RemoveStatus { status } => write!(f, "remove {status}"),
        }
    }
}

/// Scales an effect's power by one of the user's stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatInfluence {
    /// Stat to read.
    pub stat: StatKind,
    /// Power added per stat point.
    pub rate: f64,
}

/// Raw effect record as it appears in skill data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectData {
    /// Effect kind (flattened `type` tag).
    #[serde(flatten)]
    pub kind: EffectKind,
    /// Who the effect lands on.
    #[serde(default)]
    pub target: TargetSelector,
    /// Base power before stat influence.
    #[serde(default)]
    pub power: i64,
    /// Optional stat influence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_influence: Option<StatInfluence>,
    /// Chance for the effect to land once the skill hits.
    #[serde(default = "full_rate")]
    pub success_rate: f64,
    /// All must hold for the effect to fire. Empty means always.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

fn full_rate() -> f64 {
    100.0
}

/// A validated effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EffectData", into = "EffectData")]
pub struct Effect {
    pub(crate) kind: EffectKind,
    pub(crate) target: TargetSelector,
    pub(crate) power: u32,
    pub(crate) stat_influence: Option<StatInfluence>,
    pub(crate) success_rate: f64,
    pub(crate) conditions: Vec<Condition>,
}

impl Effect {
    /// Create an effect with full success rate, no influence, and no conditions.
    pub fn new(kind: EffectKind, target: TargetSelector, power: i64) -> EngineResult<Self> {
        Self::try_from(EffectData {
            kind,
            target,
            power,
            stat_influence: None,
            success_rate: full_rate(),
            conditions: Vec::new(),
        })
    }

    /// Shorthand for a damage effect on the opponent.
    pub fn damage(power: i64) -> EngineResult<Self> {
        Self::new(EffectKind::Damage, TargetSelector::Opponent, power)
    }

    /// Shorthand for a heal effect on the user.
    pub fn heal(power: i64) -> EngineResult<Self> {
        Self::new(EffectKind::Heal, TargetSelector::User, power)
    }

    /// Add a stat influence.
    pub fn with_influence(mut self, stat: StatKind, rate: f64) -> Self {
        self.stat_influence = Some(StatInfluence { stat, rate });
        self
    }

    /// Set the success rate, rejecting values outside 0..=100.
    pub fn with_success_rate(mut self, rate: f64) -> EngineResult<Self> {
        self.success_rate = check_rate(|| format!("{} effect success_rate", self.kind), rate)?;
        Ok(self)
    }

    /// Gate the effect behind conditions.
    pub fn with_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = conditions;
        self
    }

    /// Effect kind.
    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Who the effect lands on.
    pub fn target(&self) -> TargetSelector {
        self.target
    }

    /// Base power before stat influence.
    pub fn power(&self) -> u32 {
        self.power
    }

    /// Stat influence, if any.
    pub fn stat_influence(&self) -> Option<&StatInfluence> {
        self.stat_influence.as_ref()
    }

    /// Chance to land (0–100).
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// Gating conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

impl TryFrom<EffectData> for Effect {
    type Error = EngineError;

    fn try_from(data: EffectData) -> EngineResult<Self> {
        if data.power < 0 {
            return Err(EngineError::NegativePower {
                field: format!("{} effect", data.kind),
                power: data.power,
            });
        }
        let power = u32::try_from(data.power).map_err(|_| EngineError::PowerOutOfRange {
            field: format!("{} effect", data.kind),
            power: data.power,
        })?;
        let kind = data.kind;
        let success_rate = check_rate(|| format!("{kind} effect success_rate"), data.success_rate)?;
        for condition in &data.conditions {
            if let Condition::Health { percent, .. } = condition {
                check_rate(|| format!("{kind} effect health condition"), *percent)?;
            }
        }
        Ok(Self {
            power,
            kind,
            target: data.target,
            stat_influence: data.stat_influence,
            success_rate,
            conditions: data.conditions,
        })
    }
}

impl From<Effect> for EffectData {
    fn from(effect: Effect) -> Self {
        Self {
            kind: effect.kind,
            target: effect.target,
            power: i64::from(effect.power),
            stat_influence: effect.stat_influence,
            success_rate: effect.success_rate,
            conditions: effect.conditions,
        }
    }
}
