//! Conditions gating effects and potential effects.
//!
//! A condition compares one field of a [`ConditionContext`] against a
//! literal. Evaluation lives in [`crate::probability::conditions`].

use serde::{Deserialize, Serialize};

use super::TargetSelector;
use super::typing::{AccuracyRating, SpeedRating};

/// Comparison operator. Defaults to equality when omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Equal.
    #[default]
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "{symbol}")
    }
}

/// A typed predicate over a [`ConditionContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Compare the typing accuracy rating. False when there was no typing.
    TypingAccuracy {
        /// Operator (ratings compare by rank).
        #[serde(default)]
        op: Comparison,
        /// Rating to compare against.
        value: AccuracyRating,
    },
    /// Compare the typing speed rating. False when there was no typing.
    TypingSpeed {
        /// Operator (ratings compare by rank).
        #[serde(default)]
        op: Comparison,
        /// Rating to compare against.
        value: SpeedRating,
    },
    /// The typing attempt was perfect.
    TypingPerfect,
    /// Compare a side's health percentage (0–100).
    Health {
        /// Whose health to read.
        side: TargetSelector,
        /// Operator.
        #[serde(default)]
        op: Comparison,
        /// Threshold percentage.
        percent: f64,
    },
    /// Whether a special mode is active.
    SpecialModeActive {
        /// Expected state.
        active: bool,
    },
    /// Compare the active special mode's kind. False when no mode is active.
    SpecialModeKind {
        /// Operator.
        #[serde(default)]
        op: Comparison,
        /// Mode kind to compare against.
        kind: String,
    },
    /// Compare the active special mode's gauge. False when no mode is active.
    SpecialModeGauge {
        /// Operator.
        #[serde(default)]
        op: Comparison,
        /// Gauge threshold.
        value: f64,
    },
}

/// A driver-defined special mode (e.g. an overdrive state) and its gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialMode {
    /// Mode kind.
    pub kind: String,
    /// Current gauge value.
    pub gauge: f64,
}

/// Runtime facts that conditions are evaluated against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionContext {
    /// Typing speed rating, if the user typed.
    pub speed: Option<SpeedRating>,
    /// Typing accuracy rating, if the user typed.
    pub accuracy: Option<AccuracyRating>,
    /// Whether the typing attempt was perfect.
    pub typing_perfect: bool,
    /// The user's health percentage.
    pub user_health_percent: f64,
    /// The opponent's health percentage.
    pub opponent_health_percent: f64,
    /// The active special mode, if any.
    pub special_mode: Option<SpecialMode>,
}
