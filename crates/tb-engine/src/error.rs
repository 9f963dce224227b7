//! Error types for the combat engine.
//!
//! Gameplay outcomes such as misses, evasions, or an empty resource pool
//! are not errors; they come back as ordinary results. Everything here is
//! either invalid data rejected at construction time or a caller driving a
//! battle session in the wrong order.

/// Errors that can occur while building or driving combat state.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A combatant level below 1 or beyond `u32`.
    #[error("invalid level {level} for '{name}': must be within 1..={max}", max = u32::MAX)]
    InvalidLevel {
        /// Combatant name.
        name: String,
        /// The rejected level.
        level: i64,
    },

    /// A percentage field outside 0..=100.
    #[error("{field} must be within 0..=100, got {value}")]
    RateOutOfRange {
        /// Which field was rejected (e.g. `skill 'fireball' effect #0 success_rate`).
        field: String,
        /// The rejected value.
        value: f64,
    },

    /// A skill declared without any effects.
    #[error("skill '{0}' has no effects")]
    EmptyEffects(String),

    /// A damage or heal effect with negative base power.
    #[error("{field} has negative base power {power}")]
    NegativePower {
        /// Which effect was rejected.
        field: String,
        /// The rejected power.
        power: i64,
    },

    /// A damage or heal effect whose base power does not fit in a `u32`.
    #[error("{field} has base power {power} above the maximum {max}", max = u32::MAX)]
    PowerOutOfRange {
        /// Which effect was rejected.
        field: String,
        /// The rejected power.
        power: i64,
    },

    /// A typing difficulty below 1.
    #[error("skill '{skill}' has invalid typing difficulty {difficulty}")]
    InvalidTypingDifficulty {
        /// Skill id.
        skill: String,
        /// The rejected difficulty.
        difficulty: i64,
    },

    /// A health or resource pool whose maximum is not positive.
    #[error("{0} must have a positive maximum")]
    InvalidGauge(String),

    /// A skill id that the catalog does not know.
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    /// The catalog's fallback skill could not be resolved.
    #[error("fallback skill '{0}' is missing from the catalog")]
    NoFallbackSkill(String),

    /// `start()` was called on a session that has already started.
    #[error("battle already started")]
    AlreadyStarted,

    /// A turn query or action was issued before `start()`.
    #[error("battle has not started")]
    NotStarted,

    /// An action was issued after the battle ended.
    #[error("battle has already ended")]
    BattleEnded,

    /// The side that tried to act is not the current actor.
    #[error("it is not the {0} turn")]
    NotYourTurn(&'static str),

    /// Drops were requested without a recorded player victory.
    #[error("drops are only rolled after a player victory")]
    NoPlayerVictory,

    /// Skill, combatant, or snapshot JSON failed to decode.
    #[error("data error: {0}")]
    Data(#[from] serde_json::Error),
}

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Reject a percentage that falls outside 0..=100.
pub(crate) fn check_rate(field: impl FnOnce() -> String, value: f64) -> EngineResult<f64> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::RateOutOfRange {
            field: field(),
            value,
        })
    }
}
