//! Typing minigame results as seen by the engine.
//!
//! The minigame itself lives outside the engine; only its ratings feed
//! skill success, critical chance, and resource restore.

use serde::{Deserialize, Serialize};

/// How fast the prompt was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedRating {
    /// Well under the time limit.
    Fast,
    /// Within the time limit.
    Normal,
    /// Barely within the time limit.
    Slow,
    /// Timed out or abandoned.
    Miss,
}

impl SpeedRating {
    /// Ordering rank used by comparison conditions (Miss lowest).
    pub fn rank(self) -> u8 {
        match self {
            Self::Miss => 0,
            Self::Slow => 1,
            Self::Normal => 2,
            Self::Fast => 3,
        }
    }
}

impl std::fmt::Display for SpeedRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Normal => write!(f, "normal"),
            Self::Slow => write!(f, "slow"),
            Self::Miss => write!(f, "miss"),
        }
    }
}

/// How accurately the prompt was typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyRating {
    /// No mistakes.
    Perfect,
    /// A few mistakes.
    Good,
    /// Many mistakes.
    Poor,
}

impl AccuracyRating {
    /// Ordering rank used by comparison conditions (Poor lowest).
    pub fn rank(self) -> u8 {
        match self {
            Self::Poor => 0,
            Self::Good => 1,
            Self::Perfect => 2,
        }
    }
}

impl std::fmt::Display for AccuracyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Perfect => write!(f, "perfect"),
            Self::Good => write!(f, "good"),
            Self::Poor => write!(f, "poor"),
        }
    }
}

/// Outcome reported by the typing minigame for one skill use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingResult {
    /// Speed rating.
    pub speed_rating: SpeedRating,
    /// Accuracy rating; absent when the attempt produced no usable input.
    #[serde(default)]
    pub accuracy_rating: Option<AccuracyRating>,
    /// Combined score reported by the minigame.
    #[serde(default)]
    pub total_rating: f64,
    /// Fraction of correct keystrokes (0.0 to 1.0).
    #[serde(default)]
    pub accuracy: f64,
    /// Whether the prompt was completed.
    #[serde(default)]
    pub is_success: bool,
}

impl TypingResult {
    /// Build a completed result from two ratings.
    pub fn rated(speed: SpeedRating, accuracy: AccuracyRating) -> Self {
        let accuracy_fraction = match accuracy {
            AccuracyRating::Perfect => 1.0,
            AccuracyRating::Good => 0.9,
            AccuracyRating::Poor => 0.6,
        };
        Self {
            speed_rating: speed,
            accuracy_rating: Some(accuracy),
            total_rating: accuracy_fraction * 100.0,
            accuracy: accuracy_fraction,
            is_success: speed != SpeedRating::Miss,
        }
    }

    /// True when accuracy was perfect and the prompt was completed.
    pub fn is_perfect(&self) -> bool {
        self.is_success && self.accuracy_rating == Some(AccuracyRating::Perfect)
    }

    /// The ratings the probability engine consumes.
    pub fn modifiers(&self) -> TypingModifiers {
        TypingModifiers {
            speed: Some(self.speed_rating),
            accuracy: self.accuracy_rating,
        }
    }
}

/// Typing ratings passed into a judgment. Both absent for enemy actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypingModifiers {
    /// Speed rating, if a typing attempt happened.
    pub speed: Option<SpeedRating>,
    /// Accuracy rating, if a typing attempt happened.
    pub accuracy: Option<AccuracyRating>,
}

impl TypingModifiers {
    /// No typing attempt (enemy actions, or a driver without the minigame).
    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_ordered() {
        assert!(SpeedRating::Fast.rank() > SpeedRating::Normal.rank());
        assert!(SpeedRating::Slow.rank() > SpeedRating::Miss.rank());
        assert!(AccuracyRating::Perfect.rank() > AccuracyRating::Good.rank());
        assert!(AccuracyRating::Good.rank() > AccuracyRating::Poor.rank());
    }

    #[test]
    fn rated_result() {
        let result = TypingResult::rated(SpeedRating::Fast, AccuracyRating::Perfect);
        assert!(result.is_perfect());
        assert_eq!(
            result.modifiers(),
            TypingModifiers {
                speed: Some(SpeedRating::Fast),
                accuracy: Some(AccuracyRating::Perfect)
            }
        );

        let missed = TypingResult::rated(SpeedRating::Miss, AccuracyRating::Perfect);
        assert!(!missed.is_perfect());
    }

    #[test]
    fn deserializes_camel_case_with_optional_accuracy() {
        let json = r#"{"speedRating":"slow","totalRating":40.0,"accuracy":0.5,"isSuccess":true}"#;
        let result: TypingResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.speed_rating, SpeedRating::Slow);
        assert_eq!(result.accuracy_rating, None);
        assert!(!result.is_perfect());
    }

    #[test]
    fn display() {
        assert_eq!(SpeedRating::Normal.to_string(), "normal");
        assert_eq!(AccuracyRating::Poor.to_string(), "poor");
    }
}
