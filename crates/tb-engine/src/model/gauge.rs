//! Health and resource pools.
//!
//! A gauge is a clamped value between 0 and a fixed maximum. Combatant
//! health and resource both use it; only `current` moves after construction.

use serde::{Deserialize, Serialize};

/// A numeric pool clamped to `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gauge {
    /// Current value.
    pub current: u32,
    /// Maximum value.
    pub max: u32,
}

impl Gauge {
    /// Create a gauge starting full.
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Create a gauge with a starting value, clamped to the maximum.
    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Adjust by a delta, clamping to bounds. Returns the amount actually applied.
    pub fn adjust(&mut self, delta: i64) -> i64 {
        let before = i64::from(self.current);
        let after = (before + delta).clamp(0, i64::from(self.max));
        self.current = after as u32;
        after - before
    }

    /// Subtract up to `amount`. Returns the amount removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }

    /// Add up to `amount` without exceeding the maximum. Returns the amount added.
    pub fn fill(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.max - self.current);
        self.current += added;
        added
    }

    /// Returns true if the gauge is at zero.
    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Returns true if the gauge is at its maximum.
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Filled fraction (0.0 to 1.0). A zero-max gauge reads as empty.
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(self.max)
    }

    /// Filled percentage (0.0 to 100.0).
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }
}

impl std::fmt::Display for Gauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}
