//! Configuration for a battle encounter.

/// Configuration for a battle session.
#[derive(Debug, Clone)]
pub struct BattleConfig {
    /// RNG seed for reproducible encounters.
    pub seed: u64,
    /// World level feeding the drop-rate formula (at least 1).
    pub world_level: u32,
    /// Turn cap for automated drivers. The engine itself never ends a battle on it.
    pub max_turns: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_level: 1,
            max_turns: 200,
        }
    }
}

impl BattleConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the world level (clamped to at least 1).
    pub fn with_world_level(mut self, level: u32) -> Self {
        self.world_level = level.max(1);
        self
    }

    /// Set the turn cap (clamped to at least 1).
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns.max(1);
        self
    }
}
