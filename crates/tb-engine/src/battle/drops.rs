//! Post-victory drop rolls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::DropTable;
use crate::rng::{RandomSource, roll_percent};

/// One side of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The typing player.
    Player,
    /// The computer-controlled enemy.
    Enemy,
}

impl Side {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy => write!(f, "enemy"),
        }
    }
}

/// Terminal result of a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Winning side.
    pub winner: Side,
    /// Summary line for the driver to show.
    pub message: String,
    /// Turn on which the battle ended.
    pub turns: u32,
    /// Name of the defeated enemy, on a player victory.
    pub defeated_enemy: Option<String>,
    /// Item ids awarded; filled by the drop roll.
    pub drops: Vec<String>,
}

/// Roll a drop table.
///
/// One aggregate draw against `base_rate` gates everything. When it passes,
/// each entry is rolled independently against its own rate, in table order.
pub fn roll_drops(table: &DropTable, base_rate: f64, rng: &mut dyn RandomSource) -> Vec<String> {
    if table.is_empty() {
        return Vec::new();
    }
    let gate = roll_percent(rng, base_rate);
    debug!(rate = base_rate, passed = gate, "drop gate");
    if !gate {
        return Vec::new();
    }
    table
        .entries()
        .iter()
        .filter(|entry| {
            let dropped = roll_percent(rng, entry.rate);
            debug!(item = %entry.item_id, rate = entry.rate, dropped, "drop entry");
            dropped
        })
        .map(|entry| entry.item_id.clone())
        .collect()
}
