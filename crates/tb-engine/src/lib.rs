//! Combat resolution engine for typing battles.
//!
//! Resolves one skill use at a time through a three-layer probability
//! judgment (skill success, evasion, per-effect outcome), applies combo
//! boosts carried between skill uses, and runs a turn-based battle session
//! with win/loss detection and post-victory drops.
//!
//! Every random draw goes through a [`RandomSource`]; pass a
//! [`SequenceRandom`] to make outcomes exact, or a [`SeededRandom`] to make
//! them reproducible. Skill data comes from an injected [`SkillCatalog`].

pub mod battle;
pub mod catalog;
pub mod combo;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod probability;
pub mod rng;
pub mod validate;

pub use battle::{BattleOutcome, BattlePhase, BattleSession, Side};
pub use catalog::{InMemoryCatalog, SkillCatalog};
pub use combo::{ComboBoostEntry, ComboStack};
pub use config::BattleConfig;
pub use error::{EngineError, EngineResult};
pub use executor::{ActionOptions, ExecutionResult, StatusChange};
pub use model::{Combatant, CombatantSnapshot, Effect, Skill, TypingResult};
pub use probability::{JudgmentResult, execute_three_layer_judgment};
pub use rng::{RandomSource, SeededRandom, SequenceRandom};
pub use validate::{ValidationIssue, validate_catalog, validate_catalog_json};
