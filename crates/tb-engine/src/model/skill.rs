//! Skills, rate specs, combo boosts, and potential effects.

use serde::{Deserialize, Serialize};

use super::TargetSelector;
use super::condition::Condition;
use super::effect::Effect;
use crate::error::{EngineError, EngineResult, check_rate};

/// Which evasion rate a skill is tested against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    /// Tested against physical evasion.
    #[default]
    Physical,
    /// Tested against magical evasion.
    Magical,
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Physical => write!(f, "physical"),
            Self::Magical => write!(f, "magical"),
        }
    }
}

/// Inputs to the skill-success formula.
///
/// `base + agility * agility_influence + (speed_score - 100) * typing_influence`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessRateSpec {
    /// Base success percentage.
    pub base: f64,
    /// Percentage points per agility point.
    #[serde(default)]
    pub agility_influence: f64,
    /// Percentage points per speed-score point above 100.
    #[serde(default)]
    pub typing_influence: f64,
}

/// Inputs to the skill-critical formula: `base + fortune * fortune_influence`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalRateSpec {
    /// Base critical percentage.
    pub base: f64,
    /// Percentage points per fortune point.
    #[serde(default)]
    pub fortune_influence: f64,
}

/// Kinds of temporary combo boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostKind {
    /// Subtract from resource cost (floor 0).
    ResourceCostReduction,
    /// Subtract from typing difficulty (floor 1).
    TypingDifficultyReduction,
    /// Add to the skill-success rate.
    SkillSuccessAdd,
    /// Add to every status effect's success rate.
    StatusSuccessAdd,
    /// Scale damage effect power by `1 + value`.
    DamageMultiplier,
    /// Scale heal effect power by `1 + value`.
    HealMultiplier,
    /// Unlock every potential effect regardless of its trigger.
    PotentialUnlock,
}

impl std::fmt::Display for BoostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ResourceCostReduction => "cost down",
            Self::TypingDifficultyReduction => "difficulty down",
            Self::SkillSuccessAdd => "success up",
            Self::StatusSuccessAdd => "status success up",
            Self::DamageMultiplier => "damage up",
            Self::HealMultiplier => "heal up",
            Self::PotentialUnlock => "potential unlocked",
        };
        write!(f, "{label}")
    }
}

/// A combo boost a skill grants when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboBoost {
    /// Boost kind.
    pub kind: BoostKind,
    /// Magnitude (flat amount, percentage points, or multiplier fraction).
    #[serde(default)]
    pub value: f64,
    /// Number of skill uses the boost lasts.
    #[serde(default = "one_use")]
    pub duration: u32,
}

fn one_use() -> u32 {
    1
}

impl ComboBoost {
    /// A boost lasting one use.
    pub fn once(kind: BoostKind, value: f64) -> Self {
        Self {
            kind,
            value,
            duration: 1,
        }
    }
}

/// An effect appended to a skill only when its trigger holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialEffect {
    /// All must hold for the effect to be appended.
    #[serde(default)]
    pub trigger: Vec<Condition>,
    /// The effect to append.
    pub effect: Effect,
}

/// Raw skill record as it appears in catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillData {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Evasion category.
    #[serde(default)]
    pub category: SkillCategory,
    /// Resource spent on use.
    #[serde(default)]
    pub resource_cost: u32,
    /// Resource regained on a successful use.
    #[serde(default)]
    pub resource_restore: u32,
    /// Turn actions consumed.
    #[serde(default = "one_action")]
    pub action_cost: u32,
    /// Who the skill is aimed at.
    #[serde(default)]
    pub target: TargetSelector,
    /// Typing prompt difficulty (at least 1).
    #[serde(default = "one_difficulty")]
    pub typing_difficulty: u32,
    /// Success spec; the user's hit rate applies when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<SuccessRateSpec>,
    /// Critical spec; the user's base critical rate applies when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_rate: Option<CriticalRateSpec>,
    /// Flat percentage added to the computed success rate.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub success_bonus: f64,
    /// Ordered effects (at least one).
    pub effects: Vec<Effect>,
    /// Boosts granted to the next skill use when this one lands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combo_boosts: Vec<ComboBoost>,
    /// Conditionally appended effects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub potential_effects: Vec<PotentialEffect>,
}

fn one_action() -> u32 {
    1
}

fn one_difficulty() -> u32 {
    1
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// A validated skill.
///
/// Combo boosts never modify a skill in place; [`crate::combo::ComboStack::apply_to_skill`]
/// derives a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SkillData", into = "SkillData")]
pub struct Skill {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) category: SkillCategory,
    pub(crate) resource_cost: u32,
    pub(crate) resource_restore: u32,
    pub(crate) action_cost: u32,
    pub(crate) target: TargetSelector,
    pub(crate) typing_difficulty: u32,
    pub(crate) success_rate: Option<SuccessRateSpec>,
    pub(crate) critical_rate: Option<CriticalRateSpec>,
    pub(crate) success_bonus: f64,
    pub(crate) effects: Vec<Effect>,
    pub(crate) combo_boosts: Vec<ComboBoost>,
    pub(crate) potential_effects: Vec<PotentialEffect>,
}

impl Skill {
    /// Validate raw data into a skill.
    pub fn new(data: SkillData) -> EngineResult<Self> {
        Self::try_from(data)
    }

    /// Minimal skill: physical, aimed at the opponent, no cost, default rates.
    pub fn simple(id: &str, name: &str, effects: Vec<Effect>) -> EngineResult<Self> {
        Self::new(SkillData::simple(id, name, effects))
    }

    /// Unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evasion category.
    pub fn category(&self) -> SkillCategory {
        self.category
    }

    /// Resource spent on use.
    pub fn resource_cost(&self) -> u32 {
        self.resource_cost
    }

    /// Resource regained on a successful use, before typing scaling.
    pub fn resource_restore(&self) -> u32 {
        self.resource_restore
    }

    /// Turn actions consumed.
    pub fn action_cost(&self) -> u32 {
        self.action_cost
    }

    /// Who the skill is aimed at.
    pub fn target(&self) -> TargetSelector {
        self.target
    }

    /// Typing prompt difficulty.
    pub fn typing_difficulty(&self) -> u32 {
        self.typing_difficulty
    }

    /// Success spec, if declared.
    pub fn success_rate(&self) -> Option<&SuccessRateSpec> {
        self.success_rate.as_ref()
    }

    /// Critical spec, if declared.
    pub fn critical_rate(&self) -> Option<&CriticalRateSpec> {
        self.critical_rate.as_ref()
    }

    /// Flat bonus added to the computed success rate.
    pub fn success_bonus(&self) -> f64 {
        self.success_bonus
    }

    /// Ordered effects.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Boosts granted when this skill lands.
    pub fn combo_boosts(&self) -> &[ComboBoost] {
        &self.combo_boosts
    }

    /// Conditionally appended effects.
    pub fn potential_effects(&self) -> &[PotentialEffect] {
        &self.potential_effects
    }

    /// Same skill with a different effect list (used after potential merging
    /// and condition filtering). The list may be empty here: the skill then
    /// resolves with no effect outcomes.
    pub(crate) fn with_effects(&self, effects: Vec<Effect>) -> Self {
        Self {
            effects,
            ..self.clone()
        }
    }
}

impl SkillData {
    /// Minimal raw skill: physical, aimed at the opponent, no cost, default rates.
    pub fn simple(id: &str, name: &str, effects: Vec<Effect>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: SkillCategory::Physical,
            resource_cost: 0,
            resource_restore: 0,
            action_cost: 1,
            target: TargetSelector::Opponent,
            typing_difficulty: 1,
            success_rate: None,
            critical_rate: None,
            success_bonus: 0.0,
            effects,
            combo_boosts: Vec::new(),
            potential_effects: Vec::new(),
        }
    }
}

impl TryFrom<SkillData> for Skill {
    type Error = EngineError;

    fn try_from(data: SkillData) -> EngineResult<Self> {
        if data.effects.is_empty() {
            return Err(EngineError::EmptyEffects(data.id));
        }
        if data.typing_difficulty == 0 {
            return Err(EngineError::InvalidTypingDifficulty {
                skill: data.id,
                difficulty: 0,
            });
        }
        if let Some(spec) = &data.success_rate {
            check_rate(|| format!("skill '{}' success_rate.base", data.id), spec.base)?;
        }
        if let Some(spec) = &data.critical_rate {
            check_rate(|| format!("skill '{}' critical_rate.base", data.id), spec.base)?;
        }
        for (index, potential) in data.potential_effects.iter().enumerate() {
            for condition in &potential.trigger {
                if let Condition::Health { percent, .. } = condition {
                    check_rate(
                        || format!("skill '{}' potential #{index} health trigger", data.id),
                        *percent,
                    )?;
                }
            }
        }
        Ok(Self {
            id: data.id,
            name: data.name,
            category: data.category,
            resource_cost: data.resource_cost,
            resource_restore: data.resource_restore,
            action_cost: data.action_cost,
            target: data.target,
            typing_difficulty: data.typing_difficulty,
            success_rate: data.success_rate,
            critical_rate: data.critical_rate,
            success_bonus: data.success_bonus,
            effects: data.effects,
            combo_boosts: data.combo_boosts,
            potential_effects: data.potential_effects,
        })
    }
}

impl From<Skill> for SkillData {
    fn from(skill: Skill) -> Self {
        Self {
            id: skill.id,
            name: skill.name,
            category: skill.category,
            resource_cost: skill.resource_cost,
            resource_restore: skill.resource_restore,
            action_cost: skill.action_cost,
            target: skill.target,
            typing_difficulty: skill.typing_difficulty,
            success_rate: skill.success_rate,
            critical_rate: skill.critical_rate,
            success_bonus: skill.success_bonus,
            effects: skill.effects,
            combo_boosts: skill.combo_boosts,
            potential_effects: skill.potential_effects,
        }
    }
}
