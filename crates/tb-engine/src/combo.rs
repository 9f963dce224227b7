//! Combo modifier stack.
//!
//! Boosts granted by one skill are registered here and shape the next skill
//! use. Applying boosts derives a new skill without consuming anything;
//! [`ComboStack::consume_once`] runs exactly once per execution afterwards.

use serde::{Deserialize, Serialize};

use crate::model::{BoostKind, ComboBoost, Effect, EffectKind, Skill};

/// A live boost and how many more skill uses it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboBoostEntry {
    /// Boost kind.
    pub kind: BoostKind,
    /// Magnitude.
    pub value: f64,
    /// Uses left before eviction.
    pub remaining_uses: u32,
}

/// Ordered collection of live combo boosts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComboStack {
    entries: Vec<ComboBoostEntry>,
}

impl ComboStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append boosts in order. A zero duration counts as one use.
    pub fn register(&mut self, boosts: &[ComboBoost]) {
        self.entries.extend(boosts.iter().map(|b| ComboBoostEntry {
            kind: b.kind,
            value: b.value,
            remaining_uses: b.duration.max(1),
        }));
    }

    /// Derive the skill as it would resolve with every live boost applied.
    ///
    /// Cost floors at 0 and typing difficulty at 1. Multipliers scale the
    /// power of matching effects (including potential effects) by
    /// `1 + value`, floored. A potential unlock appends every potential
    /// effect to the effect list.
    pub fn apply_to_skill(&self, skill: &Skill) -> Skill {
        let mut derived = skill.clone();
        let mut unlock = false;

        for entry in &self.entries {
            match entry.kind {
                BoostKind::ResourceCostReduction => {
                    let cost = (f64::from(derived.resource_cost) - entry.value).max(0.0);
                    derived.resource_cost = cost.floor() as u32;
                }
                BoostKind::TypingDifficultyReduction => {
                    let difficulty = (f64::from(derived.typing_difficulty) - entry.value).max(1.0);
                    derived.typing_difficulty = difficulty.floor() as u32;
                }
                BoostKind::SkillSuccessAdd => {
                    derived.success_bonus += entry.value;
                }
                BoostKind::StatusSuccessAdd => {
                    for_each_effect(&mut derived, |effect| {
                        if effect.kind.is_status() {
                            effect.success_rate = (effect.success_rate + entry.value).clamp(0.0, 100.0);
                        }
                    });
                }
                BoostKind::DamageMultiplier => {
                    for_each_effect(&mut derived, |effect| {
                        if effect.kind == EffectKind::Damage {
                            effect.power = scale(effect.power, entry.value);
                        }
                    });
                }
                BoostKind::HealMultiplier => {
                    for_each_effect(&mut derived, |effect| {
                        if effect.kind == EffectKind::Heal {
                            effect.power = scale(effect.power, entry.value);
                        }
                    });
                }
                BoostKind::PotentialUnlock => unlock = true,
            }
        }

        if unlock {
            let unlocked: Vec<Effect> = derived
                .potential_effects
                .drain(..)
                .map(|p| p.effect)
                .collect();
            derived.effects.extend(unlocked);
        }

        derived
    }

    /// Spend one use of every live boost and evict exhausted ones.
    /// Returns how many boosts were evicted.
    pub fn consume_once(&mut self) -> usize {
        let before = self.entries.len();
        for entry in &mut self.entries {
            entry.remaining_uses = entry.remaining_uses.saturating_sub(1);
        }
        self.entries.retain(|e| e.remaining_uses > 0);
        before - self.entries.len()
    }

    /// Live boosts in registration order.
    pub fn entries(&self) -> &[ComboBoostEntry] {
        &self.entries
    }

    /// Number of live boosts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no boost is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every boost (end of encounter).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn for_each_effect(skill: &mut Skill, mut f: impl FnMut(&mut Effect)) {
    for effect in &mut skill.effects {
        f(effect);
    }
    for potential in &mut skill.potential_effects {
        f(&mut potential.effect);
    }
}

fn scale(power: u32, value: f64) -> u32 {
    (f64::from(power) * (1.0 + value)).floor().max(0.0) as u32
}
