//! Validation report for skill catalogs.
//!
//! Construction rejects the first invalid field it meets. This module walks
//! a whole catalog instead and collects every problem, plus warnings for
//! data that is legal but probably not what the author meant.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::catalog::DEFAULT_FALLBACK_SKILL;
use crate::error::EngineResult;
use crate::model::{Skill, SkillData};

/// A warning or error found in catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The record the issue was found in (e.g. `skill 'fireball'`).
    pub entity: String,
    /// A human-readable description of the issue.
    pub message: String,
    /// Whether this is an error (true) or a warning (false).
    pub is_error: bool,
}

impl ValidationIssue {
    fn error(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            message: message.into(),
            is_error: true,
        }
    }

    fn warning(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            message: message.into(),
            is_error: false,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{level}: {}: {}", self.entity, self.message)
    }
}

/// Validate decoded skill records.
///
/// Errors are records that would fail construction. Warnings cover
/// duplicate ids, combo boosts with a zero duration (they last one use),
/// potential effects with no trigger (they always fire), and a missing
/// `basic_attack` fallback skill.
pub fn validate_catalog(skills: &[SkillData]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = BTreeSet::new();

    for data in skills {
        let entity = format!("skill '{}'", data.id);

        if !seen.insert(data.id.as_str()) {
            issues.push(ValidationIssue::warning(
                &entity,
                "duplicate id; the later record replaces the earlier one",
            ));
        }

        if let Err(e) = Skill::new(data.clone()) {
            issues.push(ValidationIssue::error(&entity, e.to_string()));
        }

        for boost in data.combo_boosts.iter().filter(|b| b.duration == 0) {
            issues.push(ValidationIssue::warning(
                &entity,
                format!("combo boost {} has duration 0; it lasts one use", boost.kind),
            ));
        }

        for (i, potential) in data.potential_effects.iter().enumerate() {
            if potential.trigger.is_empty() {
                issues.push(ValidationIssue::warning(
                    &entity,
                    format!("potential effect #{i} has no trigger and always fires"),
                ));
            }
        }
    }

    if !skills.is_empty() && !seen.contains(DEFAULT_FALLBACK_SKILL) {
        issues.push(ValidationIssue::warning(
            "catalog",
            format!("no '{DEFAULT_FALLBACK_SKILL}' skill; combatants without skills cannot be built"),
        ));
    }

    issues
}

/// Validate a JSON catalog (an array of skill records).
///
/// Records that do not decode are reported as errors and skipped; the rest
/// go through [`validate_catalog`]. Fails only when the text is not a JSON
/// array.
pub fn validate_catalog_json(json: &str) -> EngineResult<Vec<ValidationIssue>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut issues = Vec::new();
    let mut decoded = Vec::with_capacity(values.len());

    for (i, value) in values.into_iter().enumerate() {
        let entity = match value.get("id").and_then(serde_json::Value::as_str) {
            Some(id) => format!("skill '{id}'"),
            None => format!("skill #{i}"),
        };
        match SkillData::deserialize(value) {
            Ok(data) => decoded.push(data),
            Err(e) => issues.push(ValidationIssue::error(entity, e.to_string())),
        }
    }

    issues.extend(validate_catalog(&decoded));
    Ok(issues)
}
