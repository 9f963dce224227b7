//! Skill lookup by id.
//!
//! The catalog is handed to whoever builds combatants, so fallback skill
//! data is never read from hidden global state.

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::model::{Skill, SkillData};

/// Id of the fallback skill when a catalog does not name one.
pub const DEFAULT_FALLBACK_SKILL: &str = "basic_attack";

/// Resolves skill ids to validated skills.
pub trait SkillCatalog {
    /// Look up a skill. Unknown ids fail with [`EngineError::UnknownSkill`].
    fn skill(&self, id: &str) -> EngineResult<Skill>;

    /// Id of the skill used when a combatant declares none.
    fn fallback_skill_id(&self) -> &str {
        DEFAULT_FALLBACK_SKILL
    }

    /// Resolve the fallback skill. Fails with [`EngineError::NoFallbackSkill`].
    fn fallback_skill(&self) -> EngineResult<Skill> {
        let id = self.fallback_skill_id();
        self.skill(id)
            .map_err(|_| EngineError::NoFallbackSkill(id.to_string()))
    }
}

/// Catalog held in memory, keyed by skill id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    skills: BTreeMap<String, Skill>,
    fallback: Option<String>,
}

impl InMemoryCatalog {
    /// Build from validated skills. A later duplicate id replaces an earlier one.
    pub fn new(skills: impl IntoIterator<Item = Skill>) -> Self {
        Self {
            skills: skills
                .into_iter()
                .map(|s| (s.id().to_string(), s))
                .collect(),
            fallback: None,
        }
    }

    /// Decode a JSON array of skill records, validating each.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let records: Vec<SkillData> = serde_json::from_str(json)?;
        let skills = records
            .into_iter()
            .map(Skill::new)
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Self::new(skills))
    }

    /// Use a different fallback skill id.
    pub fn with_fallback(mut self, id: impl Into<String>) -> Self {
        self.fallback = Some(id.into());
        self
    }

    /// Add or replace a skill.
    pub fn insert(&mut self, skill: Skill) {
        self.skills.insert(skill.id().to_string(), skill);
    }

    /// Number of skills.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Returns true if the catalog holds no skills.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Iterate skills in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.values()
    }
}

impl SkillCatalog for InMemoryCatalog {
    fn skill(&self, id: &str) -> EngineResult<Skill> {
        self.skills
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSkill(id.to_string()))
    }

    fn fallback_skill_id(&self) -> &str {
        self.fallback.as_deref().unwrap_or(DEFAULT_FALLBACK_SKILL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Effect;

    fn basic_attack() -> Skill {
        Skill::simple("basic_attack", "Attack", vec![Effect::damage(10).unwrap()]).unwrap()
    }

    #[test]
    fn lookup_and_unknown() {
        let catalog = InMemoryCatalog::new([basic_attack()]);
        assert_eq!(catalog.skill("basic_attack").unwrap().name(), "Attack");
        assert!(matches!(
            catalog.skill("meteor"),
            Err(EngineError::UnknownSkill(id)) if id == "meteor"
        ));
    }

    #[test]
    fn fallback_resolution() {
        let catalog = InMemoryCatalog::new([basic_attack()]);
        assert_eq!(catalog.fallback_skill().unwrap().id(), "basic_attack");

        let custom = InMemoryCatalog::new([basic_attack()]).with_fallback("struggle");
        assert!(matches!(
            custom.fallback_skill(),
            Err(EngineError::NoFallbackSkill(id)) if id == "struggle"
        ));
    }

    #[test]
    fn from_json_validates_every_record() {
        let ok = r#"[{"id":"a","name":"A","effects":[{"type":"damage","power":1}]},
                     {"id":"b","name":"B","effects":[{"type":"heal","power":2}]}]"#;
        let catalog = InMemoryCatalog::from_json_str(ok).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.iter().map(Skill::id).collect::<Vec<_>>(), ["a", "b"]);

        let bad = r#"[{"id":"a","name":"A","effects":[]}]"#;
        assert!(matches!(
            InMemoryCatalog::from_json_str(bad),
            Err(EngineError::EmptyEffects(_))
        ));
        assert!(matches!(
            InMemoryCatalog::from_json_str("not json"),
            Err(EngineError::Data(_))
        ));
    }

    #[test]
    fn insert_replaces_by_id() {
        let mut catalog = InMemoryCatalog::default();
        assert!(catalog.is_empty());
        catalog.insert(basic_attack());
        catalog.insert(Skill::simple("basic_attack", "Strike", vec![Effect::damage(3).unwrap()]).unwrap());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.skill("basic_attack").unwrap().name(), "Strike");
    }
}
