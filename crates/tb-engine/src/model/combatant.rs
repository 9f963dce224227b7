//! Battle participants and their serializable snapshot form.
//!
//! A combatant is built once per encounter from [`CombatantData`] and a
//! [`SkillCatalog`]. After construction only health, resource, status
//! markers, and the queued next skill change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::gauge::Gauge;
use super::skill::{Skill, SkillCategory};
use super::Stats;
use crate::catalog::SkillCatalog;
use crate::error::{EngineError, EngineResult, check_rate};
use crate::probability::calculate_evade_rate;

/// One possible drop and its chance (0–100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    /// Item id awarded.
    pub item_id: String,
    /// Chance once the aggregate drop roll has passed.
    pub rate: f64,
}

/// Validated list of drop entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<DropEntry>", into = "Vec<DropEntry>")]
pub struct DropTable {
    entries: Vec<DropEntry>,
}

impl DropTable {
    /// Validate drop entries; every rate must be within 0..=100.
    pub fn new(entries: Vec<DropEntry>) -> EngineResult<Self> {
        for entry in &entries {
            check_rate(|| format!("drop '{}' rate", entry.item_id), entry.rate)?;
        }
        Ok(Self { entries })
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[DropEntry] {
        &self.entries
    }

    /// Returns true if nothing can drop.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<DropEntry>> for DropTable {
    type Error = EngineError;

    fn try_from(entries: Vec<DropEntry>) -> EngineResult<Self> {
        Self::new(entries)
    }
}

impl From<DropTable> for Vec<DropEntry> {
    fn from(table: DropTable) -> Self {
        table.entries
    }
}

/// Plain serializable combatant record.
///
/// Used both as the definition format and as the save/resume snapshot;
/// a snapshot fills every optional field. Skills are stored by id and
/// resolved through a catalog when rebuilt. Combo state is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantData {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Level (at least 1).
    #[serde(default = "first_level")]
    pub level: i64,
    /// Combat stats.
    #[serde(default)]
    pub stats: Stats,
    /// Maximum health (positive).
    pub max_health: u32,
    /// Starting health; full when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_health: Option<u32>,
    /// Maximum resource; enemies usually have no pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_resource: Option<u32>,
    /// Starting resource; full when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_resource: Option<u32>,
    /// Physical evasion; derived from agility when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_evasion: Option<f64>,
    /// Magical evasion; derived from willpower when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magical_evasion: Option<f64>,
    /// Skill ids; the catalog's fallback skill is used when empty.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Drop table, if the combatant can drop items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drops: Option<DropTable>,
    /// Skill queued for the next enemy action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_skill_id: Option<String>,
}

/// The save/resume form of a combatant.
pub type CombatantSnapshot = CombatantData;

fn first_level() -> i64 {
    1
}

/// A battle participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    id: String,
    name: String,
    level: u32,
    stats: Stats,
    health: Gauge,
    resource: Option<Gauge>,
    physical_evasion: f64,
    magical_evasion: f64,
    skills: Vec<Skill>,
    drops: Option<DropTable>,
    next_skill_id: Option<String>,
    statuses: BTreeSet<String>,
}

impl Combatant {
    /// Start building a combatant.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> CombatantBuilder {
        CombatantBuilder::new(id, name)
    }

    /// Build from a definition, resolving skill ids through the catalog.
    pub fn from_data(data: CombatantData, catalog: &dyn SkillCatalog) -> EngineResult<Self> {
        CombatantBuilder {
            data,
            skills: Vec::new(),
        }
        .build(catalog)
    }

    /// Rebuild from a snapshot taken with [`Combatant::snapshot`].
    pub fn restore(snapshot: CombatantSnapshot, catalog: &dyn SkillCatalog) -> EngineResult<Self> {
        Self::from_data(snapshot, catalog)
    }

    /// Capture the serializable state of this combatant.
    pub fn snapshot(&self) -> CombatantSnapshot {
        CombatantData {
            id: self.id.clone(),
            name: self.name.clone(),
            level: i64::from(self.level),
            stats: self.stats,
            max_health: self.health.max,
            current_health: Some(self.health.current),
            max_resource: self.resource.map(|r| r.max),
            current_resource: self.resource.map(|r| r.current),
            physical_evasion: Some(self.physical_evasion),
            magical_evasion: Some(self.magical_evasion),
            skills: self.skills.iter().map(|s| s.id().to_string()).collect(),
            drops: self.drops.clone(),
            next_skill_id: self.next_skill_id.clone(),
        }
    }

    /// Unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Combat stats.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Health pool.
    pub fn health(&self) -> &Gauge {
        &self.health
    }

    /// Resource pool, if the combatant has one.
    pub fn resource(&self) -> Option<&Gauge> {
        self.resource.as_ref()
    }

    /// Physical evasion percentage.
    pub fn physical_evasion(&self) -> f64 {
        self.physical_evasion
    }

    /// Magical evasion percentage.
    pub fn magical_evasion(&self) -> f64 {
        self.magical_evasion
    }

    /// Evasion percentage against a skill category.
    pub fn evasion_against(&self, category: SkillCategory) -> f64 {
        match category {
            SkillCategory::Physical => self.physical_evasion,
            SkillCategory::Magical => self.magical_evasion,
        }
    }

    /// Known skills, in declaration order.
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Find a known skill by id.
    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id() == id)
    }

    /// Drop table, if any.
    pub fn drops(&self) -> Option<&DropTable> {
        self.drops.as_ref()
    }

    /// Skill queued for the next action, if any.
    pub fn next_skill_id(&self) -> Option<&str> {
        self.next_skill_id.as_deref()
    }

    /// Active status markers.
    pub fn statuses(&self) -> &BTreeSet<String> {
        &self.statuses
    }

    /// Returns true if the status marker is active.
    pub fn has_status(&self, status: &str) -> bool {
        self.statuses.contains(status)
    }

    /// Returns true once health reaches zero.
    pub fn is_defeated(&self) -> bool {
        self.health.is_empty()
    }

    /// Whether the resource pool covers `cost`. Combatants without a pool
    /// can only afford free skills.
    pub fn can_afford(&self, cost: u32) -> bool {
        match &self.resource {
            Some(pool) => pool.current >= cost,
            None => cost == 0,
        }
    }

    pub(crate) fn health_mut(&mut self) -> &mut Gauge {
        &mut self.health
    }

    pub(crate) fn resource_mut(&mut self) -> Option<&mut Gauge> {
        self.resource.as_mut()
    }

    pub(crate) fn set_next_skill_id(&mut self, id: Option<String>) {
        self.next_skill_id = id;
    }

    pub(crate) fn add_status(&mut self, status: &str) -> bool {
        self.statuses.insert(status.to_string())
    }

    pub(crate) fn remove_status(&mut self, status: &str) -> bool {
        self.statuses.remove(status)
    }
}

/// Builder for [`Combatant`]; validation runs in [`CombatantBuilder::build`].
#[derive(Debug, Clone)]
pub struct CombatantBuilder {
    data: CombatantData,
    skills: Vec<Skill>,
}

impl CombatantBuilder {
    /// Start with level 1, zero stats, 1 health, no resource, and no skills.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            data: CombatantData {
                id: id.into(),
                name: name.into(),
                level: 1,
                stats: Stats::default(),
                max_health: 1,
                current_health: None,
                max_resource: None,
                current_resource: None,
                physical_evasion: None,
                magical_evasion: None,
                skills: Vec::new(),
                drops: None,
                next_skill_id: None,
            },
            skills: Vec::new(),
        }
    }

    /// Set the level.
    pub fn level(mut self, level: i64) -> Self {
        self.data.level = level;
        self
    }

    /// Set the stats.
    pub fn stats(mut self, stats: Stats) -> Self {
        self.data.stats = stats;
        self
    }

    /// Set maximum health (starting full).
    pub fn health(mut self, max: u32) -> Self {
        self.data.max_health = max;
        self
    }

    /// Set the starting health.
    pub fn current_health(mut self, current: u32) -> Self {
        self.data.current_health = Some(current);
        self
    }

    /// Give the combatant a resource pool (starting full).
    pub fn resource(mut self, max: u32) -> Self {
        self.data.max_resource = Some(max);
        self
    }

    /// Set the starting resource.
    pub fn current_resource(mut self, current: u32) -> Self {
        self.data.current_resource = Some(current);
        self
    }

    /// Override both evasion rates.
    pub fn evasion(mut self, physical: f64, magical: f64) -> Self {
        self.data.physical_evasion = Some(physical);
        self.data.magical_evasion = Some(magical);
        self
    }

    /// Add a skill directly.
    pub fn skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Add a skill by catalog id.
    pub fn skill_id(mut self, id: impl Into<String>) -> Self {
        self.data.skills.push(id.into());
        self
    }

    /// Set the drop table.
    pub fn drops(mut self, drops: DropTable) -> Self {
        self.data.drops = Some(drops);
        self
    }

    /// Validate and build. Direct skills come first, then catalog ids in
    /// order; with neither, the catalog's fallback skill is used.
    pub fn build(self, catalog: &dyn SkillCatalog) -> EngineResult<Combatant> {
        let CombatantBuilder { data, mut skills } = self;

        let level = match u32::try_from(data.level) {
            Ok(level) if level >= 1 => level,
            _ => {
                return Err(EngineError::InvalidLevel {
                    name: data.name,
                    level: data.level,
                });
            }
        };
        if data.max_health == 0 {
            return Err(EngineError::InvalidGauge(format!("'{}' health", data.name)));
        }
        if data.max_resource == Some(0) {
            return Err(EngineError::InvalidGauge(format!("'{}' resource", data.name)));
        }

        let physical_evasion = match data.physical_evasion {
            Some(rate) => check_rate(|| format!("'{}' physical evasion", data.name), rate)?,
            None => calculate_evade_rate(data.stats.agility),
        };
        let magical_evasion = match data.magical_evasion {
            Some(rate) => check_rate(|| format!("'{}' magical evasion", data.name), rate)?,
            None => calculate_evade_rate(data.stats.willpower),
        };

        for id in &data.skills {
            skills.push(catalog.skill(id)?);
        }
        if skills.is_empty() {
            skills.push(catalog.fallback_skill()?);
        }

        let health = match data.current_health {
            Some(current) => Gauge::with_current(current, data.max_health),
            None => Gauge::full(data.max_health),
        };
        let resource = data.max_resource.map(|max| match data.current_resource {
            Some(current) => Gauge::with_current(current, max),
            None => Gauge::full(max),
        });

        Ok(Combatant {
            id: data.id,
            name: data.name,
            level,
            stats: data.stats,
            health,
            resource,
            physical_evasion,
            magical_evasion,
            skills,
            drops: data.drops,
            next_skill_id: data.next_skill_id,
            statuses: BTreeSet::new(),
        })
    }
}
