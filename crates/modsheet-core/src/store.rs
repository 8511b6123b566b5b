//! Codec and record types for the nested module store
//!
//! The store is a YAML document whose top-level `modules` key holds an
//! ordered sequence of module records. Field order is preserved on
//! save (struct declaration order, then untouched extra fields in
//! their original order) so re-serialized files stay diff-friendly
//! against hand edits.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Key of the record's mapping fields targeted by the auxiliary views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapField {
    ConstructionResources,
    Produce,
    Add,
}

impl MapField {
    pub fn name(self) -> &'static str {
        match self {
            MapField::ConstructionResources => "construction_resources",
            MapField::Produce => "produce",
            MapField::Add => "add",
        }
    }
}

/// One ship module record.
///
/// Mapping fields hold only nonzero entries when present; a missing
/// map is the stored form of "all zero". `construction_requirements`
/// and `construction_time` additionally have implied defaults that are
/// reconstructed on export and collapsed away on import (see the
/// exporter and fuser).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Unique, stable identifier; the sole join key with every sheet row
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<Value>,

    /// Facility levels required to build; absent means the implied
    /// default `{industrial_manufacturing: 1}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_requirements: Option<IndexMap<String, i64>>,

    /// Build duration; absent means the implied default of 20
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_time: Option<i64>,

    /// Resources consumed at build time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_resources: Option<IndexMap<String, i64>>,

    /// Resources generated (or, signed negative, consumed) in operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produce: Option<IndexMap<String, i64>>,

    /// Stat modifiers applied while the module is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<IndexMap<String, i64>>,

    /// Fields no view projects; carried through untouched
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl ModuleRecord {
    /// A bare record holding only an id, as created for a sheet row
    /// whose id is not yet in the store
    pub fn shell(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn map_field(&self, field: MapField) -> Option<&IndexMap<String, i64>> {
        match field {
            MapField::ConstructionResources => self.construction_resources.as_ref(),
            MapField::Produce => self.produce.as_ref(),
            MapField::Add => self.add.as_ref(),
        }
    }

    pub fn map_field_mut(&mut self, field: MapField) -> &mut Option<IndexMap<String, i64>> {
        match field {
            MapField::ConstructionResources => &mut self.construction_resources,
            MapField::Produce => &mut self.produce,
            MapField::Add => &mut self.add,
        }
    }
}

/// The full ordered collection of module records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSet {
    pub modules: Vec<ModuleRecord>,
}

impl ModuleSet {
    pub fn new(modules: Vec<ModuleRecord>) -> Self {
        Self { modules }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Find a record by id
    pub fn get(&self, id: &str) -> Option<&ModuleRecord> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Build an id -> position index, rejecting duplicate ids
    pub fn id_index(&self) -> Result<HashMap<String, usize>> {
        let mut index = HashMap::with_capacity(self.modules.len());
        for (pos, record) in self.modules.iter().enumerate() {
            if index.insert(record.id.clone(), pos).is_some() {
                return Err(Error::DuplicateId(record.id.clone()));
            }
        }
        Ok(index)
    }

    /// Deserialize a store document
    pub fn from_yaml(text: &str) -> Result<Self> {
        let doc: Value = serde_yaml::from_str(text)?;
        if doc.get("modules").is_none() {
            return Err(Error::Format(
                "expected a top-level 'modules' key holding the record list".to_string(),
            ));
        }

        let mut set: ModuleSet = serde_yaml::from_value(doc)?;
        for record in &mut set.modules {
            normalize_description(record);
        }
        Ok(set)
    }

    /// Serialize the store document, preserving field order
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load the store from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Save the store to a YAML file.
    ///
    /// The document is rendered fully in memory before anything is
    /// written, so a serialization failure leaves the file untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_yaml()?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Strip the single trailing newline YAML block scalars leave on
/// free-text descriptions
fn normalize_description(record: &mut ModuleRecord) {
    if let Some(Value::String(s)) = &mut record.description {
        if s.ends_with('\n') {
            s.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &str = "\
modules:
- id: hab_a
  name: Habitat
  description: |
    A place to live.
  type: habitat
  mass: 100
  construction_resources:
    steel: 10
  add:
    power: 5
    crew: -2
- id: hab_b
  name: Small Habitat
  description: ''
  type: habitat
  mass: 50
  construction_time: 35
  construction_requirements:
    industrial_manufacturing: 2
    clean_room: 1
  tags:
  - outdated
";

    #[test]
    fn test_load_store() {
        let set = ModuleSet::from_yaml(STORE).unwrap();
        assert_eq!(set.len(), 2);

        let hab_a = set.get("hab_a").unwrap();
        assert_eq!(hab_a.name, Some(Value::from("Habitat")));
        assert_eq!(hab_a.construction_time, None);
        assert_eq!(
            hab_a.construction_resources.as_ref().unwrap().get("steel"),
            Some(&10)
        );
        assert_eq!(hab_a.add.as_ref().unwrap().get("crew"), Some(&-2));

        let hab_b = set.get("hab_b").unwrap();
        assert_eq!(hab_b.construction_time, Some(35));
        assert_eq!(
            hab_b.construction_requirements.as_ref().unwrap().len(),
            2
        );
    }

    #[test]
    fn test_trailing_newline_stripped() {
        let set = ModuleSet::from_yaml(STORE).unwrap();
        assert_eq!(
            set.get("hab_a").unwrap().description,
            Some(Value::from("A place to live."))
        );
        // Empty descriptions are left alone
        assert_eq!(
            set.get("hab_b").unwrap().description,
            Some(Value::from(""))
        );
    }

    #[test]
    fn test_unprojected_fields_survive() {
        let set = ModuleSet::from_yaml(STORE).unwrap();
        let hab_b = set.get("hab_b").unwrap();
        assert!(hab_b.extra.contains_key("tags"));

        let saved = set.to_yaml().unwrap();
        assert!(saved.contains("outdated"));
    }

    #[test]
    fn test_save_load_round_trip() {
        let set = ModuleSet::from_yaml(STORE).unwrap();
        let saved = set.to_yaml().unwrap();
        let reloaded = ModuleSet::from_yaml(&saved).unwrap();
        assert_eq!(set, reloaded);
    }

    #[test]
    fn test_missing_top_level_key() {
        let err = ModuleSet::from_yaml("ships:\n- id: x\n").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_compaction_not_materialized() {
        let set = ModuleSet::from_yaml(STORE).unwrap();
        let saved = set.to_yaml().unwrap();
        // hab_a has no explicit requirements or time; saving must not
        // invent them
        assert_eq!(saved.matches("construction_requirements").count(), 1);
        assert_eq!(saved.matches("construction_time").count(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let set = ModuleSet::new(vec![
            ModuleRecord::shell("dup"),
            ModuleRecord::shell("dup"),
        ]);
        assert!(matches!(set.id_index(), Err(Error::DuplicateId(_))));
    }
}
