//! View importer: merges edited sheets back into the module store
//!
//! Each fuse runs against a working copy of the collection and returns
//! the merged result; the caller persists nothing until every view has
//! fused cleanly. The general view must fuse first so that rows
//! introducing a new id attach identity metadata before the auxiliary
//! views contribute cost, yield and stat data.

use crate::error::{Error, Result};
use crate::export::ViewSheets;
use crate::schema::{View, DEFAULT_CONSTRUCTION_TIME, FACILITIES, IMPLIED_REQUIREMENT, IMPLIED_REQUIREMENT_LEVEL, RESOURCES};
use crate::store::{MapField, ModuleRecord, ModuleSet};
use crate::table::{CellValue, Sheet};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::collections::HashMap;

/// Run the full import sequence: general first, then the three
/// auxiliary views in their fixed order
pub fn fuse_views(set: &ModuleSet, sheets: &ViewSheets) -> Result<ModuleSet> {
    let merged = fuse_general(set, &sheets.general)?;
    let merged = fuse_auxiliary(&merged, &sheets.construction, View::Construction)?;
    let merged = fuse_auxiliary(&merged, &sheets.production, View::Production)?;
    fuse_auxiliary(&merged, &sheets.stats, View::Stats)
}

/// Working copy of the collection plus its id index.
///
/// The index makes the "at most one record per id" invariant mechanical:
/// building it fails on duplicates, and every insert goes through it.
struct Workspace {
    set: ModuleSet,
    index: HashMap<String, usize>,
}

impl Workspace {
    fn new(set: &ModuleSet) -> Result<Self> {
        let set = set.clone();
        let index = set.id_index()?;
        Ok(Self { set, index })
    }

    /// Position of the record for `id`, appending a shell record if the
    /// id has never been seen
    fn resolve(&mut self, id: &str) -> usize {
        if let Some(&pos) = self.index.get(id) {
            return pos;
        }
        let pos = self.set.modules.len();
        self.set.modules.push(ModuleRecord::shell(id));
        self.index.insert(id.to_string(), pos);
        pos
    }

    /// Contract check: the resolved record must carry the row's id
    fn check_consistency(&self, pos: usize, row_id: &str) -> Result<()> {
        let record_id = &self.set.modules[pos].id;
        if record_id != row_id {
            return Err(Error::FuseConsistency {
                row_id: row_id.to_string(),
                record_id: record_id.clone(),
            });
        }
        Ok(())
    }
}

/// Column positions of the general sheet, located by header name
struct GeneralColumns {
    id: usize,
    name: usize,
    description: usize,
    kind: usize,
    mass: usize,
    power: usize,
    facilities_start: usize,
    construction_time: usize,
}

impl GeneralColumns {
    fn locate(sheet: &Sheet) -> Result<Self> {
        let find = |name: &str| {
            sheet.column(name).ok_or_else(|| Error::SchemaMismatch {
                sheet: View::General.name().to_string(),
                message: format!("missing column '{}'", name),
            })
        };

        let facilities_start = find(FACILITIES[0])?;
        let facilities_end = find(FACILITIES[FACILITIES.len() - 1])?;
        if facilities_end + 1 - facilities_start != FACILITIES.len() {
            return Err(Error::SchemaMismatch {
                sheet: View::General.name().to_string(),
                message: format!(
                    "expected {} contiguous facility columns, found {}",
                    FACILITIES.len(),
                    facilities_end + 1 - facilities_start
                ),
            });
        }

        Ok(Self {
            id: find("id")?,
            name: find("name")?,
            description: find("description")?,
            kind: find("type")?,
            mass: find("mass")?,
            power: find("power")?,
            facilities_start,
            construction_time: find("construction_time")?,
        })
    }
}

/// Merge the edited general view into the collection
pub fn fuse_general(set: &ModuleSet, sheet: &Sheet) -> Result<ModuleSet> {
    let cols = GeneralColumns::locate(sheet)?;
    let mut ws = Workspace::new(set)?;

    for row in &sheet.rows {
        let row_id = row[cols.id].to_string_value();
        let pos = ws.resolve(&row_id);
        ws.check_consistency(pos, &row_id)?;
        let record = &mut ws.set.modules[pos];

        record.name = scalar_value(&row[cols.name]);
        record.description = scalar_value(&row[cols.description]);
        record.kind = scalar_value(&row[cols.kind]);
        record.mass = scalar_value(&row[cols.mass]);
        record.power = scalar_value(&row[cols.power]);

        fuse_construction_time(record, &row[cols.construction_time]);
        fuse_requirements(record, &row[cols.facilities_start..cols.facilities_start + FACILITIES.len()]);
    }

    Ok(ws.set)
}

/// An explicit construction time is written when the record already had
/// one or the cell departs from the implied default; a non-numeric cell
/// reverts the record to the implied default.
fn fuse_construction_time(record: &mut ModuleRecord, cell: &CellValue) {
    let cell_time = cell.as_int();
    if record.construction_time.is_some() || cell_time != Some(DEFAULT_CONSTRUCTION_TIME) {
        record.construction_time = cell_time;
    }
}

/// Requirement levels are only made explicit when they depart from the
/// implied default or an explicit map already exists. Zero-coerced
/// cells never remove an existing entry.
fn fuse_requirements(record: &mut ModuleRecord, cells: &[CellValue]) {
    let levels: Vec<i64> = cells.iter().map(CellValue::coerce_int).collect();

    let is_implied_default = FACILITIES.iter().zip(&levels).all(|(&facility, &level)| {
        if facility == IMPLIED_REQUIREMENT {
            level == IMPLIED_REQUIREMENT_LEVEL
        } else {
            level == 0
        }
    });

    if record.construction_requirements.is_none() && is_implied_default {
        return;
    }

    let map = record
        .construction_requirements
        .get_or_insert_with(IndexMap::new);
    for (&facility, &level) in FACILITIES.iter().zip(&levels) {
        if level != 0 {
            map.insert(facility.to_string(), level);
        }
    }
}

/// Merge one edited auxiliary view (construction cost, production
/// yield or stat modifiers) into the collection
pub fn fuse_auxiliary(set: &ModuleSet, sheet: &Sheet, view: View) -> Result<ModuleSet> {
    let (field, vocabulary): (MapField, Vec<&str>) = match view {
        View::Construction => (MapField::ConstructionResources, RESOURCES.to_vec()),
        View::Production => (MapField::Produce, RESOURCES.to_vec()),
        View::Stats => (MapField::Add, crate::schema::stat_names()),
        View::General => {
            return Err(Error::SchemaMismatch {
                sheet: view.name().to_string(),
                message: "the general view has no auxiliary mapping field".to_string(),
            })
        }
    };

    let id_col = sheet.column("id").ok_or_else(|| Error::SchemaMismatch {
        sheet: view.name().to_string(),
        message: "missing column 'id'".to_string(),
    })?;

    let mut ws = Workspace::new(set)?;

    for row in &sheet.rows {
        let row_id = row[id_col].to_string_value();
        let pos = ws.resolve(&row_id);
        ws.check_consistency(pos, &row_id)?;

        let values: Vec<i64> = row[1..].iter().map(CellValue::coerce_int).collect();
        if values.len() != vocabulary.len() {
            return Err(Error::SchemaMismatch {
                sheet: view.name().to_string(),
                message: format!(
                    "row '{}' has {} value cells, expected {}",
                    row_id,
                    values.len(),
                    vocabulary.len()
                ),
            });
        }

        let record = &mut ws.set.modules[pos];
        let slot = record.map_field_mut(field);

        // An absent map stays absent when the whole row is zero; this
        // is what keeps unedited exports from materializing empty maps.
        if slot.is_none() && values.iter().all(|&v| v == 0) {
            continue;
        }

        let map = slot.get_or_insert_with(IndexMap::new);
        for (&name, &value) in vocabulary.iter().zip(&values) {
            if value != 0 {
                map.insert(name.to_string(), value);
            }
        }
    }

    Ok(ws.set)
}

/// Scalar cells overwrite verbatim; a blank cell removes the field,
/// mirroring the exporter's "absent becomes empty string" rule
fn scalar_value(cell: &CellValue) -> Option<Value> {
    match cell {
        CellValue::Blank => None,
        CellValue::Integer(i) => Some(Value::from(*i)),
        CellValue::Float(f) => Some(Value::from(*f)),
        CellValue::Text(s) => Some(Value::from(s.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{export_construction, export_general, export_stats, export_views};
    use crate::sheet::read_sheet_str;
    use crate::store::ModuleSet;
    use crate::table::PLACEHOLDER;

    fn sample_set() -> ModuleSet {
        ModuleSet::from_yaml(
            "\
modules:
- id: hab_a
  name: Habitat
  description: A place to live.
  type: habitat
  mass: 100
  power: 5
  add:
    power: 5
- id: ext_b
  name: Extractor
  description: Digs.
  type: utility
  mass: 40
  construction_time: 35
  construction_requirements:
    ground_connection: 1
    industrial_manufacturing: 2
  produce:
    water: 4
",
        )
        .unwrap()
    }

    #[test]
    fn test_unedited_round_trip_is_identity() {
        let set = sample_set();
        let sheets = export_views(&set);
        let fused = fuse_views(&set, &sheets).unwrap();
        assert_eq!(set, fused);
    }

    #[test]
    fn test_compaction_stability() {
        // hab_a has no explicit requirements; a round trip must not
        // introduce an explicit map
        let set = sample_set();
        let fused = fuse_general(&set, &export_general(&set)).unwrap();
        assert!(fused.get("hab_a").unwrap().construction_requirements.is_none());
    }

    #[test]
    fn test_general_edit_overwrites_scalars() {
        let set = sample_set();
        let mut sheet = export_general(&set);
        let name_col = sheet.column("name").unwrap();
        sheet.rows[0][name_col] = CellValue::Text("Grand Habitat".to_string());

        let fused = fuse_general(&set, &sheet).unwrap();
        assert_eq!(
            fused.get("hab_a").unwrap().name,
            Some(Value::from("Grand Habitat"))
        );
    }

    #[test]
    fn test_new_record_created_once() {
        let set = sample_set();
        let mut sheet = export_general(&set);
        let mut row = sheet.rows[0].clone();
        row[0] = CellValue::Text("hab_new".to_string());
        sheet.rows.push(row);

        let fused = fuse_general(&set, &sheet).unwrap();
        assert_eq!(fused.len(), 3);
        assert_eq!(fused.modules[2].id, "hab_new");

        // Fusing the same sheet again must not duplicate the record
        let fused_again = fuse_general(&fused, &sheet).unwrap();
        assert_eq!(fused_again.len(), 3);
    }

    #[test]
    fn test_new_id_in_auxiliary_view_makes_shell() {
        let set = sample_set();
        let csv = format!(
            "id,{}\nghost_x,7{}\n",
            RESOURCES.join(","),
            ",".repeat(RESOURCES.len() - 1)
        );
        let sheet = read_sheet_str(&csv, "modules-construction.csv").unwrap();

        let fused = fuse_auxiliary(&set, &sheet, View::Construction).unwrap();
        let ghost = fused.get("ghost_x").unwrap();
        assert_eq!(ghost.name, None);
        assert_eq!(
            ghost.construction_resources.as_ref().unwrap().get("water"),
            Some(&7)
        );
    }

    #[test]
    fn test_default_time_left_implied() {
        // Cell equal to 20 with no pre-existing explicit value
        let set = sample_set();
        let fused = fuse_general(&set, &export_general(&set)).unwrap();
        assert_eq!(fused.get("hab_a").unwrap().construction_time, None);
    }

    #[test]
    fn test_placeholder_time_removes_explicit_value() {
        let set = sample_set();
        let mut sheet = export_general(&set);
        let ct_col = sheet.column("construction_time").unwrap();
        sheet.rows[1][ct_col] = CellValue::Blank; // ext_b had explicit 35

        let fused = fuse_general(&set, &sheet).unwrap();
        assert_eq!(fused.get("ext_b").unwrap().construction_time, None);
    }

    #[test]
    fn test_edited_time_becomes_explicit() {
        let set = sample_set();
        let mut sheet = export_general(&set);
        let ct_col = sheet.column("construction_time").unwrap();
        sheet.rows[0][ct_col] = CellValue::Integer(45);

        let fused = fuse_general(&set, &sheet).unwrap();
        assert_eq!(fused.get("hab_a").unwrap().construction_time, Some(45));
    }

    #[test]
    fn test_explicit_twenty_stays_explicit() {
        let mut set = sample_set();
        set.modules[0].construction_time = Some(20);

        let fused = fuse_general(&set, &export_general(&set)).unwrap();
        assert_eq!(fused.get("hab_a").unwrap().construction_time, Some(20));
    }

    #[test]
    fn test_edited_requirements_become_explicit() {
        let set = sample_set();
        let mut sheet = export_general(&set);
        let cr_col = sheet.column("clean_room").unwrap();
        sheet.rows[0][cr_col] = CellValue::Integer(2);

        let fused = fuse_general(&set, &sheet).unwrap();
        let requs = fused
            .get("hab_a")
            .unwrap()
            .construction_requirements
            .as_ref()
            .unwrap();
        assert_eq!(requs.get("clean_room"), Some(&2));
        // The implied entry is materialized alongside the edit
        assert_eq!(requs.get(IMPLIED_REQUIREMENT), Some(&1));
    }

    #[test]
    fn test_zero_cells_do_not_clear_requirements() {
        let set = sample_set();
        let mut sheet = export_general(&set);
        let gc_col = sheet.column("ground_connection").unwrap();
        sheet.rows[1][gc_col] = CellValue::Text(PLACEHOLDER.to_string());

        let fused = fuse_general(&set, &sheet).unwrap();
        let requs = fused
            .get("ext_b")
            .unwrap()
            .construction_requirements
            .as_ref()
            .unwrap();
        // Blanking the cell does not delete the stored entry
        assert_eq!(requs.get("ground_connection"), Some(&1));
    }

    #[test]
    fn test_stats_blank_does_not_clear_entry() {
        // The concrete scenario: blanking a nonzero stat cell leaves
        // the stored entry intact
        let set = sample_set();
        let mut sheet = export_stats(&set);
        let power_col = sheet.column("power").unwrap();
        assert_eq!(sheet.rows[0][power_col], CellValue::Integer(5));

        sheet.rows[0][power_col] = CellValue::Text(PLACEHOLDER.to_string());
        let fused = fuse_auxiliary(&set, &sheet, View::Stats).unwrap();
        assert_eq!(fused.get("hab_a").unwrap().add.as_ref().unwrap().get("power"), Some(&5));
    }

    #[test]
    fn test_auxiliary_coercion() {
        let set = sample_set();
        let mut sheet = export_stats(&set);
        let crew_col = sheet.column("crew").unwrap();
        let init_col = sheet.column("initiative").unwrap();
        sheet.rows[0][crew_col] = CellValue::Text("-3".to_string());
        sheet.rows[0][init_col] = CellValue::Text("garbage".to_string());

        // Re-parse through CSV so cells take the loose-typed path
        let rendered = crate::sheet::write_sheet_string(&sheet).unwrap();
        let reread = read_sheet_str(&rendered, "modules-stats.csv").unwrap();

        let fused = fuse_auxiliary(&set, &reread, View::Stats).unwrap();
        let add = fused.get("hab_a").unwrap().add.as_ref().unwrap();
        assert_eq!(add.get("crew"), Some(&-3));
        // Non-numeric text coerces to zero and writes nothing
        assert_eq!(add.get("initiative"), None);
    }

    #[test]
    fn test_all_zero_row_leaves_map_absent() {
        let set = sample_set();
        let sheet = export_construction(&set);
        let fused = fuse_auxiliary(&set, &sheet, View::Construction).unwrap();
        // Neither record has construction_resources in the sample
        assert!(fused.get("hab_a").unwrap().construction_resources.is_none());
        assert!(fused.get("ext_b").unwrap().construction_resources.is_none());
    }

    #[test]
    fn test_schema_mismatch_on_narrow_row() {
        let set = sample_set();
        let csv = "id,water,steel\nhab_a,1,2\n";
        let sheet = read_sheet_str(csv, "modules-construction.csv").unwrap();
        let err = fuse_auxiliary(&set, &sheet, View::Construction).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_schema_mismatch_on_missing_general_column() {
        let set = sample_set();
        let mut sheet = export_general(&set);
        let ct_col = sheet.column("construction_time").unwrap();
        sheet.header.remove(ct_col);
        for row in &mut sheet.rows {
            row.remove(ct_col);
        }
        let err = fuse_general(&set, &sheet).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }
}
