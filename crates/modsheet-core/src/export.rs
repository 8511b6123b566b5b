//! View exporter: projects the module store into the four flat sheets
//!
//! All exporters are pure functions over the collection. Cells with no
//! explicit entry get the single-space placeholder so the fuser can
//! tell "never set" from an explicit zero after the file has been
//! through a table editor.

use crate::schema::{View, DEFAULT_CONSTRUCTION_TIME, FACILITIES, IMPLIED_REQUIREMENT, IMPLIED_REQUIREMENT_LEVEL, RESOURCES};
use crate::store::{MapField, ModuleSet};
use crate::table::{CellValue, Sheet, PLACEHOLDER};
use indexmap::IndexMap;
use serde_yaml::Value;

/// The four sheets produced by one export pass
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSheets {
    pub general: Sheet,
    pub construction: Sheet,
    pub production: Sheet,
    pub stats: Sheet,
}

impl ViewSheets {
    pub fn get(&self, view: View) -> &Sheet {
        match view {
            View::General => &self.general,
            View::Construction => &self.construction,
            View::Production => &self.production,
            View::Stats => &self.stats,
        }
    }
}

/// Export all four views
pub fn export_views(set: &ModuleSet) -> ViewSheets {
    ViewSheets {
        general: export_general(set),
        construction: export_construction(set),
        production: export_production(set),
        stats: export_stats(set),
    }
}

/// Export a single view
pub fn export_view(set: &ModuleSet, view: View) -> Sheet {
    match view {
        View::General => export_general(set),
        View::Construction => export_construction(set),
        View::Production => export_production(set),
        View::Stats => export_stats(set),
    }
}

/// Identity, power, facility requirements and construction time
pub fn export_general(set: &ModuleSet) -> Sheet {
    let mut sheet = Sheet::new(View::General.header());
    let implied: IndexMap<String, i64> = IndexMap::from([(
        IMPLIED_REQUIREMENT.to_string(),
        IMPLIED_REQUIREMENT_LEVEL,
    )]);

    for record in &set.modules {
        let mut row = vec![CellValue::Text(record.id.clone())];
        row.push(scalar_cell(record.name.as_ref()));
        row.push(scalar_cell(record.description.as_ref()));
        row.push(scalar_cell(record.kind.as_ref()));
        row.push(scalar_cell(record.mass.as_ref()));
        row.push(scalar_cell(record.power.as_ref()));

        let requirements = record.construction_requirements.as_ref().unwrap_or(&implied);
        for facility in FACILITIES {
            row.push(match requirements.get(facility) {
                Some(&level) => CellValue::Integer(level),
                None => placeholder(),
            });
        }

        row.push(CellValue::Integer(
            record.construction_time.unwrap_or(DEFAULT_CONSTRUCTION_TIME),
        ));

        sheet.rows.push(row);
    }
    sheet
}

/// Resources consumed at build time
pub fn export_construction(set: &ModuleSet) -> Sheet {
    export_auxiliary(set, View::Construction, MapField::ConstructionResources, &RESOURCES)
}

/// Resources generated during operation
pub fn export_production(set: &ModuleSet) -> Sheet {
    export_auxiliary(set, View::Production, MapField::Produce, &RESOURCES)
}

/// Stat modifiers
pub fn export_stats(set: &ModuleSet) -> Sheet {
    let stats = crate::schema::stat_names();
    export_auxiliary(set, View::Stats, MapField::Add, &stats)
}

fn export_auxiliary(
    set: &ModuleSet,
    view: View,
    field: MapField,
    vocabulary: &[&str],
) -> Sheet {
    let mut sheet = Sheet::new(view.header());
    for record in &set.modules {
        let mut row = Vec::with_capacity(vocabulary.len() + 1);
        row.push(CellValue::Text(record.id.clone()));

        for &name in vocabulary {
            let cell = record
                .map_field(field)
                .and_then(|map| map.get(name))
                .map(|&v| CellValue::Integer(v))
                .unwrap_or_else(placeholder);
            row.push(cell);
        }
        sheet.rows.push(row);
    }
    sheet
}

fn placeholder() -> CellValue {
    CellValue::Text(PLACEHOLDER.to_string())
}

/// Render a stored scalar as a sheet cell; absent fields become the
/// empty string (not the placeholder; only vocabulary columns carry it)
fn scalar_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Blank,
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else {
                CellValue::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        Some(Value::String(s)) => CellValue::Text(s.clone()),
        Some(Value::Bool(b)) => CellValue::Text(b.to_string()),
        Some(other) => CellValue::Text(
            serde_yaml::to_string(other)
                .unwrap_or_default()
                .trim_end()
                .to_string(),
        ),
    }
}
