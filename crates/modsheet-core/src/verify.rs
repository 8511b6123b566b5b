//! Reconciliation verifier: the engine's correctness oracle
//!
//! Exports the collection, fuses the unedited sheets back into a fresh
//! copy, and structurally diffs the result against the original. Map
//! fields compare order-insensitively; record order is significant.

use crate::error::Result;
use crate::export::export_views;
use crate::fuse::fuse_views;
use crate::store::{ModuleRecord, ModuleSet};
use serde::Serialize;

/// One structural difference between the original collection and its
/// round-tripped counterpart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Divergence {
    /// Record position in the collection
    pub index: usize,
    /// Record id (of the original side where it exists)
    pub id: String,
    /// Field that differs
    pub field: String,
    /// Original value, rendered
    pub expected: String,
    /// Round-tripped value, rendered
    pub actual: String,
}

impl std::fmt::Display for Divergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record {} ('{}'), field '{}': expected {}, got {}",
            self.index, self.id, self.field, self.expected, self.actual
        )
    }
}

/// Export then fuse the collection and report every divergence.
/// An empty report means the round trip was lossless.
pub fn verify_round_trip(set: &ModuleSet) -> Result<Vec<Divergence>> {
    let sheets = export_views(set);
    let fused = fuse_views(set, &sheets)?;
    Ok(diff_sets(set, &fused))
}

/// Structurally compare two collections
pub fn diff_sets(original: &ModuleSet, round_tripped: &ModuleSet) -> Vec<Divergence> {
    let mut report = Vec::new();

    if original.len() != round_tripped.len() {
        report.push(Divergence {
            index: original.len().min(round_tripped.len()),
            id: String::new(),
            field: "modules".to_string(),
            expected: format!("{} records", original.len()),
            actual: format!("{} records", round_tripped.len()),
        });
    }

    for (index, (a, b)) in original
        .modules
        .iter()
        .zip(&round_tripped.modules)
        .enumerate()
    {
        diff_record(index, a, b, &mut report);
    }

    report
}

fn diff_record(index: usize, a: &ModuleRecord, b: &ModuleRecord, report: &mut Vec<Divergence>) {
    let mut push = |field: &str, expected: String, actual: String| {
        report.push(Divergence {
            index,
            id: a.id.clone(),
            field: field.to_string(),
            expected,
            actual,
        });
    };

    if a.id != b.id {
        push("id", render(&a.id), render(&b.id));
    }
    if a.name != b.name {
        push("name", render(&a.name), render(&b.name));
    }
    if a.description != b.description {
        push("description", render(&a.description), render(&b.description));
    }
    if a.kind != b.kind {
        push("type", render(&a.kind), render(&b.kind));
    }
    if a.mass != b.mass {
        push("mass", render(&a.mass), render(&b.mass));
    }
    if a.power != b.power {
        push("power", render(&a.power), render(&b.power));
    }
    if a.construction_requirements != b.construction_requirements {
        push(
            "construction_requirements",
            render(&a.construction_requirements),
            render(&b.construction_requirements),
        );
    }
    if a.construction_time != b.construction_time {
        push(
            "construction_time",
            render(&a.construction_time),
            render(&b.construction_time),
        );
    }
    if a.construction_resources != b.construction_resources {
        push(
            "construction_resources",
            render(&a.construction_resources),
            render(&b.construction_resources),
        );
    }
    if a.produce != b.produce {
        push("produce", render(&a.produce), render(&b.produce));
    }
    if a.add != b.add {
        push("add", render(&a.add), render(&b.add));
    }
    if a.extra != b.extra {
        push("extra", render(&a.extra), render(&b.extra));
    }
}

fn render<T: Serialize>(value: &T) -> String {
    match serde_yaml::to_string(value) {
        Ok(s) => s.trim_end().to_string(),
        Err(_) => "<unrenderable>".to_string(),
    }
}
