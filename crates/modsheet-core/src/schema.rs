//! Static vocabularies and per-view column layouts
//!
//! Column order is the join contract between a sheet row's positional
//! cells and the semantic fields of a module record. It must not change
//! between an export and the import of the edited file.

/// Scalar identity fields exported verbatim in the general view.
pub const IDENTITY_FIELDS: [&str; 5] = ["id", "name", "description", "type", "mass"];

/// Facilities a planet can provide; construction requirements map into these.
pub const FACILITIES: [&str; 13] = [
    "ground_connection",
    "thermal_control",
    "industrial_admin",
    "industrial_storage",
    "industrial_manufacturing",
    "industrial_dock",
    "cryogenics_facility",
    "clean_room",
    "bio_manufacturing",
    "arms_manufacturing",
    "precision_manufacturing",
    "nuclear_enrichment",
    "military_training",
];

/// Resources consumed by construction or produced during operation.
pub const RESOURCES: [&str; 15] = [
    "water",
    "hydrogen",
    "oxygen",
    "rock",
    "iron_ore",
    "steel",
    "aluminium_ore",
    "aluminium",
    "food",
    "biomass",
    "waste",
    "co2",
    "carbon",
    "polymers",
    "electronics",
];

/// Combat and economy stats a module can modify directly.
pub const INTRINSIC_STATS: [&str; 11] = [
    "power",
    "initiative",
    "kinetic_hp",
    "energy_hp",
    "crew",
    "kinetic_offense",
    "ordnance_offense",
    "boarding_offense",
    "kinetic_defense",
    "ordnance_defense",
    "boarding_defense",
];

/// A record with no explicit requirements implies this single entry.
pub const IMPLIED_REQUIREMENT: &str = "industrial_manufacturing";
pub const IMPLIED_REQUIREMENT_LEVEL: i64 = 1;

/// Implied construction time when no explicit value is stored.
pub const DEFAULT_CONSTRUCTION_TIME: i64 = 20;

/// Stat vocabulary: intrinsic stats followed by the facility names.
pub fn stat_names() -> Vec<&'static str> {
    INTRINSIC_STATS
        .iter()
        .chain(FACILITIES.iter())
        .copied()
        .collect()
}

/// One of the four flat projections of the module store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    General,
    Construction,
    Production,
    Stats,
}

impl View {
    /// All views, in the order the import pass must process them
    pub const ALL: [View; 4] = [
        View::General,
        View::Construction,
        View::Production,
        View::Stats,
    ];

    /// File-name fragment for this view
    pub fn name(self) -> &'static str {
        match self {
            View::General => "general",
            View::Construction => "construction",
            View::Production => "production",
            View::Stats => "stats",
        }
    }

    /// Parse a view from its name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "general" => Some(View::General),
            "construction" => Some(View::Construction),
            "production" => Some(View::Production),
            "stats" => Some(View::Stats),
            _ => None,
        }
    }

    /// Vocabulary backing this view's value columns
    pub fn vocabulary(self) -> Vec<&'static str> {
        match self {
            View::General => FACILITIES.to_vec(),
            View::Construction | View::Production => RESOURCES.to_vec(),
            View::Stats => stat_names(),
        }
    }

    /// Fixed header row for this view
    pub fn header(self) -> Vec<String> {
        let mut header: Vec<String> = Vec::new();
        match self {
            View::General => {
                header.extend(IDENTITY_FIELDS.iter().map(|s| s.to_string()));
                header.push("power".to_string());
                header.extend(FACILITIES.iter().map(|s| s.to_string()));
                header.push("construction_time".to_string());
            }
            _ => {
                header.push("id".to_string());
                header.extend(self.vocabulary().iter().map(|s| s.to_string()));
            }
        }
        header
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
