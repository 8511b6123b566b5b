//! modsheet-core: Core library for the module balance-sheet sync engine
//!
//! This library provides functionality to:
//! - Load and save the nested YAML store of ship module records
//! - Export the store into four flat CSV views for spreadsheet editing
//! - Fuse edited views back into the store without losing unprojected data
//! - Verify that an export/import round trip reproduces the store exactly

pub mod error;
pub mod export;
pub mod fuse;
pub mod schema;
pub mod sheet;
pub mod store;
pub mod table;
pub mod verify;

pub use error::{Error, Result};
pub use export::{export_view, export_views, ViewSheets};
pub use fuse::{fuse_auxiliary, fuse_general, fuse_views};
pub use schema::View;
pub use sheet::{read_sheet, read_sheet_str, sheet_file_name, write_sheet, write_sheet_string};
pub use store::{MapField, ModuleRecord, ModuleSet};
pub use table::{CellValue, Sheet, PLACEHOLDER};
pub use verify::{diff_sets, verify_round_trip, Divergence};
