//! modsheet CLI
//!
//! Command-line tool for exporting module balance data to spreadsheet
//! views, importing edited views back, and verifying that the round
//! trip is lossless.

use clap::{Parser, Subcommand};
use modsheet_core::{
    export_view, export_views, fuse_views, read_sheet, sheet_file_name, verify_round_trip,
    write_sheet, ModuleSet, View, ViewSheets,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "modsheet")]
#[command(about = "Ship module balance-sheet sync tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the four spreadsheet views from the module store
    Export {
        /// Path to the module store
        #[arg(long, default_value = "data/modules.yaml")]
        store: PathBuf,

        /// Directory the sheet files are written to
        #[arg(long, default_value = "data/sheets")]
        sheets: PathBuf,
    },

    /// Import edited spreadsheet views back into the module store
    Import {
        /// Path to the module store
        #[arg(long, default_value = "data/modules.yaml")]
        store: PathBuf,

        /// Directory the sheet files are read from
        #[arg(long, default_value = "data/sheets")]
        sheets: PathBuf,
    },

    /// Round-trip the store through export and import and report
    /// any divergence (exits nonzero if one is found)
    Verify {
        /// Path to the module store
        #[arg(long, default_value = "data/modules.yaml")]
        store: PathBuf,

        /// Write the divergence report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print one view as a table without writing any files
    Show {
        /// Path to the module store
        #[arg(long, default_value = "data/modules.yaml")]
        store: PathBuf,

        /// View to print (general, construction, production, stats)
        #[arg(short, long)]
        view: String,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> modsheet_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export { store, sheets } => cmd_export(&store, &sheets),
        Commands::Import { store, sheets } => cmd_import(&store, &sheets),
        Commands::Verify { store, report } => cmd_verify(&store, report.as_deref()),
        Commands::Show { store, view, limit } => cmd_show(&store, &view, limit),
    }
}

fn sheet_path(dir: &Path, view: View) -> PathBuf {
    dir.join(sheet_file_name(view))
}

fn cmd_export(store_path: &Path, sheets_dir: &Path) -> modsheet_core::Result<()> {
    let set = ModuleSet::load(store_path)?;

    // Build every sheet before touching the filesystem
    let sheets = export_views(&set);

    fs::create_dir_all(sheets_dir)?;
    for view in View::ALL {
        let path = sheet_path(sheets_dir, view);
        write_sheet(sheets.get(view), &path)?;
        println!("Wrote {} ({} rows)", path.display(), sheets.get(view).row_count());
    }

    println!("Exported {} modules to {}", set.len(), sheets_dir.display());
    Ok(())
}

fn cmd_import(store_path: &Path, sheets_dir: &Path) -> modsheet_core::Result<()> {
    let set = ModuleSet::load(store_path)?;

    // Read and fuse everything first; the store is only rewritten
    // after the whole batch has succeeded.
    let sheets = ViewSheets {
        general: read_sheet(sheet_path(sheets_dir, View::General))?,
        construction: read_sheet(sheet_path(sheets_dir, View::Construction))?,
        production: read_sheet(sheet_path(sheets_dir, View::Production))?,
        stats: read_sheet(sheet_path(sheets_dir, View::Stats))?,
    };

    let fused = fuse_views(&set, &sheets)?;
    fused.save(store_path)?;

    let created = fused.len() - set.len();
    println!("Imported 4 views into {}", store_path.display());
    println!("  {} modules ({} newly created)", fused.len(), created);
    Ok(())
}

fn cmd_verify(store_path: &Path, report_path: Option<&Path>) -> modsheet_core::Result<()> {
    let set = ModuleSet::load(store_path)?;
    let report = verify_round_trip(&set)?;

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)
            .map_err(modsheet_core::Error::Json)?;
        fs::write(path, json)?;
        println!("Wrote report to {}", path.display());
    }

    if report.is_empty() {
        println!("OK: {} modules round-trip losslessly", set.len());
        return Ok(());
    }

    eprintln!("Round trip diverged in {} place(s):", report.len());
    for divergence in &report {
        eprintln!("  {}", divergence);
    }
    std::process::exit(1);
}

fn cmd_show(store_path: &Path, view_name: &str, limit: Option<usize>) -> modsheet_core::Result<()> {
    let view = match View::from_name(view_name) {
        Some(v) => v,
        None => {
            eprintln!(
                "Unknown view: {}. Supported views: general, construction, production, stats",
                view_name
            );
            std::process::exit(1);
        }
    };

    let set = ModuleSet::load(store_path)?;
    let sheet = export_view(&set, view);

    println!("{}", sheet.header.join("\t"));
    println!("{}", "-".repeat(sheet.header.len() * 12));

    let row_limit = limit.unwrap_or(sheet.row_count());
    for row in sheet.rows.iter().take(row_limit) {
        let values: Vec<String> = row.iter().map(|c| c.to_string_value()).collect();
        println!("{}", values.join("\t"));
    }

    if sheet.row_count() > row_limit {
        println!("... ({} more rows)", sheet.row_count() - row_limit);
    }

    Ok(())
}
