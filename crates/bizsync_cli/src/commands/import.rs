//! Preview and import commands.

use super::load_bundle;
use bizsync_reconcile::{ApplyReport, Classification, ReconciliationPlan};
use bizsync_store::FileStore;
use bizsync_transfer::{ImportEngine, ImportOptions};
use std::path::Path;
use tracing::info;

/// Prints what importing `file` into the store would do.
pub fn preview(
    store_path: &Path,
    file: &Path,
    delete_orphans: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Previewing import of {:?} into {:?}", file, store_path);

    let bundle = load_bundle(file)?;
    let store = FileStore::open(store_path)?;
    let options = ImportOptions::new().with_delete_orphans(delete_orphans);
    let plan = ImportEngine::new(&store).preview(&bundle, &options)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        _ => {
            print_plan(&plan);
        }
    }

    Ok(())
}

/// Imports `file` into the store and prints the audit log.
///
/// Record-level failures are printed and turn the exit status into an
/// error; everything listed in the audit log was applied regardless.
pub fn apply(
    store_path: &Path,
    file: &Path,
    delete_orphans: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Importing {:?} into {:?}", file, store_path);

    let bundle = load_bundle(file)?;
    let store = FileStore::open(store_path)?;
    let options = ImportOptions::new().with_delete_orphans(delete_orphans);
    let report = ImportEngine::new(&store).apply(&bundle, &options)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print_report(&report);
        }
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} records failed to import", report.errors.len()).into())
    }
}

fn print_plan(plan: &ReconciliationPlan) {
    println!("Import Preview");
    println!("==============");
    print_section("Add", &plan.to_add);
    print_section("Update", &plan.to_update);
    print_section("Skip", &plan.to_skip);
    print_section("Delete", &plan.to_delete);
    println!(
        "{} changes, {} unchanged",
        plan.change_count(),
        plan.to_skip.len()
    );
}

fn print_section(title: &str, entries: &[Classification]) {
    if entries.is_empty() {
        return;
    }
    println!("{title} ({}):", entries.len());
    for entry in entries {
        println!(
            "  {:<12} {:<24} {}",
            entry.kind.label(),
            entry.name,
            entry.reason
        );
    }
}

fn print_report(report: &ApplyReport) {
    if report.is_clean() {
        println!("✓ Import applied");
    } else {
        println!("✗ Import applied with {} errors", report.errors.len());
    }
    for entry in &report.audit {
        println!(
            "  {:<6} {:<12} {:<24} {}",
            entry.action, entry.entity_type, entry.entity_name, entry.reason
        );
    }
    for error in &report.errors {
        println!("  error: {error}");
    }
}
