//! Validate command.

use super::load_bundle;
use std::path::Path;
use tracing::info;

/// Checks a bundle file and prints its metadata.
pub fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Validating bundle {:?}", file);

    let bundle = load_bundle(file)?;
    let metadata = bundle.metadata();

    println!("✓ Bundle is valid");
    println!("  Version: {}", metadata.version);
    println!("  Exported at: {}", metadata.exported_at);
    println!("  App: {}", metadata.app_name);
    println!("  Records: {}", bundle.record_count());

    Ok(())
}
