//! Export command.

use bizsync_model::EntityKind;
use bizsync_store::FileStore;
use bizsync_transfer::Exporter;
use std::path::Path;
use tracing::info;

/// Writes a snapshot of the store at `store_path` to `output_path`.
pub fn run(store_path: &Path, output_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Exporting {:?}", store_path);

    let store = FileStore::open(store_path)?;
    let bundle = Exporter::new(&store).export()?;
    bundle.write_to(output_path)?;

    println!("✓ Export written");
    println!("  Path: {:?}", output_path);
    println!("  Exported at: {}", bundle.metadata().exported_at);
    println!("  Records: {}", bundle.record_count());
    for kind in EntityKind::ALL {
        println!(
            "    {:<16} {}",
            kind.local_collection(),
            bundle.records(kind).len()
        );
    }

    Ok(())
}
