//! bizsync CLI
//!
//! Command-line tools for a bizsync file store.
//!
//! # Commands
//!
//! - `export` - Write a full snapshot bundle
//! - `validate` - Check a bundle without touching the store
//! - `preview` - Show what importing a bundle would change
//! - `import` - Merge a bundle into the store
//! - `status` - Show the sync cursor and pending changes

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// bizsync command-line data tools.
#[derive(Parser)]
#[command(name = "bizsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a snapshot of every collection to a bundle file
    Export {
        /// Output bundle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate a bundle file
    Validate {
        /// Bundle file to check
        file: PathBuf,
    },

    /// Show what importing a bundle would do, without changing anything
    Preview {
        /// Bundle file to preview
        file: PathBuf,

        /// Also plan deletion of local records missing from the bundle
        #[arg(short, long)]
        delete_orphans: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Merge a bundle into the store
    Import {
        /// Bundle file to import
        file: PathBuf,

        /// Delete local records missing from the bundle
        #[arg(short, long)]
        delete_orphans: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the sync cursor and records changed since the last sync
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Export { output } => {
            let path = cli.path.ok_or("Store path required for export")?;
            commands::export::run(&path, &output)?;
        }
        Commands::Validate { file } => {
            commands::validate::run(&file)?;
        }
        Commands::Preview {
            file,
            delete_orphans,
            format,
        } => {
            let path = cli.path.ok_or("Store path required for preview")?;
            commands::import::preview(&path, &file, delete_orphans, &format)?;
        }
        Commands::Import {
            file,
            delete_orphans,
            format,
        } => {
            let path = cli.path.ok_or("Store path required for import")?;
            commands::import::apply(&path, &file, delete_orphans, &format)?;
        }
        Commands::Status { format } => {
            let path = cli.path.ok_or("Store path required for status")?;
            commands::status::run(&path, &format)?;
        }
        Commands::Version => {
            println!("bizsync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("bizsync model v{}", bizsync_model::VERSION);
            println!("Bundle format v{}", bizsync_transfer::EXPORT_VERSION);
        }
    }

    Ok(())
}
