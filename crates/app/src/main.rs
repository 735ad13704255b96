use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "recibo", version, about = "Receipt OCR extraction and batch renaming")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract vendor, date and amount from a single receipt image or PDF
    Extract {
        /// Path to the receipt file
        path: PathBuf,
        /// Use this vendor name instead of extracting one
        #[arg(long)]
        vendor: Option<String>,
        /// Print detected file details and the raw OCR transcript
        #[arg(long)]
        debug: bool,
    },
    /// Rename every receipt in a folder after its extracted details
    Batch {
        /// Folder containing receipt files
        folder: PathBuf,
        /// Vendor name applied to every file
        vendor_name: String,
        /// Preview renames without touching any file
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    // Progress goes to stderr so stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Extract { path, vendor, debug } => {
            commands::extract(&path, vendor.as_deref(), debug)
        }
        Command::Batch { folder, vendor_name, dry_run } => {
            commands::batch(&folder, &vendor_name, dry_run)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
