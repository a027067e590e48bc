//! mdpress: publish a Markdown manifest to a WordPress site.
//!
//! # Usage
//!
//! ```text
//! mdpress sync [--config PATH] [--state PATH] [--dry-run] [--force] [--json|--table]
//! mdpress check-config [--config PATH]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check_config::CheckConfigArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mdpress",
    version,
    about = "Publish Markdown documents from a manifest to WordPress pages",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the manifest and publish every changed document.
    Sync(SyncArgs),

    /// Validate the config file and show the resolved settings.
    CheckConfig(CheckConfigArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::CheckConfig(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
