//! CLI argument parsing for the PaperLake daemon.

use clap::{Parser, Subcommand};

/// PaperLake Daemon
///
/// Ingests article metadata into an append-only raw store and derives
/// cleaned, embedded records from it.
#[derive(Parser, Debug)]
#[command(name = "paperlake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/paperlake/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP service
    Serve {
        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override database path
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Run one ingestion pass and exit
    Ingest {
        /// Search query (default from config)
        query: Option<String>,

        /// Maximum articles to collect
        #[arg(short, long)]
        max_results: Option<usize>,
    },

    /// Run one processing pass and exit
    Process {
        /// Maximum items to process
        #[arg(long)]
        limit: Option<usize>,
    },
}
