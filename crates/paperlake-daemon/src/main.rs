//! PaperLake daemon.
//!
//! Two-stage article pipeline: ingest raw search results into the bronze
//! layer, process them into cleaned, embedded silver records.
//!
//! # Usage
//!
//! ```bash
//! paperlake serve [--port PORT] [--db-path PATH]
//! paperlake ingest [QUERY] [--max-results N]
//! paperlake process [--limit N]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/paperlake/config.toml)
//! 3. CLI-specified config file
//! 4. Environment variables (PAPERLAKE_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use paperlake_daemon::{run_ingest, run_process, run_serve, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, db_path } => {
            run_serve(
                cli.config.as_deref(),
                port,
                db_path.as_deref(),
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Ingest { query, max_results } => {
            run_ingest(
                cli.config.as_deref(),
                query.as_deref(),
                max_results,
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Process { limit } => {
            run_process(cli.config.as_deref(), limit, cli.log_level.as_deref()).await?;
        }
    }

    Ok(())
}
