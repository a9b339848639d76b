//! Daemon library: CLI definition and command entry points.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{run_ingest, run_process, run_serve};
