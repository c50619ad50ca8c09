//! Command-line interface for the Meteorfall ingestion pipeline.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod ingest;
mod regions;

pub use error::CliError;

use ingest::IngestArgs;

pub(crate) const ARG_SOURCE_URL: &str = "source-url";
pub(crate) const ARG_SOURCE_FILE: &str = "source-file";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_POLICY: &str = "policy";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_ALLOW_PARTIAL: &str = "allow-partial";

/// Run the Meteorfall CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Ingest(args) => ingest::run_ingest_with(args, &mut stdout),
        Command::Regions => regions::write_regions(&mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "meteorfall",
    about = "Sort meteorite landings into regional SQLite tables",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch landing records and rebuild the regional tables.
    Ingest(IngestArgs),
    /// List the world regions and their bounding boxes.
    Regions,
}

#[cfg(test)]
mod tests;
