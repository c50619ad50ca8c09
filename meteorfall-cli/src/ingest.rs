//! Ingest command implementation for the Meteorfall CLI.

use std::{io::Write, time::Duration};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{info, warn};
use meteorfall_core::{ClassificationPolicy, DecimalResolver, RegionRegistry};
use meteorfall_data::{
    DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, FileRecordSource, HttpRecordSource,
    HttpRecordSourceConfig, IngestReport, RecordSource, SqliteRegionStore, run_ingestion,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ALLOW_PARTIAL, ARG_DATABASE, ARG_POLICY, ARG_SOURCE_FILE, ARG_SOURCE_URL,
    ARG_TIMEOUT_SECS, CliError,
};

/// Database written when no path is configured.
pub(crate) const DEFAULT_DATABASE: &str = "meteorite_db_all.db";

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch meteorite landing records, classify each one into the \
                 world regions by its coordinates, and rebuild one SQLite \
                 table per region. Options can come from CLI flags, \
                 configuration files, or METEORFALL_* environment variables.",
    about = "Rebuild the regional meteorite tables"
)]
#[ortho_config(prefix = "METEORFALL")]
pub(crate) struct IngestArgs {
    /// URL of the JSON record feed (defaults to the NASA landings dataset).
    #[arg(long = ARG_SOURCE_URL, value_name = "url", conflicts_with = "source_file")]
    #[serde(default)]
    pub(crate) source_url: Option<String>,
    /// Read records from a local JSON file instead of the network.
    #[arg(long = ARG_SOURCE_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) source_file: Option<Utf8PathBuf>,
    /// SQLite database to rebuild.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Assignment for records inside overlapping regions.
    #[arg(long = ARG_POLICY, value_name = "multi-match|first-match")]
    #[serde(default)]
    pub(crate) policy: Option<ClassificationPolicy>,
    /// Request timeout for the HTTP source, in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Exit successfully even when individual records or tables failed.
    #[arg(
        long = ARG_ALLOW_PARTIAL,
        value_name = "bool",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) allow_partial: Option<bool>,
}

impl IngestArgs {
    pub(crate) fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Where the run reads its records from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SourceLocation {
    Url(String),
    File(Utf8PathBuf),
}

/// Resolved `ingest` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    pub(crate) source: SourceLocation,
    pub(crate) database: Utf8PathBuf,
    pub(crate) policy: ClassificationPolicy,
    pub(crate) timeout: Duration,
    pub(crate) allow_partial: bool,
}

impl IngestConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.source {
            SourceLocation::File(path) => Self::require_existing(path, ARG_SOURCE_FILE),
            SourceLocation::Url(_) => Ok(()),
        }
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match meteorfall_fs::is_regular_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn build_source(&self) -> Result<Box<dyn RecordSource>, CliError> {
        match &self.source {
            SourceLocation::File(path) => Ok(Box::new(FileRecordSource::new(path.clone()))),
            SourceLocation::Url(url) => {
                let config = HttpRecordSourceConfig::new(url.clone()).with_timeout(self.timeout);
                let source = HttpRecordSource::with_config(config).map_err(|source| {
                    CliError::BuildSource {
                        url: url.clone(),
                        source,
                    }
                })?;
                Ok(Box::new(source))
            }
        }
    }
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let source = match (args.source_url, args.source_file) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingSources {
                    url_field: ARG_SOURCE_URL,
                    file_field: ARG_SOURCE_FILE,
                });
            }
            (None, Some(path)) => SourceLocation::File(path),
            (url, None) => {
                SourceLocation::Url(url.unwrap_or_else(|| DEFAULT_SOURCE_URL.to_owned()))
            }
        };

        let timeout_secs = args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(CliError::NonPositive {
                field: ARG_TIMEOUT_SECS,
            });
        }

        Ok(Self {
            source,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            policy: args.policy.unwrap_or_default(),
            timeout: Duration::from_secs(timeout_secs),
            allow_partial: args.allow_partial.unwrap_or(false),
        })
    }
}

pub(crate) fn run_ingest_with(args: IngestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = resolve_ingest_config(args)?;
    let report = execute_ingest(&config)?;
    write_summary(writer, &config, &report)?;

    let failures = report.failures.len();
    if failures > 0 {
        if config.allow_partial {
            warn!("Accepting partial run with {failures} recorded failure(s)");
        } else {
            return Err(CliError::IncompleteRun { failures });
        }
    }
    Ok(())
}

pub(crate) fn resolve_ingest_config(args: IngestArgs) -> Result<IngestConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_ingest(config: &IngestConfig) -> Result<IngestReport, CliError> {
    let source = config.build_source()?;
    let mut store = SqliteRegionStore::open(&config.database).map_err(CliError::OpenDatabase)?;
    info!("Writing regional tables to {}", store.location());
    let report = run_ingestion(
        source.as_ref(),
        &mut store,
        RegionRegistry::world(),
        config.policy,
        DecimalResolver,
    )?;
    Ok(report)
}

pub(crate) fn write_summary(
    writer: &mut dyn Write,
    config: &IngestConfig,
    report: &IngestReport,
) -> Result<(), CliError> {
    let mut emit = |line: String| writeln!(writer, "{line}").map_err(CliError::WriteOutput);

    emit(format!(
        "Ingested {} record(s) into {} (policy: {})",
        report.records_seen, config.database, config.policy
    ))?;
    for count in &report.rows_written {
        emit(format!("  {:<18} {:>6}", count.region.as_str(), count.rows))?;
    }
    emit(format!(
        "Unlocated: {}, outside every region: {}, rejected: {}, failures: {}",
        report.unlocated,
        report.outside_regions,
        report.rejected,
        report.failures.len()
    ))?;
    for failure in &report.failures {
        emit(format!("  failure: {failure}"))?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<IngestConfig, CliError> {
    let merged = IngestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    IngestConfig::try_from(merged)
}

