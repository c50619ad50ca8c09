//! Error types emitted by the Meteorfall CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use meteorfall_core::StoreError;
use meteorfall_data::{PipelineError, SourceBuildError};
use thiserror::Error;

/// Errors emitted by the Meteorfall CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// Both a URL and a file were configured as the record source.
    #[error("set only one of --{url_field} or --{file_field}")]
    ConflictingSources {
        url_field: &'static str,
        file_field: &'static str,
    },
    /// A numeric option was outside its accepted range.
    #[error("--{field} must be greater than zero")]
    NonPositive { field: &'static str },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Constructing the HTTP record source failed.
    #[error("failed to build record source for {url:?}: {source}")]
    BuildSource {
        url: String,
        #[source]
        source: SourceBuildError,
    },
    /// Opening the SQLite database failed.
    #[error(transparent)]
    OpenDatabase(StoreError),
    /// The run aborted before loading.
    #[error("ingestion aborted: {0}")]
    Pipeline(#[from] PipelineError),
    /// The run completed but recorded failures.
    #[error("ingestion recorded {failures} failure(s); rerun with --allow-partial to accept")]
    IncompleteRun { failures: usize },
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Help and version requests surface as [`CliError::ArgumentParsing`] but
    /// are not failures, so they map to `0`.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ArgumentParsing(err) => err.exit_code(),
            _ => 1,
        }
    }
}
