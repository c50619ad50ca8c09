//! Shared test harness modules for the Meteorfall CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::ingest::{
    DEFAULT_DATABASE, IngestArgs, IngestConfig, SourceLocation, config_from_layers_for_test,
    run_ingest_with, write_summary,
};

mod helpers;
