//! End-to-end run: fetch, then ingest.

use log::{info, warn};
use meteorfall_core::{ClassificationPolicy, CoordinateResolver, RegionRegistry, RegionStore};
use thiserror::Error;

use crate::{IngestError, IngestReport, RecordSource, SourceError, ingest_records};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Records could not be fetched or decoded; no table was touched.
    #[error("failed to obtain records")]
    Source(#[from] SourceError),
    /// The orchestrator was driven out of order.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Fetch every record from `source` and ingest it into `store`.
///
/// The fetch completes before any table is reset. When it fails the store
/// is released untouched and the source error is returned.
///
/// # Errors
/// Returns [`PipelineError::Source`] when fetching or decoding fails.
///
/// # Examples
/// ```
/// use meteorfall_core::{ClassificationPolicy, DecimalResolver, RegionRegistry};
/// use meteorfall_data::{FileRecordSource, PipelineError, SqliteRegionStore, run_ingestion};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteRegionStore::open_in_memory()?;
/// let missing = FileRecordSource::new("does/not/exist.json");
/// let outcome = run_ingestion(
///     &missing,
///     &mut store,
///     RegionRegistry::world(),
///     ClassificationPolicy::MultiMatch,
///     DecimalResolver,
/// );
/// assert!(matches!(outcome, Err(PipelineError::Source(_))));
/// # Ok(())
/// # }
/// ```
pub fn run_ingestion<Src, S, R>(
    source: &Src,
    store: &mut S,
    registry: &RegionRegistry,
    policy: ClassificationPolicy,
    resolver: R,
) -> Result<IngestReport, PipelineError>
where
    Src: RecordSource + ?Sized,
    S: RegionStore + ?Sized,
    R: CoordinateResolver,
{
    let origin = source.describe();
    info!("Fetching records from {origin} (policy: {policy})");
    let records = match source.fetch_records() {
        Ok(records) => records,
        Err(err) => {
            warn!("Aborting run before any table was reset: {err}");
            if let Err(release) = store.release() {
                warn!("Failed to release store: {release}");
            }
            return Err(err.into());
        }
    };
    info!("Fetched {} records from {origin}", records.len());
    Ok(ingest_records(store, registry, policy, resolver, records)?)
}
