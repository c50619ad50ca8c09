//! The ingestion orchestrator.
//!
//! [`RegionIngestor`] drives one run against a borrowed [`RegionStore`]:
//!
//! ```text
//! Idle --reset_tables--> TablesReset --load--> Loading --close--> Closed
//!                             |                  ^  |
//!                             +------close-------|--+
//!                                                load
//! ```
//!
//! Store and parse failures are recorded in the [`IngestReport`] and the
//! run carries on. The store is released exactly once: by
//! [`RegionIngestor::close`], or on drop when the run is abandoned.

mod report;


use std::fmt;

use log::{debug, info, warn};
use meteorfall_core::{
    Classification, ClassificationPolicy, Classifier, CoordinateResolver, Record,
    RegionRegistry, RegionRow, RegionStore,
};
use thiserror::Error;

pub use report::{IngestFailure, IngestReport, RegionCount};

/// Lifecycle position of a [`RegionIngestor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    /// Nothing has touched the store yet.
    Idle,
    /// Every region's table has been reset.
    TablesReset,
    /// At least one batch of records has been loaded.
    Loading,
    /// The store has been finalised and released.
    Closed,
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::TablesReset => "tables reset",
            Self::Loading => "loading",
            Self::Closed => "closed",
        })
    }
}

/// Errors returned when the orchestrator is driven out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The operation is not valid in the current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// State the ingestor was in.
        state: IngestState,
        /// Rejected operation.
        operation: &'static str,
    },
}

/// Resets, loads and closes the regional tables for one run.
///
/// # Examples
/// ```
/// use meteorfall_core::{ClassificationPolicy, Classifier, DecimalResolver, Record, RegionRegistry};
/// use meteorfall_data::{RegionIngestor, SqliteRegionStore};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteRegionStore::open_in_memory()?;
/// let classifier = Classifier::new(
///     RegionRegistry::world(),
///     ClassificationPolicy::MultiMatch,
///     DecimalResolver,
/// );
/// let mut ingestor = RegionIngestor::new(&mut store, classifier);
/// ingestor.reset_tables()?;
/// ingestor.load([Record::from_iter([
///     ("name", "Aachen"),
///     ("mass", "21"),
///     ("reclat", "50.775000"),
///     ("reclong", "6.083330"),
/// ])])?;
/// let report = ingestor.close()?;
/// assert_eq!(report.rows_for("Europe"), 1);
/// # Ok(())
/// # }
/// ```
pub struct RegionIngestor<'s, 'r, S, R>
where
    S: RegionStore + ?Sized,
    R: CoordinateResolver,
{
    store: &'s mut S,
    classifier: Classifier<'r, R>,
    state: IngestState,
    report: IngestReport,
}

impl<'s, 'r, S, R> RegionIngestor<'s, 'r, S, R>
where
    S: RegionStore + ?Sized,
    R: CoordinateResolver,
{
    /// Start a run over `store`, routing records with `classifier`.
    pub fn new(store: &'s mut S, classifier: Classifier<'r, R>) -> Self {
        let report = IngestReport::for_registry(classifier.registry());
        Self {
            store,
            classifier,
            state: IngestState::Idle,
            report,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> IngestState {
        self.state
    }

    /// Counts and failures gathered so far.
    #[must_use]
    pub const fn report(&self) -> &IngestReport {
        &self.report
    }

    /// Create and empty every region's table.
    ///
    /// A failure on one region is recorded and the remaining regions are
    /// still reset. When creating a table fails, clearing it is skipped.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidTransition`] unless the ingestor is idle.
    pub fn reset_tables(&mut self) -> Result<(), IngestError> {
        self.expect_state("reset tables", &[IngestState::Idle])?;
        let registry = self.classifier.registry();
        for region in registry {
            let id = region.id();
            let outcome = self
                .store
                .ensure_table(id)
                .and_then(|()| self.store.clear_table(id));
            if let Err(source) = outcome {
                warn!("Failed to reset table for region {id}: {source}");
                self.report.failures.push(IngestFailure::Reset {
                    region: id.clone(),
                    source,
                });
            }
        }
        self.state = IngestState::TablesReset;
        info!("Reset tables for {} regions", registry.len());
        Ok(())
    }

    /// Classify `records` and insert one row per assigned region.
    ///
    /// Records are consumed one at a time. Unlocated records and records
    /// outside every region are counted and skipped. Parse and insert
    /// failures are recorded and the batch carries on. May be called again
    /// to append further batches.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidTransition`] before `reset_tables` or
    /// after `close`.
    pub fn load<I>(&mut self, records: I) -> Result<(), IngestError>
    where
        I: IntoIterator<Item = Record>,
    {
        self.expect_state("load records", &[IngestState::TablesReset, IngestState::Loading])?;
        self.state = IngestState::Loading;
        let first = self.report.records_seen;
        for record in records {
            let index = self.report.records_seen;
            self.report.records_seen += 1;
            self.load_record(index, &record);
        }
        info!(
            "Loaded {} records ({} rows written so far)",
            self.report.records_seen - first,
            self.report.total_rows()
        );
        Ok(())
    }

    /// Finalise writes, release the store and hand back the report.
    ///
    /// The store is released even when finalising fails. An idle ingestor
    /// skips finalising because nothing was written.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidTransition`] when already closed.
    pub fn close(&mut self) -> Result<IngestReport, IngestError> {
        self.expect_state(
            "close",
            &[
                IngestState::Idle,
                IngestState::TablesReset,
                IngestState::Loading,
            ],
        )?;
        if self.state != IngestState::Idle {
            if let Err(source) = self.store.finalize() {
                warn!("Failed to finalise writes: {source}");
                self.report.failures.push(IngestFailure::Finalize(source));
            }
        }
        if let Err(source) = self.store.release() {
            warn!("Failed to release store: {source}");
            self.report.failures.push(IngestFailure::Release(source));
        }
        self.state = IngestState::Closed;
        let report = std::mem::take(&mut self.report);
        info!(
            "Ingestion closed: {} records, {} rows, {} failures",
            report.records_seen,
            report.total_rows(),
            report.failures.len()
        );
        Ok(report)
    }

    fn load_record(&mut self, index: usize, record: &Record) {
        let regions = match self.classifier.classify_record(record) {
            Ok(Classification::Unlocated) => {
                debug!("Skipping record {index}: missing coordinates");
                self.report.unlocated += 1;
                return;
            }
            Ok(Classification::Located { regions, .. }) => regions,
            Err(source) => {
                warn!("Skipping record {index}: {source}");
                self.report.rejected += 1;
                self.report.failures.push(IngestFailure::Classify {
                    index,
                    name: record.name().map(str::to_owned),
                    source,
                });
                return;
            }
        };
        let Some(row) = RegionRow::from_record(record) else {
            self.report.unlocated += 1;
            return;
        };
        if regions.is_empty() {
            debug!("Record {index} lies outside every region");
            self.report.outside_regions += 1;
            return;
        }
        for region in regions {
            match self.store.insert_row(&region, row.clone()) {
                Ok(()) => self.report.count_row(&region),
                Err(source) => {
                    warn!("Failed to insert record {index} into {region}: {source}");
                    self.report
                        .failures
                        .push(IngestFailure::Insert { index, region, source });
                }
            }
        }
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[IngestState],
    ) -> Result<(), IngestError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(IngestError::InvalidTransition {
                state: self.state,
                operation,
            })
        }
    }
}

impl<S, R> Drop for RegionIngestor<'_, '_, S, R>
where
    S: RegionStore + ?Sized,
    R: CoordinateResolver,
{
    fn drop(&mut self) {
        if self.state == IngestState::Closed {
            return;
        }
        warn!("Ingestion abandoned while {}; releasing store", self.state);
        if let Err(err) = self.store.release() {
            warn!("Failed to release store: {err}");
        }
    }
}

/// Run a complete ingestion: reset every table, load `records`, then close.
///
/// # Errors
/// The sequence is fixed, so [`IngestError`] only surfaces if the ingestor's
/// lifecycle rules are violated internally.
pub fn ingest_records<S, R, I>(
    store: &mut S,
    registry: &RegionRegistry,
    policy: ClassificationPolicy,
    resolver: R,
    records: I,
) -> Result<IngestReport, IngestError>
where
    S: RegionStore + ?Sized,
    R: CoordinateResolver,
    I: IntoIterator<Item = Record>,
{
    let classifier = Classifier::new(registry, policy, resolver);
    let mut ingestor = RegionIngestor::new(store, classifier);
    ingestor.reset_tables()?;
    ingestor.load(records)?;
    ingestor.close()
}
