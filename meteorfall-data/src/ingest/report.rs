//! Outcome of an ingestion run.

use meteorfall_core::{ClassifyError, RegionId, RegionRegistry, StoreError};
use thiserror::Error;

/// A non-fatal failure recorded while the run carried on.
#[derive(Debug, Error)]
pub enum IngestFailure {
    /// Creating or clearing a region's table failed.
    #[error("failed to reset table for region {region}")]
    Reset {
        /// Region whose table could not be reset.
        region: RegionId,
        /// Store failure.
        #[source]
        source: StoreError,
    },
    /// A record's coordinates could not be resolved; the record was skipped.
    #[error("skipped record {index} ({}): unreadable coordinates", .name.as_deref().unwrap_or("unnamed"))]
    Classify {
        /// Zero-based position of the record in the run.
        index: usize,
        /// Record name, when present.
        name: Option<String>,
        /// Classifier failure.
        #[source]
        source: ClassifyError,
    },
    /// Writing a row to one region's table failed.
    #[error("failed to insert record {index} into region {region}")]
    Insert {
        /// Zero-based position of the record in the run.
        index: usize,
        /// Region whose insert failed.
        region: RegionId,
        /// Store failure.
        #[source]
        source: StoreError,
    },
    /// Committing the run's writes failed.
    #[error("failed to finalise writes")]
    Finalize(#[source] StoreError),
    /// Releasing the store failed.
    #[error("failed to release the store")]
    Release(#[source] StoreError),
}

/// Rows written to one region during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCount {
    /// Region identifier.
    pub region: RegionId,
    /// Rows accepted by the store.
    pub rows: usize,
}

/// Counts and failures collected over a run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Records handed to the ingestor.
    pub records_seen: usize,
    /// Records skipped for lacking a coordinate field.
    pub unlocated: usize,
    /// Located records that fell inside no region.
    pub outside_regions: usize,
    /// Records skipped because a coordinate could not be resolved.
    pub rejected: usize,
    /// Rows written per region, in registry order.
    pub rows_written: Vec<RegionCount>,
    /// Every failure recorded during the run, in the order it happened.
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub(super) fn for_registry(registry: &RegionRegistry) -> Self {
        Self {
            rows_written: registry
                .iter()
                .map(|region| RegionCount {
                    region: region.id().clone(),
                    rows: 0,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub(super) fn count_row(&mut self, region: &RegionId) {
        if let Some(count) = self
            .rows_written
            .iter_mut()
            .find(|count| &count.region == region)
        {
            count.rows += 1;
        }
    }

    /// Rows written to `region`; zero for unknown regions.
    #[must_use]
    pub fn rows_for(&self, region: &str) -> usize {
        self.rows_written
            .iter()
            .find(|count| count.region.as_str() == region)
            .map_or(0, |count| count.rows)
    }

    /// Rows written across every region.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows_written.iter().map(|count| count.rows).sum()
    }

    /// Whether the run completed without recording any failure.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
