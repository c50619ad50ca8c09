//! Test-only, in-memory `RegionStore` implementation used by unit and
//! behaviour tests.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::{RegionId, RegionRow, RegionStore, StoreError, TableOperation};

/// Failure raised by [`MemoryRegionStore`] when a fault has been injected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("injected storage failure")]
pub struct InjectedFailure;

/// In-memory `RegionStore` with optional fault injection.
///
/// Rows inserted during a run stay pending until `finalize`; `release`
/// discards anything still pending, mirroring an uncommitted transaction.
#[derive(Debug, Default)]
pub struct MemoryRegionStore {
    tables: BTreeMap<RegionId, Vec<RegionRow>>,
    pending: Vec<(RegionId, RegionRow)>,
    faults: BTreeSet<(TableOperation, RegionId)>,
    fail_finalize: bool,
    fail_release: bool,
    released: bool,
    finalize_calls: usize,
    release_calls: usize,
}

impl MemoryRegionStore {
    /// Seed a committed table, e.g. to simulate rows left by an earlier run.
    #[must_use]
    pub fn with_rows<I>(mut self, region: &RegionId, rows: I) -> Self
    where
        I: IntoIterator<Item = RegionRow>,
    {
        self.tables
            .entry(region.clone())
            .or_default()
            .extend(rows);
        self
    }

    /// Make `operation` fail for `region`.
    #[must_use]
    pub fn failing(mut self, operation: TableOperation, region: &RegionId) -> Self {
        self.faults.insert((operation, region.clone()));
        self
    }

    /// Make `finalize` fail.
    #[must_use]
    pub fn failing_finalize(mut self) -> Self {
        self.fail_finalize = true;
        self
    }

    /// Make `release` fail.
    #[must_use]
    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    /// Committed rows of `region`; empty when the table does not exist.
    #[must_use]
    pub fn rows(&self, region: &RegionId) -> &[RegionRow] {
        self.tables.get(region).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a table exists for `region`.
    #[must_use]
    pub fn has_table(&self, region: &RegionId) -> bool {
        self.tables.contains_key(region)
    }

    /// Number of rows written but not yet finalised.
    #[must_use]
    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Whether `release` has been called.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// Number of `finalize` calls.
    #[must_use]
    pub const fn finalize_calls(&self) -> usize {
        self.finalize_calls
    }

    /// Number of `release` calls.
    #[must_use]
    pub const fn release_calls(&self) -> usize {
        self.release_calls
    }

    fn check(&self, operation: TableOperation, region: &RegionId) -> Result<(), StoreError> {
        if self.released {
            return Err(StoreError::Released);
        }
        if self.faults.contains(&(operation, region.clone())) {
            return Err(StoreError::table(operation, region, InjectedFailure));
        }
        Ok(())
    }
}

impl RegionStore for MemoryRegionStore {
    fn ensure_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        self.check(TableOperation::Ensure, region)?;
        self.tables.entry(region.clone()).or_default();
        Ok(())
    }

    fn clear_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        self.check(TableOperation::Clear, region)?;
        let Some(rows) = self.tables.get_mut(region) else {
            return Err(StoreError::table(
                TableOperation::Clear,
                region,
                format!("no such table: {region}"),
            ));
        };
        rows.clear();
        self.pending.retain(|(pending, _)| pending != region);
        Ok(())
    }

    fn insert_row(&mut self, region: &RegionId, row: RegionRow) -> Result<(), StoreError> {
        self.check(TableOperation::Insert, region)?;
        if !self.tables.contains_key(region) {
            return Err(StoreError::table(
                TableOperation::Insert,
                region,
                format!("no such table: {region}"),
            ));
        }
        self.pending.push((region.clone(), row));
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), StoreError> {
        if self.released {
            return Err(StoreError::Released);
        }
        self.finalize_calls += 1;
        if self.fail_finalize {
            return Err(StoreError::Finalize {
                source: Box::new(InjectedFailure),
            });
        }
        for (region, row) in self.pending.drain(..) {
            self.tables.entry(region).or_default().push(row);
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), StoreError> {
        self.release_calls += 1;
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.pending.clear();
        if self.fail_release {
            return Err(StoreError::Release {
                source: Box::new(InjectedFailure),
            });
        }
        Ok(())
    }
}
