//! The storage seam between the ingestion orchestrator and a backing store.
//!
//! A [`RegionStore`] is a session: it is opened by the caller, borrowed
//! exclusively for one run, and released exactly once at the end. Each
//! operation may fail on its own without poisoning the session.

use std::{error::Error as StdError, fmt};

use thiserror::Error;

use crate::{RegionId, RegionRow};

/// Boxed error reported by a storage engine.
pub type StoreErrorSource = Box<dyn StdError + Send + Sync>;

/// Per-table operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableOperation {
    /// Creating the table if absent.
    Ensure,
    /// Removing every row from the table.
    Clear,
    /// Appending a row.
    Insert,
    /// Reading rows back for inspection.
    Query,
}

impl fmt::Display for TableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ensure => "create table",
            Self::Clear => "clear table",
            Self::Insert => "insert row",
            Self::Query => "query table",
        })
    }
}

/// Errors raised by a [`RegionStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A table operation was rejected by the backing store.
    #[error("failed to {operation} for region {region}: {source}")]
    Table {
        /// Operation that failed.
        operation: TableOperation,
        /// Region whose table was targeted.
        region: RegionId,
        /// Engine error.
        #[source]
        source: StoreErrorSource,
    },
    /// Committing pending writes failed.
    #[error("failed to finalise pending writes: {source}")]
    Finalize {
        /// Engine error.
        #[source]
        source: StoreErrorSource,
    },
    /// The session could not be established.
    #[error("failed to open storage session at {location}: {source}")]
    Open {
        /// Database location.
        location: String,
        /// Engine error.
        #[source]
        source: StoreErrorSource,
    },
    /// Closing the session failed.
    #[error("failed to release storage session: {source}")]
    Release {
        /// Engine error.
        #[source]
        source: StoreErrorSource,
    },
    /// The session was used after it had been released.
    #[error("storage session has already been released")]
    Released,
}

impl StoreError {
    /// Build a [`StoreError::Table`] from any engine error.
    pub fn table(
        operation: TableOperation,
        region: &RegionId,
        source: impl Into<StoreErrorSource>,
    ) -> Self {
        Self::Table {
            operation,
            region: region.clone(),
            source: source.into(),
        }
    }

    /// Whether the error concerns the session itself rather than one write.
    ///
    /// # Examples
    /// ```
    /// use meteorfall_core::StoreError;
    ///
    /// assert!(StoreError::Released.is_connection_failure());
    /// ```
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::Open { .. } | Self::Release { .. } | Self::Released
        )
    }
}

/// A per-region table store.
///
/// Implementations persist rows of four text columns per region. The
/// expected call sequence for a run is `ensure_table` and `clear_table` for
/// every region, any number of `insert_row` calls, `finalize`, then
/// `release`.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use meteorfall_core::{RegionId, RegionRow, RegionStore, StoreError};
///
/// #[derive(Default)]
/// struct CountingStore {
///     rows: HashMap<RegionId, usize>,
/// }
///
/// impl RegionStore for CountingStore {
///     fn ensure_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
///         self.rows.entry(region.clone()).or_default();
///         Ok(())
///     }
///     fn clear_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
///         self.rows.insert(region.clone(), 0);
///         Ok(())
///     }
///     fn insert_row(&mut self, region: &RegionId, _row: RegionRow) -> Result<(), StoreError> {
///         *self.rows.entry(region.clone()).or_default() += 1;
///         Ok(())
///     }
///     fn finalize(&mut self) -> Result<(), StoreError> {
///         Ok(())
///     }
///     fn release(&mut self) -> Result<(), StoreError> {
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let europe = RegionId::new("Europe")?;
/// let mut store = CountingStore::default();
/// store.ensure_table(&europe)?;
/// store.insert_row(&europe, RegionRow::new("Aachen", "21", "50.775", "6.08333"))?;
/// assert_eq!(store.rows[&europe], 1);
/// # Ok(())
/// # }
/// ```
pub trait RegionStore {
    /// Create the region's table if it does not exist.
    fn ensure_table(&mut self, region: &RegionId) -> Result<(), StoreError>;

    /// Discard every row in the region's table.
    fn clear_table(&mut self, region: &RegionId) -> Result<(), StoreError>;

    /// Append one row to the region's table.
    fn insert_row(&mut self, region: &RegionId, row: RegionRow) -> Result<(), StoreError>;

    /// Commit writes accumulated since the last reset.
    fn finalize(&mut self) -> Result<(), StoreError>;

    /// Close the session.
    ///
    /// Must be safe to call after any earlier failure and more than once;
    /// later calls are no-ops.
    fn release(&mut self) -> Result<(), StoreError>;
}

impl<S: RegionStore + ?Sized> RegionStore for &mut S {
    fn ensure_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        (**self).ensure_table(region)
    }

    fn clear_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        (**self).clear_table(region)
    }

    fn insert_row(&mut self, region: &RegionId, row: RegionRow) -> Result<(), StoreError> {
        (**self).insert_row(region, row)
    }

    fn finalize(&mut self) -> Result<(), StoreError> {
        (**self).finalize()
    }

    fn release(&mut self) -> Result<(), StoreError> {
        (**self).release()
    }
}

impl<S: RegionStore + ?Sized> RegionStore for Box<S> {
    fn ensure_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        (**self).ensure_table(region)
    }

    fn clear_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        (**self).clear_table(region)
    }

    fn insert_row(&mut self, region: &RegionId, row: RegionRow) -> Result<(), StoreError> {
        (**self).insert_row(region, row)
    }

    fn finalize(&mut self) -> Result<(), StoreError> {
        (**self).finalize()
    }

    fn release(&mut self) -> Result<(), StoreError> {
        (**self).release()
    }
}
