//! Core domain types for the Meteorfall ingestion pipeline.
//!
//! The crate owns the pieces of the pipeline that carry domain rules:
//! - [`Record`] and [`RegionRow`] model what flows through a run.
//! - [`RegionRegistry`] holds the fixed set of regional bounding boxes.
//! - [`Classifier`] decides which regions a record belongs to.
//! - [`RegionStore`] is the seam every storage engine implements.
//!
//! Adapters for HTTP, files and SQLite live in `meteorfall-data`; nothing here
//! performs I/O.

#![forbid(unsafe_code)]

pub mod classify;
pub mod coordinate;
pub mod record;
pub mod region;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use classify::{
    Classification, ClassificationPolicy, Classifier, ClassifyError, ParsePolicyError, classify,
    classify_first,
};
pub use coordinate::{CoordinateError, CoordinateResolver, DecimalResolver};
pub use record::{Record, RegionRow};
pub use region::{Region, RegionError, RegionId, RegionRegistry, list_regions};
pub use store::{RegionStore, StoreError, StoreErrorSource, TableOperation};
