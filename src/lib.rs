//! Facade crate for the Meteorfall regional ingestion pipeline.
//!
//! This crate re-exports the core domain types and, behind the `data`
//! feature, the record sources, SQLite store and ingestion orchestrator.

#![forbid(unsafe_code)]

pub use meteorfall_core::{
    Classification, ClassificationPolicy, Classifier, ClassifyError, CoordinateError,
    CoordinateResolver, DecimalResolver, Record, Region, RegionError, RegionId, RegionRegistry,
    RegionRow, RegionStore, StoreError, TableOperation, classify, classify_first, list_regions,
};

#[cfg(feature = "data")]
pub use meteorfall_data::{
    FileRecordSource, HttpRecordSource, IngestError, IngestFailure, IngestReport, IngestState,
    PipelineError, RecordSource, RegionIngestor, SourceError, SqliteRegionStore, ingest_records,
    run_ingestion,
};
