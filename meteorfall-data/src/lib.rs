//! Data access and ingestion for the Meteorfall pipeline.
//!
//! Responsibilities:
//! - Fetch meteorite-landing records over HTTP or from a local snapshot.
//! - Persist regional tables in SQLite.
//! - Orchestrate a run: reset every table, load, finalise, release.
//!
//! Boundaries:
//! - Domain rules (regions, classification, row shape) live in
//!   `meteorfall-core`.
//! - Blocking I/O stays behind synchronous traits; the HTTP source owns the
//!   async runtime it needs.
//!
//! Invariants:
//! - A store passed to the orchestrator is released exactly once.
//! - No global mutable state.

pub mod ingest;
pub mod pipeline;
pub mod source;
pub mod store;

pub use ingest::{
    IngestError, IngestFailure, IngestReport, IngestState, RegionCount, RegionIngestor,
    ingest_records,
};
pub use pipeline::{PipelineError, run_ingestion};
pub use source::{
    DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, DecodeError, FileRecordSource,
    HttpRecordSource, HttpRecordSourceConfig, RecordSource, SourceBuildError, SourceError,
    TransportError, decode_records,
};
pub use store::SqliteRegionStore;
