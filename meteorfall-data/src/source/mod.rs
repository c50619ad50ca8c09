//! Record sources feeding the ingestion pipeline.
//!
//! A [`RecordSource`] yields the full set of meteorite-landing records for a
//! run. Sources are synchronous; [`HttpRecordSource`] bridges to the async
//! HTTP client internally so the pipeline stays embeddable in plain `main`
//! functions.

mod decode;
mod error;
mod file;
mod http;

#[doc(hidden)]
pub mod test_support;

pub use decode::decode_records;
pub use error::{DecodeError, SourceError, TransportError};
pub use file::FileRecordSource;
pub use http::{
    DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpRecordSource,
    HttpRecordSourceConfig, SourceBuildError,
};

use meteorfall_core::Record;

/// Supplies the records for one ingestion run.
pub trait RecordSource {
    /// Human-readable origin used in logs and error messages.
    fn describe(&self) -> String;

    /// Fetch and decode every available record.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the records cannot be retrieved or the
    /// payload is not a JSON array of objects.
    fn fetch_records(&self) -> Result<Vec<Record>, SourceError>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        (**self).fetch_records()
    }
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        (**self).fetch_records()
    }
}
