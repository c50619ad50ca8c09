//! Deterministic record sources for tests.

use std::cell::Cell;

use meteorfall_core::Record;

use super::{RecordSource, SourceError, TransportError, decode_records};

/// Stub [`RecordSource`] returning canned records or a canned failure.
///
/// # Example
///
/// ```
/// use meteorfall_core::Record;
/// use meteorfall_data::RecordSource;
/// use meteorfall_data::source::test_support::StubRecordSource;
///
/// let source = StubRecordSource::with_records(vec![Record::from_iter([("name", "A")])]);
/// assert_eq!(source.fetch_records().map(|records| records.len()).ok(), Some(1));
/// assert_eq!(source.fetch_calls(), 1);
/// ```
#[derive(Debug)]
pub struct StubRecordSource {
    response: StubResponse,
    calls: Cell<usize>,
}

#[derive(Debug)]
enum StubResponse {
    Records(Vec<Record>),
    Transport(TransportError),
    Payload(Vec<u8>),
}

impl StubRecordSource {
    /// Source returning `records` on every fetch.
    #[must_use]
    pub const fn with_records(records: Vec<Record>) -> Self {
        Self::from_response(StubResponse::Records(records))
    }

    /// Source failing every fetch with `error`.
    #[must_use]
    pub const fn failing(error: TransportError) -> Self {
        Self::from_response(StubResponse::Transport(error))
    }

    /// Source decoding `payload` on every fetch, as if it had been
    /// downloaded.
    #[must_use]
    pub fn with_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self::from_response(StubResponse::Payload(payload.into()))
    }

    /// Number of completed `fetch_records` calls.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.calls.get()
    }

    const fn from_response(response: StubResponse) -> Self {
        Self {
            response,
            calls: Cell::new(0),
        }
    }
}

impl RecordSource for StubRecordSource {
    fn describe(&self) -> String {
        "stub".to_owned()
    }

    fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        self.calls.set(self.calls.get() + 1);
        match &self.response {
            StubResponse::Records(records) => Ok(records.clone()),
            StubResponse::Transport(error) => Err(SourceError::Fetch(error.clone())),
            StubResponse::Payload(payload) => {
                decode_records(payload).map_err(|source| SourceError::Decode {
                    origin: self.describe(),
                    source,
                })
            }
        }
    }
}
