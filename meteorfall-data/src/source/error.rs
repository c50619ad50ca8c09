//! Error types shared by every record source.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failure to retrieve the raw payload over the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Client error description.
        message: String,
    },
    /// The request did not complete before the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The connection failed or the body could not be read.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Client error description.
        message: String,
    },
}

/// The payload was retrieved but is not a JSON array of objects.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid JSON.
    #[error("payload is not valid JSON")]
    Json(#[from] serde_json::Error),
    /// The top-level JSON value is not an array.
    #[error("expected a JSON array of records, found {found}")]
    NotAnArray {
        /// JSON type found instead.
        found: &'static str,
    },
    /// An array element is not a JSON object.
    #[error("record {index} is a JSON {found}, expected an object")]
    NotAnObject {
        /// Position of the offending element.
        index: usize,
        /// JSON type found instead.
        found: &'static str,
    },
}

/// Errors raised by a [`RecordSource`](super::RecordSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The remote payload could not be fetched.
    #[error("failed to fetch records")]
    Fetch(#[from] TransportError),
    /// A local snapshot could not be read.
    #[error("failed to read records from {path}")]
    Read {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The payload could not be decoded into records.
    #[error("failed to decode records from {origin}")]
    Decode {
        /// URL or path the payload came from.
        origin: String,
        /// Decoder failure.
        #[source]
        source: DecodeError,
    },
}
