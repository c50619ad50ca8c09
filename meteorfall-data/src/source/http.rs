//! HTTP record source backed by `reqwest`.
//!
//! [`RecordSource`] is synchronous so the pipeline can run from a plain
//! `main`. This source bridges to the async client by blocking on a Tokio
//! runtime it owns, or on the caller's runtime when one is already running.

use std::time::Duration;

use log::info;
use meteorfall_core::Record;
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::{RecordSource, SourceError, TransportError, decode_records};

/// Public NASA dataset of meteorite landings.
pub const DEFAULT_SOURCE_URL: &str = "https://data.nasa.gov/resource/gh4g-9sfh.json";

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "meteorfall/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while constructing an [`HttpRecordSource`].
#[derive(Debug, Error)]
pub enum SourceBuildError {
    /// The configured URL does not parse.
    #[error("invalid source URL {url:?}")]
    InvalidUrl {
        /// Rejected URL text.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The URL uses a scheme other than `http` or `https`.
    #[error("unsupported URL scheme {scheme:?}; expected http or https")]
    UnsupportedScheme {
        /// Rejected scheme.
        scheme: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// The Tokio runtime could not be built.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpRecordSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRecordSourceConfig {
    /// Endpoint returning a JSON array of records.
    pub url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpRecordSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpRecordSourceConfig {
    /// Configuration for `url` with default timeout and user agent.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches records with a single `GET` request.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the request runs on the source's own runtime.
/// Inside a multi-threaded runtime it uses [`tokio::task::block_in_place`]
/// on the caller's handle. Inside a `current_thread` runtime, which cannot
/// be blocked in place, the source's own runtime drives the request on a
/// scoped helper thread while the caller waits.
///
/// # Examples
/// ```no_run
/// use meteorfall_data::{HttpRecordSource, RecordSource};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = HttpRecordSource::new(meteorfall_data::DEFAULT_SOURCE_URL)?;
/// let records = source.fetch_records()?;
/// println!("fetched {} records", records.len());
/// # Ok(())
/// # }
/// ```
pub struct HttpRecordSource {
    client: Client,
    url: Url,
    timeout: Duration,
    /// Only `None` while dropping.
    runtime: Option<Runtime>,
}

impl std::fmt::Debug for HttpRecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRecordSource")
            .field("url", &self.url.as_str())
            .field("timeout", &self.timeout)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpRecordSource {
    /// Source for `url` with default settings.
    ///
    /// # Errors
    /// See [`HttpRecordSource::with_config`].
    pub fn new(url: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpRecordSourceConfig::new(url))
    }

    /// Source built from an explicit configuration.
    ///
    /// # Errors
    /// Returns [`SourceBuildError`] when the URL is invalid or not HTTP(S),
    /// or when the client or runtime cannot be built.
    pub fn with_config(config: HttpRecordSourceConfig) -> Result<Self, SourceBuildError> {
        let url = Url::parse(&config.url).map_err(|source| SourceBuildError::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceBuildError::UnsupportedScheme {
                scheme: url.scheme().to_owned(),
            });
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(SourceBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(SourceBuildError::Runtime)?;
        Ok(Self {
            client,
            url,
            timeout: config.timeout,
            runtime: Some(runtime),
        })
    }

    /// Endpoint queried by this source.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch_body(&self) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?
            .error_for_status()
            .map_err(|err| self.transport_error(&err))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(&err))?;
        Ok(body.to_vec())
    }

    /// Nested `block_on` panics on the caller's thread, so the owned runtime
    /// runs on a fresh one.
    fn fetch_on_helper_thread(&self) -> Result<Vec<u8>, TransportError> {
        std::thread::scope(|scope| {
            scope
                .spawn(|| self.fetch_on_own_runtime())
                .join()
                .unwrap_or_else(|_| {
                    Err(TransportError::Network {
                        url: self.url.to_string(),
                        message: "fetch thread panicked".to_owned(),
                    })
                })
        })
    }

    fn fetch_on_own_runtime(&self) -> Result<Vec<u8>, TransportError> {
        match &self.runtime {
            Some(runtime) => runtime.block_on(self.fetch_body()),
            None => Err(TransportError::Network {
                url: self.url.to_string(),
                message: "runtime has shut down".to_owned(),
            }),
        }
    }

    fn transport_error(&self, error: &reqwest::Error) -> TransportError {
        let url = self.url.to_string();
        if error.is_timeout() {
            return TransportError::Timeout {
                url,
                timeout_secs: self.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return TransportError::Http {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        TransportError::Network {
            url,
            message: error.to_string(),
        }
    }
}

impl Drop for HttpRecordSource {
    // Dropping a runtime from async code panics; shut it down without
    // waiting instead.
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl RecordSource for HttpRecordSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        let body = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.fetch_body()))
            }
            Ok(_) => self.fetch_on_helper_thread(),
            Err(_) => self.fetch_on_own_runtime(),
        }?;
        info!("Fetched {} bytes from {}", body.len(), self.url);
        decode_records(&body).map_err(|source| SourceError::Decode {
            origin: self.describe(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use rstest::rstest;

    /// Serve one canned HTTP response on a loopback port.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let address = listener.local_addr().expect("local address");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept connection");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            while reader.read_line(&mut line).expect("read request") > 2 {
                line.clear();
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
        });
        (format!("http://{address}/records.json"), handle)
    }

    #[rstest]
    fn fetches_and_decodes_records() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"name":"Aachen","mass":"21","reclat":"50.775000","reclong":"6.083330"}]"#,
        );
        let source = HttpRecordSource::new(url).expect("source builds");

        let records = source.fetch_records().expect("fetch succeeds");
        server.join().expect("server thread");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), Some("Aachen"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetches_inside_a_current_thread_runtime() {
        let (url, server) = serve_once(
            "200 OK",
            r#"[{"name":"Aachen","mass":"21","reclat":"50.775000","reclong":"6.083330"}]"#,
        );
        let source = HttpRecordSource::new(url).expect("source builds");

        let records = source.fetch_records().expect("fetch succeeds");
        server.join().expect("server thread");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), Some("Aachen"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn reports_refused_connections_inside_a_current_thread_runtime() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
            listener.local_addr().expect("local address").port()
        };
        let source =
            HttpRecordSource::new(format!("http://127.0.0.1:{port}/")).expect("source builds");

        let err = source.fetch_records().expect_err("nothing listening");

        assert!(matches!(err, SourceError::Fetch(TransportError::Network { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fetches_inside_a_multi_thread_runtime() {
        let (url, server) = serve_once("200 OK", "[]");
        let source = HttpRecordSource::new(url).expect("source builds");

        let records = source.fetch_records().expect("fetch succeeds");
        server.join().expect("server thread");

        assert!(records.is_empty());
    }

    #[rstest]
    fn maps_error_status_to_http_failure() {
        let (url, server) = serve_once("503 Service Unavailable", "{}");
        let source = HttpRecordSource::new(url).expect("source builds");

        let err = source.fetch_records().expect_err("503 fails");
        server.join().expect("server thread");

        assert!(matches!(
            err,
            SourceError::Fetch(TransportError::Http { status: 503, .. })
        ));
    }

    #[rstest]
    fn reports_undecodable_bodies() {
        let (url, server) = serve_once("200 OK", r#"{"error": "not a list"}"#);
        let source = HttpRecordSource::new(url).expect("source builds");

        let err = source.fetch_records().expect_err("object payload fails");
        server.join().expect("server thread");

        assert!(matches!(err, SourceError::Decode { .. }));
    }

    #[rstest]
    fn maps_refused_connections_to_network_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
            listener.local_addr().expect("local address").port()
        };
        let source =
            HttpRecordSource::new(format!("http://127.0.0.1:{port}/")).expect("source builds");

        let err = source.fetch_records().expect_err("nothing listening");

        assert!(matches!(err, SourceError::Fetch(TransportError::Network { .. })));
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://example.com/records.json")]
    fn rejects_unusable_urls(#[case] url: &str) {
        let err = HttpRecordSource::new(url).expect_err("url rejected");
        assert!(matches!(
            err,
            SourceBuildError::InvalidUrl { .. } | SourceBuildError::UnsupportedScheme { .. }
        ));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpRecordSourceConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
