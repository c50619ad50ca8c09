//! Local JSON snapshot source.

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use meteorfall_core::Record;

use super::{RecordSource, SourceError, decode_records};

/// Reads records from a JSON file saved from the public dataset.
///
/// # Examples
/// ```no_run
/// use meteorfall_data::{FileRecordSource, RecordSource};
///
/// let source = FileRecordSource::new("snapshots/meteorites.json");
/// let records = source.fetch_records()?;
/// # Ok::<(), meteorfall_data::SourceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecordSource {
    path: Utf8PathBuf,
}

impl FileRecordSource {
    /// Source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot location.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl RecordSource for FileRecordSource {
    fn describe(&self) -> String {
        self.path.to_string()
    }

    fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        let payload = meteorfall_fs::read_bytes(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        info!("Read {} bytes from {}", payload.len(), self.path);
        decode_records(&payload).map_err(|source| SourceError::Decode {
            origin: self.describe(),
            source,
        })
    }
}
