//! Test helpers for scratch record files and databases.

use camino::{Utf8Path, Utf8PathBuf};
use meteorfall_core::{RegionId, RegionRow};
use meteorfall_data::SqliteRegionStore;
use tempfile::TempDir;

/// One located European record, one without coordinates, one in open ocean
/// and one with an unreadable latitude.
pub(super) const MIXED_RECORDS: &str = r#"[
    {"name": "Aachen", "id": "1", "mass": "21", "reclat": "50.775000", "reclong": "6.083330"},
    {"name": "Lost", "id": "2", "mass": "3"},
    {"name": "Vostok", "id": "3", "mass": "5", "reclat": "-78.0", "reclong": "106.0"},
    {"name": "Garbled", "id": "4", "mass": "8", "reclat": "north", "reclong": "6.0"}
]"#;

/// Only records the pipeline can place or skip without failing.
pub(super) const CLEAN_RECORDS: &str = r#"[
    {"name": "Aachen", "id": "1", "mass": "21", "reclat": "50.775000", "reclong": "6.083330"},
    {"name": "Lost", "id": "2", "mass": "3"}
]"#;

/// Temporary directory holding record files and the target database.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.path("meteorites.db")
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Rows stored for `region` in the database at `path`.
pub(super) fn stored_rows(path: &Utf8Path, region: &str) -> Vec<RegionRow> {
    let store = SqliteRegionStore::open(path).expect("reopen database");
    let region = RegionId::new(region).expect("valid region id");
    store.rows(&region).expect("query rows")
}
