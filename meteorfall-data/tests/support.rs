//! Shared helpers for the data crate's behavioural tests.

use camino::{Utf8Path, Utf8PathBuf};
use meteorfall_core::{Region, RegionId, RegionRegistry};
use meteorfall_data::SqliteRegionStore;
use tempfile::TempDir;

/// Registry with one region around the origin and one far away.
pub fn lone_region_registry() -> RegionRegistry {
    RegionRegistry::new(vec![
        Region::new("West", -10.0, -10.0, 10.0, 10.0).expect("valid region"),
        Region::new("Far", 20.0, 20.0, 30.0, 30.0).expect("valid region"),
    ])
    .expect("valid registry")
}

/// Registry with two overlapping regions, `West` registered first.
pub fn overlapping_registry() -> RegionRegistry {
    RegionRegistry::new(vec![
        Region::new("West", -10.0, -10.0, 10.0, 10.0).expect("valid region"),
        Region::new("East", 5.0, 5.0, 15.0, 15.0).expect("valid region"),
    ])
    .expect("valid registry")
}

/// Path of the scratch database inside `dir`.
pub fn database_path(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join("meteorites.db")).expect("utf-8 temp path")
}

/// Reopen the database at `path` for inspection.
pub fn reopen(path: &Utf8Path) -> SqliteRegionStore {
    SqliteRegionStore::open(path).expect("reopen database")
}

/// Parse a region identifier used in a scenario.
pub fn region_id(text: &str) -> RegionId {
    RegionId::new(text).expect("valid region id")
}
