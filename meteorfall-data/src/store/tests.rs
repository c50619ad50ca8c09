use super::*;
use camino::Utf8PathBuf;
use meteorfall_core::{RegionId, RegionRow, RegionStore, StoreError, TableOperation};
use rstest::{fixture, rstest};
use rusqlite::Connection;
use tempfile::TempDir;

#[fixture]
fn europe() -> RegionId {
    RegionId::new("Europe").expect("valid id")
}

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

fn db_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 path")
}

fn aachen() -> RegionRow {
    RegionRow::new("Aachen", "21", "50.775000", "6.083330")
}

fn reset(store: &mut SqliteRegionStore, region: &RegionId) {
    store.ensure_table(region).expect("ensure table");
    store.clear_table(region).expect("clear table");
}

#[rstest]
fn creates_text_columns_named_after_the_region(temp_dir: TempDir, europe: RegionId) {
    let path = db_path(&temp_dir, "meteorites.db");
    let mut store = SqliteRegionStore::open(&path).expect("open store");
    reset(&mut store, &europe);
    store.release().expect("release");

    let conn = Connection::open(path.as_std_path()).expect("reopen");
    let mut statement = conn
        .prepare("SELECT name, type FROM pragma_table_info('Europe_Meteorites') ORDER BY cid")
        .expect("prepare pragma");
    let columns: Vec<(String, String)> = statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .expect("query columns")
        .collect::<Result<_, _>>()
        .expect("read columns");
    let expected = ["name", "mass", "reclat", "reclong"]
        .map(|name| (name.to_owned(), "TEXT".to_owned()));
    assert_eq!(columns, expected);
}

#[rstest]
fn finalised_rows_survive_release(temp_dir: TempDir, europe: RegionId) {
    let path = db_path(&temp_dir, "meteorites.db");
    let mut store = SqliteRegionStore::open(&path).expect("open store");
    reset(&mut store, &europe);
    store.insert_row(&europe, aachen()).expect("insert");
    store.finalize().expect("finalize");
    store.release().expect("release");

    let reopened = SqliteRegionStore::open(&path).expect("reopen");
    assert_eq!(reopened.rows(&europe).expect("rows"), [aachen()]);
}

#[rstest]
fn unfinalised_rows_are_discarded_on_release(temp_dir: TempDir, europe: RegionId) {
    let path = db_path(&temp_dir, "meteorites.db");
    let mut store = SqliteRegionStore::open(&path).expect("open store");
    reset(&mut store, &europe);
    store.insert_row(&europe, aachen()).expect("insert");
    store.release().expect("release");

    let reopened = SqliteRegionStore::open(&path).expect("reopen");
    assert_eq!(reopened.row_count(&europe).expect("count"), 0);
}

#[rstest]
fn reset_is_durable_without_finalize(temp_dir: TempDir, europe: RegionId) {
    let path = db_path(&temp_dir, "meteorites.db");
    let mut store = SqliteRegionStore::open(&path).expect("open store");
    reset(&mut store, &europe);
    store.insert_row(&europe, aachen()).expect("insert");
    store.finalize().expect("finalize");
    store.release().expect("release");

    let mut second = SqliteRegionStore::open(&path).expect("reopen");
    reset(&mut second, &europe);
    second.release().expect("release without finalize");

    let third = SqliteRegionStore::open(&path).expect("reopen again");
    assert_eq!(third.row_count(&europe).expect("count"), 0);
}

#[rstest]
fn reset_twice_leaves_table_empty(europe: RegionId) {
    let mut store = SqliteRegionStore::open_in_memory().expect("open store");
    reset(&mut store, &europe);
    store.insert_row(&europe, aachen()).expect("insert");
    store.finalize().expect("finalize");

    reset(&mut store, &europe);
    assert_eq!(store.row_count(&europe).expect("count"), 0);
    reset(&mut store, &europe);
    assert_eq!(store.row_count(&europe).expect("count"), 0);
}

#[rstest]
fn missing_name_and_mass_are_stored_as_null(europe: RegionId) {
    let mut store = SqliteRegionStore::open_in_memory().expect("open store");
    reset(&mut store, &europe);
    let row = RegionRow {
        name: None,
        mass: None,
        reclat: "1.0".to_owned(),
        reclong: "2.0".to_owned(),
    };
    store.insert_row(&europe, row.clone()).expect("insert");
    store.finalize().expect("finalize");

    assert_eq!(store.rows(&europe).expect("rows"), [row]);
}

#[rstest]
fn clearing_a_missing_table_fails(europe: RegionId) {
    let mut store = SqliteRegionStore::open_in_memory().expect("open store");
    let err = store.clear_table(&europe).expect_err("no table");
    assert!(matches!(
        err,
        StoreError::Table {
            operation: TableOperation::Clear,
            ..
        }
    ));
}

#[rstest]
fn finalize_without_inserts_is_a_no_op() {
    let mut store = SqliteRegionStore::open_in_memory().expect("open store");
    store.finalize().expect("nothing to commit");
}

#[rstest]
fn release_is_idempotent_and_ends_the_session(europe: RegionId) {
    let mut store = SqliteRegionStore::open_in_memory().expect("open store");
    store.release().expect("first release");
    store.release().expect("second release");

    let err = store.ensure_table(&europe).expect_err("released");
    assert!(matches!(err, StoreError::Released));
    assert!(err.is_connection_failure());
}

#[rstest]
fn opening_creates_missing_parent_directories(temp_dir: TempDir) {
    let path = db_path(&temp_dir, "nested/dir/meteorites.db");
    let mut store = SqliteRegionStore::open(&path).expect("open nested store");
    store.release().expect("release");
    assert!(path.exists());
}

#[cfg(unix)]
#[rstest]
fn opening_beneath_a_file_reports_open_failure(temp_dir: TempDir) {
    let blocker = db_path(&temp_dir, "blocker");
    std::fs::write(blocker.as_std_path(), b"").expect("write blocker");
    let path = blocker.join("meteorites.db");

    let err = SqliteRegionStore::open(&path).expect_err("parent is a file");
    assert!(matches!(err, StoreError::Open { .. }));
}
