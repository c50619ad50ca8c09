//! SQLite persistence for per-region meteorite tables.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use meteorfall_core::{RegionId, RegionRow, RegionStore, StoreError, TableOperation};
use rusqlite::Connection;

/// A [`RegionStore`] writing one `<id>_Meteorites` table per region.
///
/// Every column is `TEXT`; coordinates are stored exactly as received.
///
/// Table resets run in autocommit mode, so a completed reset survives a
/// later failure. Inserts share one transaction that is opened by the first
/// insert and committed by [`RegionStore::finalize`]. Releasing the store
/// closes the connection, which rolls back anything not yet finalised.
///
/// # Examples
/// ```
/// use meteorfall_core::{RegionId, RegionRow, RegionStore};
/// use meteorfall_data::SqliteRegionStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let europe = RegionId::new("Europe")?;
/// let mut store = SqliteRegionStore::open_in_memory()?;
/// store.ensure_table(&europe)?;
/// store.clear_table(&europe)?;
/// store.insert_row(&europe, RegionRow::new("Aachen", "21", "50.775000", "6.083330"))?;
/// store.finalize()?;
/// assert_eq!(store.row_count(&europe)?, 1);
/// store.release()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteRegionStore {
    connection: Option<Connection>,
    location: String,
}

impl SqliteRegionStore {
    /// Open (or create) the database at `path`, creating parent directories
    /// as needed.
    ///
    /// # Errors
    /// Returns [`StoreError::Open`] when the directory or database cannot be
    /// created.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        let location = path.to_string();
        meteorfall_fs::ensure_parent_dir(path).map_err(|source| StoreError::Open {
            location: location.clone(),
            source: source.into(),
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| StoreError::Open {
                location: location.clone(),
                source: source.into(),
            })?;
        Ok(Self {
            connection: Some(connection),
            location,
        })
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`StoreError::Open`] when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let location = ":memory:".to_owned();
        let connection = Connection::open_in_memory().map_err(|source| StoreError::Open {
            location: location.clone(),
            source: source.into(),
        })?;
        Ok(Self {
            connection: Some(connection),
            location,
        })
    }

    /// Database location as given to `open`.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Name of the table holding `region`'s rows.
    ///
    /// # Examples
    /// ```
    /// use meteorfall_core::RegionId;
    /// use meteorfall_data::SqliteRegionStore;
    ///
    /// let id = RegionId::new("North_America").expect("valid id");
    /// assert_eq!(SqliteRegionStore::table_name(&id), "North_America_Meteorites");
    /// ```
    #[must_use]
    pub fn table_name(region: &RegionId) -> String {
        format!("{region}_Meteorites")
    }

    /// Number of committed or pending rows in `region`'s table.
    ///
    /// # Errors
    /// Fails when the table does not exist or the store was released.
    pub fn row_count(&self, region: &RegionId) -> Result<u64, StoreError> {
        let connection = self.connection()?;
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", Self::table_name(region));
        let count: i64 = connection
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|source| StoreError::table(TableOperation::Query, region, source))?;
        u64::try_from(count)
            .map_err(|source| StoreError::table(TableOperation::Query, region, source))
    }

    /// Every row of `region`'s table in insertion order.
    ///
    /// # Errors
    /// Fails when the table does not exist or the store was released.
    pub fn rows(&self, region: &RegionId) -> Result<Vec<RegionRow>, StoreError> {
        let connection = self.connection()?;
        let sql = format!(
            "SELECT name, mass, reclat, reclong FROM \"{}\" ORDER BY rowid",
            Self::table_name(region)
        );
        let query_error =
            |source: rusqlite::Error| StoreError::table(TableOperation::Query, region, source);
        let mut statement = connection.prepare(&sql).map_err(query_error)?;
        let rows = statement
            .query_map([], |row| {
                Ok(RegionRow {
                    name: row.get(0)?,
                    mass: row.get(1)?,
                    reclat: row.get(2)?,
                    reclong: row.get(3)?,
                })
            })
            .map_err(query_error)?;
        rows.collect::<Result<_, _>>().map_err(query_error)
    }

    fn connection(&self) -> Result<&Connection, StoreError> {
        self.connection.as_ref().ok_or(StoreError::Released)
    }

    fn execute_on_table(
        &self,
        operation: TableOperation,
        region: &RegionId,
        sql: &str,
    ) -> Result<(), StoreError> {
        self.connection()?
            .execute(sql, [])
            .map(|_| ())
            .map_err(|source| StoreError::table(operation, region, source))
    }
}

impl RegionStore for SqliteRegionStore {
    fn ensure_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (
                name TEXT,
                mass TEXT,
                reclat TEXT,
                reclong TEXT
            )",
            Self::table_name(region)
        );
        self.execute_on_table(TableOperation::Ensure, region, &sql)
    }

    fn clear_table(&mut self, region: &RegionId) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM \"{}\"", Self::table_name(region));
        self.execute_on_table(TableOperation::Clear, region, &sql)
    }

    fn insert_row(&mut self, region: &RegionId, row: RegionRow) -> Result<(), StoreError> {
        let connection = self.connection()?;
        let insert_error =
            |source: rusqlite::Error| StoreError::table(TableOperation::Insert, region, source);
        if connection.is_autocommit() {
            connection.execute_batch("BEGIN").map_err(insert_error)?;
        }
        let sql = format!(
            "INSERT INTO \"{}\" (name, mass, reclat, reclong) VALUES (?1, ?2, ?3, ?4)",
            Self::table_name(region)
        );
        let mut statement = connection.prepare_cached(&sql).map_err(insert_error)?;
        statement
            .execute((&row.name, &row.mass, &row.reclat, &row.reclong))
            .map(|_| ())
            .map_err(insert_error)
    }

    fn finalize(&mut self) -> Result<(), StoreError> {
        let connection = self.connection()?;
        if connection.is_autocommit() {
            return Ok(());
        }
        connection
            .execute_batch("COMMIT")
            .map_err(|source| StoreError::Finalize {
                source: source.into(),
            })
    }

    fn release(&mut self) -> Result<(), StoreError> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        connection
            .close()
            .map_err(|(_connection, source)| StoreError::Release {
                source: source.into(),
            })
    }
}
