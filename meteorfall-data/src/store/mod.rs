//! Storage engines implementing [`meteorfall_core::RegionStore`].

mod sqlite;

pub use sqlite::SqliteRegionStore;

#[cfg(test)]
mod tests;
