pub mod models;
pub mod queries;
pub mod sqlite;

pub use models::{BookUpdate, CatalogEntry, NewCatalogEntry};
pub use sqlite::Database;

use crate::error::Error;

/// The two catalog operations the scan pipeline depends on.
///
/// `Database` is the production implementation; anything that can answer an
/// identity lookup and take a batch insert can stand in for it.
pub trait CatalogStore {
    fn exists(&self, identity: &str) -> Result<bool, Error>;

    /// Persist `entries` as one unit and return how many rows were actually
    /// written. Entries whose identity already exists are not counted.
    fn insert_many(&self, entries: &[NewCatalogEntry]) -> Result<usize, Error>;
}
