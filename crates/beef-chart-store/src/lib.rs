//! Storage and cache layer for the beef cut chart.
//!
//! This crate owns the cut table and everything that reads or writes it:
//!
//! - [`Store`]: the record store trait, one table of cut records
//! - [`MemoryStore`]: in-process backend (tests, demos, single-node setups)
//! - `RocksStore`: `RocksDB` backend (feature `rocksdb-backend`)
//! - `PgStore`: `PostgreSQL` backend (feature `postgres-backend`)
//! - [`CatalogCache`]: read-through cache with per-key TTLs
//! - [`CatalogRepository`]: the data access API; the only thing callers use
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use beef_chart_core::default_catalog;
//! use beef_chart_store::{CacheConfig, CatalogRepository, MemoryStore};
//!
//! # async fn example() -> beef_chart_store::Result<()> {
//! let store = Arc::new(MemoryStore::new("wp_beef_chart_data"));
//! let repo = CatalogRepository::new(store, CacheConfig::default());
//!
//! repo.create_table().await;
//! for cut in default_catalog() {
//!     repo.insert(&cut).await;
//! }
//! assert_eq!(repo.count().await?, 29);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cache;
pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "postgres-backend")]
pub mod postgres;
pub mod repository;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use cache::{CacheConfig, CatalogCache};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "postgres-backend")]
pub use postgres::PgStore;
pub use repository::CatalogRepository;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use async_trait::async_trait;
use beef_chart_core::{CutId, CutRecord, CutUpdate, NewCut};

/// The record store: a single table of cut records.
///
/// Implementations own persisted state and nothing else. Caching, write
/// skipping and invalidation live in [`CatalogRepository`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Name of the backing table, resolved once at construction.
    fn table_name(&self) -> &str;

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Whether the table has been created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn table_exists(&self) -> Result<bool>;

    /// Create the table. Creating an existing table is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_table(&self) -> Result<()>;

    /// Delete every record. The id sequence is not reset.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableMissing` if the table does not exist.
    async fn truncate(&self) -> Result<()>;

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Number of records.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableMissing` if the table does not exist.
    async fn count(&self) -> Result<u64>;

    /// All records, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableMissing` if the table does not exist.
    async fn list(&self) -> Result<Vec<CutRecord>>;

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableMissing` if the table does not exist.
    async fn get(&self, id: CutId) -> Result<Option<CutRecord>>;

    /// Whether a record with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::TableMissing` if the table does not exist.
    async fn exists(&self, id: CutId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    /// Append a record and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// - `StoreError::Constraint` if the row violates the table constraints.
    /// - `StoreError::TableMissing` if the table does not exist.
    async fn insert(&self, cut: &NewCut) -> Result<CutRecord>;

    /// Set price and availability of an existing record. The name is untouched.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the record doesn't exist.
    /// - `StoreError::Constraint` if the price violates the column constraint.
    async fn update(&self, id: CutId, update: &CutUpdate) -> Result<()>;
}
