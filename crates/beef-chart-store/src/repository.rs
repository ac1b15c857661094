//! Data access API over the cut table.
//!
//! Reads go through [`CatalogCache`]; writes go straight to the [`Store`] and
//! invalidate the cache before reporting success. Write operations answer
//! with a plain `bool` and log the underlying failure.

use std::sync::Arc;

use beef_chart_core::{CutId, CutRecord, CutUpdate, NewCut};

use crate::cache::{CacheConfig, CatalogCache};
use crate::error::{Result, StoreError};
use crate::Store;

/// Cached access to the cut table.
pub struct CatalogRepository {
    store: Arc<dyn Store>,
    cache: CatalogCache,
}

impl CatalogRepository {
    /// Wrap a store with a fresh cache.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: CacheConfig) -> Self {
        Self {
            store,
            cache: CatalogCache::new(config),
        }
    }

    /// Name of the backing table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.store.table_name()
    }

    // =========================================================================
    // Table Operations
    // =========================================================================

    /// Whether the table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot answer.
    pub async fn table_exists(&self) -> Result<bool> {
        if let Some(exists) = self.cache.table_exists() {
            return Ok(exists);
        }

        let generation = self.cache.generation();
        let exists = self.store.table_exists().await?;
        self.cache.put_table_exists(generation, exists);
        Ok(exists)
    }

    /// Create the table if it is missing.
    pub async fn create_table(&self) -> bool {
        match self.store.create_table().await {
            Ok(()) => {
                self.cache.invalidate_all();
                true
            }
            Err(e) => {
                tracing::error!(table = %self.table_name(), error = %e, "Failed to create cut table");
                false
            }
        }
    }

    /// Delete every record.
    pub async fn truncate(&self) -> bool {
        let result = self.store.truncate().await;
        self.cache.invalidate_all();

        match result {
            Ok(()) => {
                tracing::info!(table = %self.table_name(), "Truncated cut table");
                true
            }
            Err(e) => {
                tracing::error!(table = %self.table_name(), error = %e, "Failed to truncate cut table");
                false
            }
        }
    }

    /// Drop every cached value.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Number of records. A missing table counts as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot answer.
    pub async fn count(&self) -> Result<u64> {
        if let Some(count) = self.cache.count() {
            return Ok(count);
        }

        let generation = self.cache.generation();
        let count = match self.store.count().await {
            Ok(count) => count,
            Err(StoreError::TableMissing(_)) => 0,
            Err(e) => return Err(e),
        };
        self.cache.put_count(generation, count);
        Ok(count)
    }

    /// All records ordered by id. A missing table yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot answer.
    pub async fn get_all(&self) -> Result<Vec<CutRecord>> {
        if let Some(records) = self.cache.all() {
            return Ok(records.as_ref().clone());
        }

        let generation = self.cache.generation();
        let records = match self.store.list().await {
            Ok(records) => records,
            Err(StoreError::TableMissing(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        self.cache.put_all(generation, Arc::new(records.clone()));
        Ok(records)
    }

    /// One record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot answer.
    pub async fn get(&self, id: CutId) -> Result<Option<CutRecord>> {
        let generation = self.cache.generation();
        let record = match self.store.get(id).await {
            Ok(record) => record,
            Err(StoreError::TableMissing(_)) => None,
            Err(e) => return Err(e),
        };
        if let Some(record) = &record {
            self.cache.put_item(generation, id, record.snapshot());
        }
        Ok(record)
    }

    /// Whether a record with this raw id exists. Zero never exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot answer.
    pub async fn exists(&self, id: u64) -> Result<bool> {
        let Some(id) = CutId::new(id) else {
            return Ok(false);
        };
        if let Some(exists) = self.cache.exists(id) {
            return Ok(exists);
        }

        let generation = self.cache.generation();
        let exists = match self.store.exists(id).await {
            Ok(exists) => exists,
            Err(StoreError::TableMissing(_)) => false,
            Err(e) => return Err(e),
        };
        self.cache.put_exists(generation, id, exists);
        Ok(exists)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append a record.
    pub async fn insert(&self, cut: &NewCut) -> bool {
        match self.store.insert(cut).await {
            Ok(record) => {
                self.cache.invalidate_all();
                tracing::debug!(id = %record.id, name = %record.name, "Inserted cut");
                true
            }
            Err(e) => {
                tracing::error!(name = %cut.name, error = %e, "Failed to insert cut");
                false
            }
        }
    }

    /// Set price and availability of a record.
    ///
    /// Skips the write when the cached snapshot already matches. Returns
    /// `false` if the record does not exist or the write fails.
    pub async fn update(&self, id: CutId, update: &CutUpdate) -> bool {
        if self.cache.item(id) == Some(*update) {
            tracing::debug!(%id, "Cut unchanged, skipping write");
            return true;
        }

        match self.store.update(id, update).await {
            Ok(()) => {
                self.cache.invalidate_all();
                self.cache.put_item(self.cache.generation(), id, *update);
                true
            }
            Err(StoreError::NotFound) => {
                tracing::warn!(%id, "Update for missing cut");
                false
            }
            Err(e) => {
                tracing::error!(%id, error = %e, "Failed to update cut");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use beef_chart_core::{default_catalog, Price};
    use std::time::Duration;

    const TABLE: &str = "wp_beef_chart_data";

    fn setup() -> (Arc<MemoryStore>, CatalogRepository) {
        let store = Arc::new(MemoryStore::new(TABLE));
        let repo = CatalogRepository::new(store.clone(), CacheConfig::default());
        (store, repo)
    }

    async fn seeded() -> (Arc<MemoryStore>, CatalogRepository) {
        let (store, repo) = setup();
        assert!(repo.create_table().await);
        for cut in default_catalog() {
            assert!(repo.insert(&cut).await);
        }
        (store, repo)
    }

    fn id(n: u64) -> CutId {
        CutId::new(n).unwrap()
    }

    #[tokio::test]
    async fn missing_table_reads_as_empty() {
        let (_store, repo) = setup();
        assert!(!repo.table_exists().await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.get_all().await.unwrap().is_empty());
        assert!(!repo.exists(1).await.unwrap());
        assert!(!repo.truncate().await);
    }

    #[tokio::test]
    async fn create_table_refreshes_cached_flag() {
        let (_store, repo) = setup();
        assert!(!repo.table_exists().await.unwrap());

        assert!(repo.create_table().await);
        assert!(repo.table_exists().await.unwrap());
        assert!(repo.create_table().await);
    }

    #[tokio::test]
    async fn get_all_is_ordered_by_id() {
        let (_store, repo) = seeded().await;
        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 29);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(all[0].name, "Queue");
        assert_eq!(all[28].name, "Filet");
    }

    #[tokio::test]
    async fn unchanged_update_skips_write() {
        let (store, repo) = seeded().await;
        let first = repo.get_all().await.unwrap().remove(0);
        let writes = store.write_count();

        assert!(repo.update(first.id, &first.snapshot()).await);
        assert_eq!(store.write_count(), writes);

        let changed = CutUpdate {
            price: Price::from_cents(1800),
            available: false,
        };
        assert!(repo.update(first.id, &changed).await);
        assert_eq!(store.write_count(), writes + 1);

        assert!(repo.update(first.id, &changed).await);
        assert_eq!(store.write_count(), writes + 1);
    }

    #[tokio::test]
    async fn reads_follow_writes() {
        let (_store, repo) = seeded().await;
        assert_eq!(repo.count().await.unwrap(), 29);
        let before = repo.get_all().await.unwrap();

        let update = CutUpdate {
            price: Price::from_cents(2000),
            available: false,
        };
        assert!(repo.update(before[1].id, &update).await);

        let after = repo.get_all().await.unwrap();
        assert_eq!(after[1].price.cents(), 2000);
        assert!(!after[1].available);

        assert!(repo.insert(&NewCut::new("Extra", Price::from_cents(100), true)).await);
        assert_eq!(repo.count().await.unwrap(), 30);
    }

    #[tokio::test]
    async fn update_of_missing_id_fails() {
        let (_store, repo) = seeded().await;
        let update = CutUpdate {
            price: Price::from_cents(100),
            available: true,
        };
        assert!(!repo.update(id(999), &update).await);
    }

    #[tokio::test]
    async fn truncate_clears_every_cached_id() {
        let (_store, repo) = seeded().await;
        let extra = NewCut::new("Extra", Price::from_cents(100), true);
        for _ in 0..30 {
            assert!(repo.insert(&extra).await);
        }

        for n in [1, 29, 51, 59] {
            assert!(repo.exists(n).await.unwrap());
        }
        assert!(!repo.exists(0).await.unwrap());

        assert!(repo.truncate().await);

        for n in [1, 29, 51, 59] {
            assert!(!repo.exists(n).await.unwrap());
        }
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn snapshot_cleared_by_truncate() {
        let (store, repo) = seeded().await;
        let first = repo.get_all().await.unwrap().remove(0);

        assert!(repo.truncate().await);
        let writes = store.write_count();

        assert!(!repo.update(first.id, &first.snapshot()).await);
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn cached_count_expires() {
        let store = Arc::new(MemoryStore::new(TABLE));
        let repo = CatalogRepository::new(
            store.clone(),
            CacheConfig {
                volatile_ttl: Duration::from_millis(50),
                ..CacheConfig::default()
            },
        );
        assert!(repo.create_table().await);
        assert_eq!(repo.count().await.unwrap(), 0);

        // Bypass the repository so only expiry can refresh the count
        store
            .insert(&NewCut::new("Queue", Price::from_cents(1500), true))
            .await
            .unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
