//! In-memory storage implementation.
//!
//! Holds the table in a `BTreeMap` behind an `RwLock`. Nothing survives a
//! restart; the service reseeds on startup.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use beef_chart_core::{CutId, CutRecord, CutUpdate, NewCut};

use crate::error::{Result, StoreError};
use crate::schema;
use crate::Store;

/// In-memory storage implementation.
pub struct MemoryStore {
    table_name: String,
    state: RwLock<MemoryState>,
    writes: AtomicU64,
}

#[derive(Default)]
struct MemoryState {
    /// `None` until the table is created.
    rows: Option<BTreeMap<CutId, CutRecord>>,
    next_id: u64,
}

impl MemoryStore {
    /// Create a store whose table does not exist yet.
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            state: RwLock::new(MemoryState {
                rows: None,
                next_id: 1,
            }),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of successful row writes (inserts, updates, truncates).
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }

    fn missing(&self) -> StoreError {
        StoreError::TableMissing(self.table_name.clone())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table_exists(&self) -> Result<bool> {
        Ok(self.read()?.rows.is_some())
    }

    async fn create_table(&self) -> Result<()> {
        let mut state = self.write()?;
        if state.rows.is_none() {
            state.rows = Some(BTreeMap::new());
            tracing::debug!(table = %self.table_name, "Created in-memory table");
        }
        Ok(())
    }

    async fn truncate(&self) -> Result<()> {
        let mut state = self.write()?;
        let rows = state.rows.as_mut().ok_or_else(|| self.missing())?;
        rows.clear();
        self.record_write();
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let state = self.read()?;
        let rows = state.rows.as_ref().ok_or_else(|| self.missing())?;
        Ok(rows.len() as u64)
    }

    async fn list(&self) -> Result<Vec<CutRecord>> {
        let state = self.read()?;
        let rows = state.rows.as_ref().ok_or_else(|| self.missing())?;
        Ok(rows.values().cloned().collect())
    }

    async fn get(&self, id: CutId) -> Result<Option<CutRecord>> {
        let state = self.read()?;
        let rows = state.rows.as_ref().ok_or_else(|| self.missing())?;
        Ok(rows.get(&id).cloned())
    }

    async fn insert(&self, cut: &NewCut) -> Result<CutRecord> {
        schema::check_new_cut(cut)?;

        let mut state = self.write()?;
        let next_id = state.next_id;
        let id = CutId::new(next_id)
            .ok_or_else(|| StoreError::Database("id sequence exhausted".into()))?;
        let rows = state.rows.as_mut().ok_or_else(|| self.missing())?;

        let record = CutRecord {
            id,
            name: cut.name.clone(),
            price: cut.price,
            available: cut.available,
        };
        rows.insert(id, record.clone());
        state.next_id = next_id + 1;
        self.record_write();

        Ok(record)
    }

    async fn update(&self, id: CutId, update: &CutUpdate) -> Result<()> {
        schema::check_update(update)?;

        let mut state = self.write()?;
        let rows = state.rows.as_mut().ok_or_else(|| self.missing())?;
        let record = rows.get_mut(&id).ok_or(StoreError::NotFound)?;

        record.price = update.price;
        record.available = update.available;
        self.record_write();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beef_chart_core::Price;

    fn cut(name: &str, cents: i64) -> NewCut {
        NewCut::new(name, Price::from_cents(cents), true)
    }

    #[tokio::test]
    async fn table_lifecycle() {
        let store = MemoryStore::new("t_beef_chart_data");
        assert!(!store.table_exists().await.unwrap());
        assert!(matches!(store.count().await, Err(StoreError::TableMissing(_))));

        store.create_table().await.unwrap();
        store.create_table().await.unwrap();
        assert!(store.table_exists().await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn record_crud() {
        let store = MemoryStore::new("t_beef_chart_data");
        store.create_table().await.unwrap();

        let a = store.insert(&cut("Queue", 1500)).await.unwrap();
        let b = store.insert(&cut("Langue", 3500)).await.unwrap();
        assert_eq!(a.id.get(), 1);
        assert_eq!(b.id.get(), 2);

        let update = CutUpdate {
            price: Price::from_cents(1800),
            available: false,
        };
        store.update(a.id, &update).await.unwrap();

        let fetched = store.get(a.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Queue");
        assert_eq!(fetched.price.cents(), 1800);
        assert!(!fetched.available);

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Queue", "Langue"]);
    }

    #[tokio::test]
    async fn update_missing_record() {
        let store = MemoryStore::new("t_beef_chart_data");
        store.create_table().await.unwrap();

        let update = CutUpdate {
            price: Price::from_cents(100),
            available: true,
        };
        let result = store.update(CutId::new(5).unwrap(), &update).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn ids_not_reused_after_truncate() {
        let store = MemoryStore::new("t_beef_chart_data");
        store.create_table().await.unwrap();
        store.insert(&cut("Queue", 1500)).await.unwrap();
        store.insert(&cut("Langue", 3500)).await.unwrap();

        store.truncate().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let again = store.insert(&cut("Queue", 1500)).await.unwrap();
        assert_eq!(again.id.get(), 3);
    }

    #[tokio::test]
    async fn constraint_violation_rejected() {
        let store = MemoryStore::new("t_beef_chart_data");
        store.create_table().await.unwrap();

        let result = store.insert(&cut("", 1500)).await;
        assert!(matches!(result, Err(StoreError::Constraint(_))));
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.write_count(), 0);
    }
}
