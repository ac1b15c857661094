//! `RocksDB` storage implementation.
//!
//! The cut table is a column family named after the table; its existence is
//! the table's existence. Rows are CBOR-encoded and keyed by big-endian id.
//! The id sequence lives in the `meta` column family and is never reset.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use serde::{Deserialize, Serialize};

use beef_chart_core::{CutId, CutRecord, CutUpdate, NewCut, Price};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{self, META_COLUMN_FAMILY};
use crate::Store;

/// Stored row; the id is the key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCut {
    name: String,
    price_cents: i64,
    available: bool,
}

impl StoredCut {
    fn into_record(self, id: CutId) -> CutRecord {
        CutRecord {
            id,
            name: self.name,
            price: Price::from_cents(self.price_cents),
            available: self.available,
        }
    }
}

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    table_name: String,
    /// Serializes writers so the id sequence and row writes stay consistent.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// Existing column families are reopened, so a table created by an
    /// earlier run is still there.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P, table_name: impl Into<String>) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut names = DBWithThreadMode::<MultiThreaded>::list_cf(&opts, path.as_ref())
            .unwrap_or_default();
        names.retain(|name| name != rocksdb::DEFAULT_COLUMN_FAMILY_NAME);
        if !names.iter().any(|name| name == META_COLUMN_FAMILY) {
            names.push(META_COLUMN_FAMILY.to_string());
        }

        let cf_descriptors: Vec<_> = names
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            table_name: table_name.into(),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Option<Arc<BoundColumnFamily<'_>>> {
        self.db.cf_handle(name)
    }

    /// Handle of the cut table, or `TableMissing`.
    fn table(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.cf(&self.table_name)
            .ok_or_else(|| StoreError::TableMissing(self.table_name.clone()))
    }

    fn meta(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.cf(META_COLUMN_FAMILY)
            .ok_or_else(|| StoreError::Database("meta column family not found".into()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn read_row(&self, id: CutId) -> Result<Option<CutRecord>> {
        let cf = self.table()?;
        self.db
            .get_cf(&cf, keys::record_key(id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize::<StoredCut>(&data).map(|row| row.into_record(id)))
            .transpose()
    }
}

#[async_trait]
impl Store for RocksStore {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table_exists(&self) -> Result<bool> {
        Ok(self.cf(&self.table_name).is_some())
    }

    async fn create_table(&self) -> Result<()> {
        let _guard = self.lock()?;
        if self.cf(&self.table_name).is_some() {
            return Ok(());
        }

        self.db
            .create_cf(&self.table_name, &Options::default())
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!(table = %self.table_name, "Created column family for cut table");
        Ok(())
    }

    async fn truncate(&self) -> Result<()> {
        let _guard = self.lock()?;
        let cf = self.table()?;

        let mut batch = WriteBatch::default();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            batch.delete_cf(&cf, key);
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let cf = self.table()?;
        let mut count = 0u64;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::Database(e.to_string()))?;
            count += 1;
        }
        Ok(count)
    }

    async fn list(&self) -> Result<Vec<CutRecord>> {
        let cf = self.table()?;
        let mut records = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let id = keys::id_from_record_key(&key)
                .ok_or_else(|| StoreError::Serialization("malformed record key".into()))?;
            let row: StoredCut = Self::deserialize(&value)?;
            records.push(row.into_record(id));
        }

        Ok(records)
    }

    async fn get(&self, id: CutId) -> Result<Option<CutRecord>> {
        self.read_row(id)
    }

    async fn insert(&self, cut: &NewCut) -> Result<CutRecord> {
        schema::check_new_cut(cut)?;

        let _guard = self.lock()?;
        let cf = self.table()?;
        let meta = self.meta()?;
        let seq_key = keys::sequence_key(&self.table_name);

        let next_id = keys::decode_sequence(
            self.db
                .get_cf(&meta, &seq_key)
                .map_err(|e| StoreError::Database(e.to_string()))?
                .as_deref(),
        );
        let id = CutId::new(next_id)
            .ok_or_else(|| StoreError::Database("id sequence exhausted".into()))?;

        let row = StoredCut {
            name: cut.name.clone(),
            price_cents: cut.price.cents(),
            available: cut.available,
        };
        let value = Self::serialize(&row)?;

        // Row and sequence bump land together
        let mut batch = WriteBatch::default();
        batch.put_cf(&cf, keys::record_key(id), &value);
        batch.put_cf(&meta, &seq_key, keys::encode_sequence(next_id + 1));

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.into_record(id))
    }

    async fn update(&self, id: CutId, update: &CutUpdate) -> Result<()> {
        schema::check_update(update)?;

        let _guard = self.lock()?;
        let cf = self.table()?;
        let key = keys::record_key(id);

        let data = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .ok_or(StoreError::NotFound)?;

        let mut row: StoredCut = Self::deserialize(&data)?;
        row.price_cents = update.price.cents();
        row.available = update.available;

        let value = Self::serialize(&row)?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
