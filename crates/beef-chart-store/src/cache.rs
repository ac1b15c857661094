//! Read-through cache in front of the cut table.
//!
//! One `moka` cache holds every cached query shape. Expiry is per key: the
//! table-existence flag lives for an hour, everything else for five minutes
//! by default.
//!
//! Every key is tagged with a generation number. Invalidation bumps the
//! generation, which orphans every entry at once regardless of how many ids
//! there are; orphans age out by TTL or capacity eviction. A value computed
//! before an invalidation can only ever land under the old generation, so it
//! is never read back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache;
use moka::Expiry;

use beef_chart_core::{CutId, CutRecord, CutUpdate};

/// Default TTL for volatile entries.
pub const DEFAULT_VOLATILE_TTL: Duration = Duration::from_secs(300);

/// Default TTL for the table-existence flag.
pub const DEFAULT_TABLE_EXISTS_TTL: Duration = Duration::from_secs(3600);

/// Default cache capacity in entries.
pub const DEFAULT_MAX_ENTRIES: u64 = 1024;

/// Cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL of counts, lists, existence checks and item snapshots.
    pub volatile_ttl: Duration,
    /// TTL of the table-existence flag.
    pub table_exists_ttl: Duration,
    /// Maximum number of cached entries.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            volatile_ttl: DEFAULT_VOLATILE_TTL,
            table_exists_ttl: DEFAULT_TABLE_EXISTS_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Entry {
    TableExists,
    Count,
    AllData,
    Exists(CutId),
    Item(CutId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    entry: Entry,
    generation: u64,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Flag(bool),
    Count(u64),
    Records(Arc<Vec<CutRecord>>),
    Item(CutUpdate),
}

struct CatalogExpiry {
    volatile: Duration,
    table_exists: Duration,
}

impl CatalogExpiry {
    fn ttl(&self, key: &CacheKey) -> Duration {
        match key.entry {
            Entry::TableExists => self.table_exists,
            _ => self.volatile,
        }
    }
}

impl Expiry<CacheKey, CacheValue> for CatalogExpiry {
    fn expire_after_create(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.ttl(key))
    }

    fn expire_after_update(
        &self,
        key: &CacheKey,
        _value: &CacheValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(self.ttl(key))
    }
}

/// Cache of catalog query results.
///
/// The cache is never the source of truth. Every setter takes the generation
/// observed before the store read it caches and files the value under it, so
/// an invalidation in between leaves the value unreachable.
pub struct CatalogCache {
    inner: Cache<CacheKey, CacheValue>,
    generation: AtomicU64,
}

impl CatalogCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_entries)
            .expire_after(CatalogExpiry {
                volatile: config.volatile_ttl,
                table_exists: config.table_exists_ttl,
            })
            .build();

        Self {
            inner,
            generation: AtomicU64::new(0),
        }
    }

    /// Current invalidation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Drop every cached value.
    pub fn invalidate_all(&self) {
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        // Free the aggregate slots early; per-id orphans age out
        for entry in [Entry::TableExists, Entry::Count, Entry::AllData] {
            self.inner.invalidate(&CacheKey {
                entry,
                generation: previous,
            });
        }
        tracing::trace!(generation = previous + 1, "Catalog cache invalidated");
    }

    fn get(&self, entry: Entry) -> Option<CacheValue> {
        let key = CacheKey {
            entry,
            generation: self.generation(),
        };
        let value = self.inner.get(&key);
        tracing::trace!(?key, hit = value.is_some(), "Catalog cache lookup");
        value
    }

    fn put(&self, generation: u64, entry: Entry, value: CacheValue) {
        if generation == self.generation() {
            self.inner.insert(CacheKey { entry, generation }, value);
        }
    }

    /// Cached table-existence flag.
    #[must_use]
    pub fn table_exists(&self) -> Option<bool> {
        match self.get(Entry::TableExists)? {
            CacheValue::Flag(flag) => Some(flag),
            _ => None,
        }
    }

    /// Cache the table-existence flag.
    pub fn put_table_exists(&self, generation: u64, exists: bool) {
        self.put(generation, Entry::TableExists, CacheValue::Flag(exists));
    }

    /// Cached record count.
    #[must_use]
    pub fn count(&self) -> Option<u64> {
        match self.get(Entry::Count)? {
            CacheValue::Count(count) => Some(count),
            _ => None,
        }
    }

    /// Cache the record count.
    pub fn put_count(&self, generation: u64, count: u64) {
        self.put(generation, Entry::Count, CacheValue::Count(count));
    }

    /// Cached full record list.
    #[must_use]
    pub fn all(&self) -> Option<Arc<Vec<CutRecord>>> {
        match self.get(Entry::AllData)? {
            CacheValue::Records(records) => Some(records),
            _ => None,
        }
    }

    /// Cache the full record list, plus an item snapshot per record.
    pub fn put_all(&self, generation: u64, records: Arc<Vec<CutRecord>>) {
        for record in records.iter() {
            self.put_item(generation, record.id, record.snapshot());
        }
        self.put(generation, Entry::AllData, CacheValue::Records(records));
    }

    /// Cached per-id existence flag.
    #[must_use]
    pub fn exists(&self, id: CutId) -> Option<bool> {
        match self.get(Entry::Exists(id))? {
            CacheValue::Flag(flag) => Some(flag),
            _ => None,
        }
    }

    /// Cache a per-id existence flag.
    pub fn put_exists(&self, generation: u64, id: CutId, exists: bool) {
        self.put(generation, Entry::Exists(id), CacheValue::Flag(exists));
    }

    /// Cached snapshot of a record's price and availability.
    #[must_use]
    pub fn item(&self, id: CutId) -> Option<CutUpdate> {
        match self.get(Entry::Item(id))? {
            CacheValue::Item(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Cache a record snapshot.
    pub fn put_item(&self, generation: u64, id: CutId, snapshot: CutUpdate) {
        self.put(generation, Entry::Item(id), CacheValue::Item(snapshot));
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beef_chart_core::Price;

    fn id(n: u64) -> CutId {
        CutId::new(n).unwrap()
    }

    fn snapshot(cents: i64) -> CutUpdate {
        CutUpdate {
            price: Price::from_cents(cents),
            available: true,
        }
    }

    #[test]
    fn stores_each_shape() {
        let cache = CatalogCache::default();
        let generation = cache.generation();

        cache.put_table_exists(generation, true);
        cache.put_count(generation, 29);
        cache.put_exists(generation, id(3), true);

        assert_eq!(cache.table_exists(), Some(true));
        assert_eq!(cache.count(), Some(29));
        assert_eq!(cache.exists(id(3)), Some(true));
        assert_eq!(cache.exists(id(4)), None);
    }

    #[test]
    fn put_all_records_item_snapshots() {
        let cache = CatalogCache::default();
        let records = vec![CutRecord {
            id: id(1),
            name: "Queue".into(),
            price: Price::from_cents(1500),
            available: true,
        }];

        cache.put_all(cache.generation(), Arc::new(records));
        assert_eq!(cache.all().map(|r| r.len()), Some(1));
        assert_eq!(cache.item(id(1)), Some(snapshot(1500)));
    }

    #[test]
    fn invalidation_covers_every_id() {
        let cache = CatalogCache::default();
        let generation = cache.generation();
        for n in [1, 50, 51, 10_000] {
            cache.put_exists(generation, id(n), true);
            cache.put_item(generation, id(n), snapshot(100));
        }
        cache.put_count(generation, 4);

        cache.invalidate_all();

        for n in [1, 50, 51, 10_000] {
            assert_eq!(cache.exists(id(n)), None);
            assert_eq!(cache.item(id(n)), None);
        }
        assert_eq!(cache.count(), None);
    }

    #[test]
    fn stale_generation_writes_are_dropped() {
        let cache = CatalogCache::default();
        let before = cache.generation();
        cache.invalidate_all();

        cache.put_count(before, 7);
        cache.put_exists(before, id(1), true);
        assert_eq!(cache.count(), None);
        assert_eq!(cache.exists(id(1)), None);
    }

    #[test]
    fn insert_racing_an_invalidation_is_never_read() {
        let cache = CatalogCache::default();
        let before = cache.generation();
        let records = Arc::new(Vec::new());

        // The generation check passed, then another writer invalidated
        // before the insert landed
        cache.invalidate_all();
        for (entry, value) in [
            (Entry::Count, CacheValue::Count(7)),
            (Entry::AllData, CacheValue::Records(records)),
            (Entry::TableExists, CacheValue::Flag(false)),
        ] {
            cache.inner.insert(
                CacheKey {
                    entry,
                    generation: before,
                },
                value,
            );
        }

        assert_eq!(cache.count(), None);
        assert!(cache.all().is_none());
        assert_eq!(cache.table_exists(), None);
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = CatalogCache::new(CacheConfig {
            volatile_ttl: Duration::from_millis(50),
            table_exists_ttl: Duration::from_secs(60),
            max_entries: 16,
        });
        let generation = cache.generation();
        cache.put_count(generation, 3);
        cache.put_table_exists(generation, true);

        std::thread::sleep(Duration::from_millis(120));

        assert_eq!(cache.count(), None);
        assert_eq!(cache.table_exists(), Some(true));
    }
}
