//! Catalog provisioning: create the table, seed the defaults, self-heal.
//!
//! The catalog is healthy when it holds at least [`EXPECTED_CUT_COUNT`]
//! rows. A missing table is created, an empty one is seeded and a partial
//! one is wiped and reseeded.
//!
//! Provisioning runs once at startup. Request handlers call
//! [`Provisioner::ensure_seeded_throttled`], which repeats the check at most
//! once per interval. All runs hold one async lock, so concurrent requests
//! never seed twice.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use beef_chart_core::{default_catalog, EXPECTED_CUT_COUNT};
use beef_chart_store::{CatalogRepository, StoreError};

/// What a provisioning check did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The catalog was already complete.
    AlreadySeeded,
    /// The table was missing or empty and has been seeded.
    Seeded {
        /// Rows inserted.
        inserted: usize,
    },
    /// The table was partial and has been wiped and reseeded.
    Reseeded {
        /// Rows inserted.
        inserted: usize,
    },
}

/// Provisioning failure.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// The table could not be created.
    #[error("failed to create table {0}")]
    CreateTable(String),

    /// The table could not be emptied.
    #[error("failed to truncate table {0}")]
    Truncate(String),

    /// The store could not be queried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs provisioning against one repository.
pub struct Provisioner {
    repository: Arc<CatalogRepository>,
    check_interval: Duration,
    /// Time of the last successful check.
    last_check: Mutex<Option<Instant>>,
}

impl Provisioner {
    /// Create a provisioner that rechecks at most once per `check_interval`.
    #[must_use]
    pub fn new(repository: Arc<CatalogRepository>, check_interval: Duration) -> Self {
        Self {
            repository,
            check_interval,
            last_check: Mutex::new(None),
        }
    }

    /// Bring the catalog to a complete state.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created, counted or emptied.
    pub async fn ensure_seeded(&self) -> Result<ProvisionOutcome, ProvisionError> {
        let mut last_check = self.last_check.lock().await;
        let outcome = self.check().await?;
        *last_check = Some(Instant::now());
        Ok(outcome)
    }

    /// Like [`ensure_seeded`](Self::ensure_seeded), but a no-op returning
    /// `None` when the last successful check is younger than the interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created, counted or emptied.
    pub async fn ensure_seeded_throttled(
        &self,
    ) -> Result<Option<ProvisionOutcome>, ProvisionError> {
        let mut last_check = self.last_check.lock().await;
        if (*last_check).is_some_and(|at| at.elapsed() < self.check_interval) {
            return Ok(None);
        }

        let outcome = self.check().await?;
        *last_check = Some(Instant::now());
        Ok(Some(outcome))
    }

    /// Wipe the catalog and reseed the defaults. Returns the rows inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be emptied.
    pub async fn reset(&self) -> Result<usize, ProvisionError> {
        let mut last_check = self.last_check.lock().await;

        if !self.repository.truncate().await {
            return Err(ProvisionError::Truncate(
                self.repository.table_name().to_string(),
            ));
        }
        let inserted = self.seed_defaults().await;
        *last_check = Some(Instant::now());

        tracing::info!(inserted, "Catalog reset to defaults");
        Ok(inserted)
    }

    /// Insert the default catalog in order. Failed inserts are skipped.
    pub async fn seed_defaults(&self) -> usize {
        let mut inserted = 0;
        for cut in default_catalog() {
            if self.repository.insert(&cut).await {
                inserted += 1;
            }
        }

        if inserted < default_catalog().len() {
            tracing::warn!(inserted, "Some default cuts could not be inserted");
        }
        inserted
    }

    async fn check(&self) -> Result<ProvisionOutcome, ProvisionError> {
        let table = self.repository.table_name().to_string();

        if !self.repository.table_exists().await? {
            tracing::info!(table = %table, "Cut table missing, creating");
            if !self.repository.create_table().await {
                return Err(ProvisionError::CreateTable(table));
            }
        }

        let count = self.repository.count().await?;
        if count >= EXPECTED_CUT_COUNT {
            return Ok(ProvisionOutcome::AlreadySeeded);
        }

        if count == 0 {
            let inserted = self.seed_defaults().await;
            tracing::info!(table = %table, inserted, "Seeded empty cut table");
            return Ok(ProvisionOutcome::Seeded { inserted });
        }

        tracing::warn!(table = %table, count, "Cut table incomplete, reseeding");
        if !self.repository.truncate().await {
            return Err(ProvisionError::Truncate(table));
        }
        let inserted = self.seed_defaults().await;
        Ok(ProvisionOutcome::Reseeded { inserted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beef_chart_core::{NewCut, Price};
    use beef_chart_store::{CacheConfig, MemoryStore, Store};

    fn setup(interval: Duration) -> (Arc<MemoryStore>, Arc<CatalogRepository>, Provisioner) {
        let store = Arc::new(MemoryStore::new("wp_beef_chart_data"));
        let repository = Arc::new(CatalogRepository::new(store.clone(), CacheConfig::default()));
        let provisioner = Provisioner::new(repository.clone(), interval);
        (store, repository, provisioner)
    }

    #[tokio::test]
    async fn missing_table_is_created_and_seeded() {
        let (store, _repo, provisioner) = setup(Duration::from_secs(60));

        let outcome = provisioner.ensure_seeded().await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::Seeded { inserted: 29 });
        assert_eq!(store.count().await.unwrap(), 29);

        let outcome = provisioner.ensure_seeded().await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::AlreadySeeded);
        assert_eq!(store.count().await.unwrap(), 29);
    }

    #[tokio::test]
    async fn partial_table_is_reseeded() {
        let (store, repo, provisioner) = setup(Duration::from_secs(60));
        store.create_table().await.unwrap();
        for cut in default_catalog().into_iter().take(10) {
            store.insert(&cut).await.unwrap();
        }

        let outcome = provisioner.ensure_seeded().await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::Reseeded { inserted: 29 });

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 29);
        // Ids keep climbing past the wiped rows
        assert_eq!(all[0].id.get(), 11);
        assert_eq!(all[0].name, "Queue");
        assert_eq!(all[28].name, "Filet");
    }

    #[tokio::test]
    async fn oversized_table_is_left_alone() {
        let (store, _repo, provisioner) = setup(Duration::from_secs(60));
        provisioner.ensure_seeded().await.unwrap();
        store
            .insert(&NewCut::new("Extra", Price::from_cents(100), true))
            .await
            .unwrap();

        // Fresh repository so the count is read from the store
        let repo = Arc::new(CatalogRepository::new(store.clone(), CacheConfig::default()));
        let fresh = Provisioner::new(repo.clone(), Duration::ZERO);
        assert_eq!(fresh.ensure_seeded().await.unwrap(), ProvisionOutcome::AlreadySeeded);
        assert_eq!(repo.count().await.unwrap(), 30);
    }

    #[tokio::test]
    async fn throttled_check_skips_within_interval() {
        let (store, repo, provisioner) = setup(Duration::from_secs(60));
        assert!(provisioner.ensure_seeded_throttled().await.unwrap().is_some());

        store.truncate().await.unwrap();
        repo.clear_cache();

        assert_eq!(provisioner.ensure_seeded_throttled().await.unwrap(), None);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn throttled_check_runs_after_interval() {
        let (store, repo, provisioner) = setup(Duration::ZERO);
        provisioner.ensure_seeded_throttled().await.unwrap();

        store.truncate().await.unwrap();
        repo.clear_cache();

        let outcome = provisioner.ensure_seeded_throttled().await.unwrap();
        assert_eq!(outcome, Some(ProvisionOutcome::Seeded { inserted: 29 }));
        assert_eq!(store.count().await.unwrap(), 29);
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let (store, repo, provisioner) = setup(Duration::from_secs(60));
        provisioner.ensure_seeded().await.unwrap();

        let first = repo.get_all().await.unwrap().remove(0);
        let update = beef_chart_core::CutUpdate {
            price: Price::from_cents(100),
            available: false,
        };
        assert!(repo.update(first.id, &update).await);

        assert_eq!(provisioner.reset().await.unwrap(), 29);
        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 29);
        assert!(all.iter().all(|c| c.available));
        assert_eq!(all[0].price.cents(), 1500);
        assert_eq!(store.count().await.unwrap(), 29);
    }

    #[tokio::test]
    async fn reset_without_table_fails() {
        let (_store, _repo, provisioner) = setup(Duration::from_secs(60));
        assert!(matches!(
            provisioner.reset().await,
            Err(ProvisionError::Truncate(_))
        ));
    }
}
