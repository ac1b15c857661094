//! Application state.

use std::sync::Arc;

use beef_chart_store::{CatalogRepository, Store};

use crate::config::ServiceConfig;
use crate::nonce::NonceIssuer;
use crate::provision::Provisioner;

/// Application state shared across handlers.
pub struct AppState {
    /// Cached access to the cut table.
    pub repository: Arc<CatalogRepository>,

    /// Seeding and self-healing of the catalog.
    pub provisioner: Provisioner,

    /// Anti-forgery token issuer.
    pub nonces: NonceIssuer,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over a record store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        tracing::info!(table = %store.table_name(), "Catalog repository ready");

        let repository = Arc::new(CatalogRepository::new(store, config.cache_config()));
        let provisioner = Provisioner::new(repository.clone(), config.provision_check_interval());
        let nonces = NonceIssuer::new(config.nonce_secret.clone(), config.nonce_lifetime());

        if config.admin_api_key.is_none() {
            tracing::warn!("ADMIN_API_KEY not configured - admin endpoints will reject all requests");
        }

        Self {
            repository,
            provisioner,
            nonces,
            config,
        }
    }

    /// Check if an admin key is configured.
    #[must_use]
    pub fn has_admin_key(&self) -> bool {
        self.config.admin_api_key.is_some()
    }
}
