//! Common test utilities for beef-chart integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestRequest, TestServer};

use beef_chart_service::auth::ADMIN_KEY_HEADER;
use beef_chart_service::{create_router, AppState, NonceAction, NonceIssuer, ServiceConfig};
use beef_chart_store::MemoryStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The backing store, for assertions that bypass the API.
    pub store: Arc<MemoryStore>,
    /// The admin API key.
    pub admin_key: String,
    /// Issuer sharing the service's secret.
    pub nonces: NonceIssuer,
}

impl TestHarness {
    /// Harness over an empty store; the first chart request provisions it.
    pub fn new() -> Self {
        let (state, store, harness_nonces) = Self::state();
        Self::from_state(state, store, harness_nonces)
    }

    /// Harness over a store seeded with the default catalog.
    pub async fn seeded() -> Self {
        let (state, store, harness_nonces) = Self::state();
        state
            .provisioner
            .ensure_seeded()
            .await
            .expect("Failed to seed catalog");
        Self::from_state(state, store, harness_nonces)
    }

    fn state() -> (AppState, Arc<MemoryStore>, NonceIssuer) {
        let store = Arc::new(MemoryStore::new("wp_beef_chart_data"));
        let admin_key = "test-admin-key".to_string();
        let nonce_secret = "test-nonce-secret".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            admin_api_key: Some(admin_key),
            nonce_secret: nonce_secret.clone(),
            ..ServiceConfig::default()
        };

        let nonces = NonceIssuer::new(nonce_secret, Duration::from_secs(config.nonce_lifetime_seconds));
        let state = AppState::new(store.clone(), config);
        (state, store, nonces)
    }

    fn from_state(state: AppState, store: Arc<MemoryStore>, nonces: NonceIssuer) -> Self {
        let admin_key = state
            .config
            .admin_api_key
            .clone()
            .expect("admin key configured");
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            admin_key,
            nonces,
        }
    }

    /// A valid token for `action`.
    pub fn token(&self, action: NonceAction) -> String {
        self.nonces.issue(action).expect("Failed to issue token")
    }

    /// A valid chart token.
    pub fn chart_nonce(&self) -> String {
        self.token(NonceAction::BeefChart)
    }

    /// GET request carrying the admin key.
    pub fn admin_get(&self, path: &str) -> TestRequest {
        self.server.get(path).add_header(admin_header(), self.admin_value())
    }

    /// POST request carrying the admin key.
    pub fn admin_post(&self, path: &str) -> TestRequest {
        self.server.post(path).add_header(admin_header(), self.admin_value())
    }

    fn admin_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.admin_key).expect("valid header value")
    }
}

fn admin_header() -> HeaderName {
    HeaderName::from_static(ADMIN_KEY_HEADER)
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
