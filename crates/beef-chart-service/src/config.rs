//! Service configuration.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use beef_chart_store::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TABLE_EXISTS_TTL, DEFAULT_VOLATILE_TTL};
use beef_chart_store::{schema, CacheConfig};

/// Which record store backs the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process table, lost on restart.
    Memory,
    /// `RocksDB` under `DATA_DIR`.
    RocksDb,
    /// `PostgreSQL` at `DATABASE_URL`.
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::RocksDb => "rocksdb",
            Self::Postgres => "postgres",
        })
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/beef-chart").
    pub data_dir: String,

    /// Record store backend (default: memory).
    pub storage_backend: StorageBackend,

    /// `PostgreSQL` connection string, required by the postgres backend.
    pub database_url: Option<String>,

    /// Prefix of the cut table name (default: "wp_").
    pub table_prefix: String,

    /// Admin API key. Without one every admin request is rejected.
    pub admin_api_key: Option<String>,

    /// Secret the anti-forgery tokens are signed with.
    pub nonce_secret: String,

    /// Anti-forgery token lifetime in seconds.
    pub nonce_lifetime_seconds: u64,

    /// TTL of cached counts, lists and per-id entries, in seconds.
    pub cache_ttl_seconds: u64,

    /// TTL of the cached table-existence flag, in seconds.
    pub table_exists_ttl_seconds: u64,

    /// Maximum number of cache entries.
    pub cache_max_entries: u64,

    /// Minimum seconds between request-path provisioning checks.
    pub provision_check_interval_seconds: u64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Secrets file structure.
#[derive(Debug, Deserialize)]
struct ServiceSecrets {
    #[serde(default)]
    admin_api_key: Option<String>,
    #[serde(default)]
    nonce_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and the secrets file.
    #[must_use]
    pub fn from_env() -> Self {
        let (admin_api_key, nonce_secret) = load_service_secrets();

        let storage_backend = std::env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| {
                s.parse()
                    .map_err(|e: String| tracing::warn!(error = %e, "Falling back to memory backend"))
                    .ok()
            })
            .unwrap_or(StorageBackend::Memory);

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/beef-chart".into()),
            storage_backend,
            database_url: std::env::var("DATABASE_URL").ok(),
            table_prefix: std::env::var("TABLE_PREFIX").unwrap_or_else(|_| "wp_".into()),
            admin_api_key,
            nonce_secret: nonce_secret.unwrap_or_else(random_secret),
            nonce_lifetime_seconds: env_parse("NONCE_LIFETIME_SECONDS", 86_400),
            cache_ttl_seconds: env_parse("CACHE_TTL_SECONDS", DEFAULT_VOLATILE_TTL.as_secs()),
            table_exists_ttl_seconds: env_parse(
                "TABLE_EXISTS_TTL_SECONDS",
                DEFAULT_TABLE_EXISTS_TTL.as_secs(),
            ),
            cache_max_entries: env_parse("CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
            provision_check_interval_seconds: env_parse("PROVISION_CHECK_INTERVAL_SECONDS", 60),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES", 1024 * 1024), // 1MB
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS", 30),
        }
    }

    /// Full name of the cut table.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured prefix is not a safe identifier.
    pub fn table_name(&self) -> beef_chart_store::Result<String> {
        schema::table_name(&self.table_prefix)
    }

    /// Cache tuning derived from the TTL settings.
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            volatile_ttl: Duration::from_secs(self.cache_ttl_seconds),
            table_exists_ttl: Duration::from_secs(self.table_exists_ttl_seconds),
            max_entries: self.cache_max_entries,
        }
    }

    /// Minimum time between request-path provisioning checks.
    #[must_use]
    pub fn provision_check_interval(&self) -> Duration {
        Duration::from_secs(self.provision_check_interval_seconds)
    }

    /// Anti-forgery token lifetime.
    #[must_use]
    pub fn nonce_lifetime(&self) -> Duration {
        Duration::from_secs(self.nonce_lifetime_seconds)
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn random_secret() -> String {
    tracing::warn!("NONCE_SECRET not set; tokens will not survive a restart");
    uuid::Uuid::new_v4().simple().to_string()
}

/// Load service secrets from file or environment.
///
/// Values found in the file win over the environment.
fn load_service_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/beef-chart.json",
        "beef-chart/.secrets/beef-chart.json",
        "../.secrets/beef-chart.json",
    ];

    let env_admin_key = std::env::var("ADMIN_API_KEY").ok();
    let env_nonce_secret = std::env::var("NONCE_SECRET").ok();

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<ServiceSecrets>(path) {
            tracing::info!(path = %path, "Loaded service secrets from file");
            return (
                secrets.admin_api_key.or(env_admin_key),
                secrets.nonce_secret.or(env_nonce_secret),
            );
        }
    }

    tracing::debug!("Service secrets file not found, using environment variables");
    (env_admin_key, env_nonce_secret)
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/beef-chart".into(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            table_prefix: "wp_".into(),
            admin_api_key: None,
            nonce_secret: uuid::Uuid::new_v4().simple().to_string(),
            nonce_lifetime_seconds: 86_400,
            cache_ttl_seconds: DEFAULT_VOLATILE_TTL.as_secs(),
            table_exists_ttl_seconds: DEFAULT_TABLE_EXISTS_TTL.as_secs(),
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            provision_check_interval_seconds: 60,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
