//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use beef_chart_core::EXPECTED_CUT_COUNT;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, `degraded` (table missing or incomplete) or `unavailable`.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Catalog state, absent when the store cannot answer.
    pub catalog: Option<CatalogHealth>,
}

/// Catalog state as seen through the cache.
#[derive(Debug, Serialize)]
pub struct CatalogHealth {
    /// Cut table name.
    pub table: String,
    /// Whether the table exists.
    pub table_exists: bool,
    /// Rows in the table.
    pub cuts: u64,
    /// Rows in a complete catalog.
    pub expected: u64,
}

/// Health check endpoint.
///
/// Reads go through the repository cache, so polling this does not hit the
/// store on every call. It never provisions.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let repository = &state.repository;
    let catalog = match (repository.table_exists().await, repository.count().await) {
        (Ok(table_exists), Ok(cuts)) => Some(CatalogHealth {
            table: repository.table_name().to_string(),
            table_exists,
            cuts,
            expected: EXPECTED_CUT_COUNT,
        }),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Health check could not read the catalog");
            None
        }
    };

    let (code, status) = match &catalog {
        None => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        Some(c) if c.table_exists && c.cuts == c.expected => (StatusCode::OK, "ok"),
        Some(_) => (StatusCode::OK, "degraded"),
    };

    (
        code,
        Json(HealthResponse {
            status,
            service: "beef-chart",
            version: env!("CARGO_PKG_VERSION"),
            catalog,
        }),
    )
}
