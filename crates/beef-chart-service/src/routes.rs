//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, cuts, health};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /v1/nonce` - Issue the chart token
///
/// ## Chart (chart token)
/// - `POST /v1/cuts/fetch` - Available cuts
/// - `POST /v1/cuts/series` - Available cuts as `{name, value}` points
///
/// ## Editor (chart token + admin key)
/// - `POST /v1/cuts/save` - Update one cut
///
/// ## Admin (admin key, plus a per-action token for writes)
/// - `GET /v1/admin/cuts` - Every cut and fresh form tokens
/// - `POST /v1/admin/cuts/bulk` - Bulk edit
/// - `POST /v1/admin/cuts/reset` - Reset to the default catalog
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        .route("/v1/nonce", get(cuts::issue_nonce))
        // Chart
        .route("/v1/cuts/fetch", post(cuts::fetch_cuts))
        .route("/v1/cuts/series", post(cuts::fetch_series))
        .route("/v1/cuts/save", post(cuts::save_cut))
        // Admin
        .route("/v1/admin/cuts", get(admin::list_cuts))
        .route("/v1/admin/cuts/bulk", post(admin::bulk_update))
        .route("/v1/admin/cuts/reset", post(admin::reset))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
