//! Beef cut chart HTTP API service.
//!
//! This crate provides the HTTP API in front of the cut catalog:
//!
//! - Public chart data (available cuts, renderer series)
//! - Single-cut price updates from the chart editor
//! - Admin listing, bulk edit and reset
//! - Startup provisioning and throttled self-healing of the catalog
//!
//! # Authentication
//!
//! Two mechanisms, layered:
//!
//! 1. **Admin API key** - `X-Admin-Key` header on every privileged endpoint
//! 2. **Anti-forgery tokens** - short-lived HMAC tokens bound to one action,
//!    issued by the service and echoed back with the request

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Token handlers never await but must be async for routing

pub mod auth;
pub mod bulk;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod nonce;
pub mod provision;
pub mod routes;
pub mod state;

pub use config::{ServiceConfig, StorageBackend};
pub use error::ApiError;
pub use nonce::{NonceAction, NonceIssuer};
pub use provision::{ProvisionError, ProvisionOutcome, Provisioner};
pub use routes::create_router;
pub use state::AppState;
