//! Request and response types for the beef-chart API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use beef_chart_core::{BulkEditEntry, BulkStatus, CutRecord};

/// Response envelope shared by every cut endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request did what it asked for.
    pub success: bool,
    /// Payload.
    pub data: T,
}

/// Issued chart token.
#[derive(Debug, Clone, Deserialize)]
pub struct NonceResponse {
    /// The token.
    pub nonce: String,
    /// Action the token is bound to.
    pub action: String,
    /// Upper bound of the token's lifetime in seconds.
    pub expires_in: u64,
}

/// Body of the fetch endpoints.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FetchRequest<'a> {
    pub nonce: &'a str,
}

/// Single-cut save request.
#[derive(Debug, Clone, Serialize)]
pub struct SaveCutRequest {
    /// Cut id.
    pub id: u64,
    /// New price in euros per kilogram.
    pub price: f64,
    /// New availability.
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignedSaveCutRequest<'a> {
    pub nonce: &'a str,
    #[serde(flatten)]
    pub request: &'a SaveCutRequest,
}

/// Single-cut save response.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveCutResponse {
    /// Confirmation message.
    pub message: String,
    /// The record as stored after the update.
    pub cut: Option<CutRecord>,
}

/// Tokens the admin forms post back.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminTokens {
    /// Token for the single-cut save.
    pub beef_chart: String,
    /// Token for the bulk edit.
    pub bulk_update: String,
    /// Token for the reset.
    pub reset: String,
}

/// Admin listing.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCutsResponse {
    /// Every cut by id.
    pub cuts: Vec<CutRecord>,
    /// Number of cuts.
    pub count: usize,
    /// Number of cuts in a complete catalog.
    pub expected: u64,
    /// Per-action tokens.
    pub tokens: AdminTokens,
}

/// Bulk edit request.
#[derive(Debug, Clone, Serialize)]
pub struct BulkEditRequest {
    /// `bulk_update` token.
    pub nonce: String,
    /// Edits keyed by id.
    pub entries: BTreeMap<String, BulkEditEntry>,
}

/// Bulk edit outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkEditResponse {
    /// Aggregate status.
    pub status: BulkStatus,
    /// Entries applied.
    pub updated: usize,
    /// One message per rejected entry.
    pub errors: Vec<String>,
    /// Summary for the editor.
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetRequest<'a> {
    pub nonce: &'a str,
}

/// Reset outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetResponse {
    /// Rows inserted.
    pub inserted: usize,
    /// Summary for the editor.
    pub message: String,
}
