//! Beef-chart HTTP client implementation.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use beef_chart_core::{ChartPoint, CutRecord};

use crate::error::ClientError;
use crate::types::{
    AdminCutsResponse, BulkEditRequest, BulkEditResponse, Envelope, FetchRequest, NonceResponse,
    ResetRequest, ResetResponse, SaveCutRequest, SaveCutResponse, SignedSaveCutRequest,
};

/// Beef-chart API client.
///
/// Public chart calls need only a token from [`nonce`](Self::nonce). Save and
/// admin calls also need the admin key.
#[derive(Debug, Clone)]
pub struct BeefChartClient {
    client: Client,
    base_url: String,
    admin_key: Option<String>,
}

impl BeefChartClient {
    /// Create a client for the public endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_key: options.admin_key,
        })
    }

    // =========================================================================
    // Public
    // =========================================================================

    /// Get a chart token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn nonce(&self) -> Result<NonceResponse, ClientError> {
        let response = self.client.get(self.url("/v1/nonce")).send().await?;
        Ok(Self::handle_response(response).await?.data)
    }

    /// Available cuts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn fetch_cuts(&self, nonce: &str) -> Result<Vec<CutRecord>, ClientError> {
        let response = self
            .client
            .post(self.url("/v1/cuts/fetch"))
            .json(&FetchRequest { nonce })
            .send()
            .await?;

        Ok(Self::handle_response(response).await?.data)
    }

    /// Available cuts as `{name, value}` points.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn fetch_series(&self, nonce: &str) -> Result<Vec<ChartPoint>, ClientError> {
        let response = self
            .client
            .post(self.url("/v1/cuts/series"))
            .json(&FetchRequest { nonce })
            .send()
            .await?;

        Ok(Self::handle_response(response).await?.data)
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Update one cut.
    ///
    /// # Errors
    ///
    /// Returns an error if no admin key is configured, the request fails or
    /// the server returns an error.
    pub async fn save_cut(
        &self,
        nonce: &str,
        request: &SaveCutRequest,
    ) -> Result<SaveCutResponse, ClientError> {
        let response = self
            .admin(self.client.post(self.url("/v1/cuts/save")))?
            .json(&SignedSaveCutRequest { nonce, request })
            .send()
            .await?;

        Ok(Self::handle_response(response).await?.data)
    }

    /// Every cut with fresh form tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if no admin key is configured, the request fails or
    /// the server returns an error.
    pub async fn admin_cuts(&self) -> Result<AdminCutsResponse, ClientError> {
        let response = self
            .admin(self.client.get(self.url("/v1/admin/cuts")))?
            .send()
            .await?;

        Ok(Self::handle_response(response).await?.data)
    }

    /// Apply a bulk edit.
    ///
    /// A batch that applied nothing is still returned as a report with
    /// status `failure`.
    ///
    /// # Errors
    ///
    /// Returns an error if no admin key is configured, the request fails or
    /// the server returns an error.
    pub async fn bulk_update(
        &self,
        request: &BulkEditRequest,
    ) -> Result<BulkEditResponse, ClientError> {
        let response = self
            .admin(self.client.post(self.url("/v1/admin/cuts/bulk")))?
            .json(request)
            .send()
            .await?;

        Ok(Self::handle_response(response).await?.data)
    }

    /// Reset the catalog to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if no admin key is configured, the request fails or
    /// the server returns an error.
    pub async fn reset(&self, nonce: &str) -> Result<ResetResponse, ClientError> {
        let response = self
            .admin(self.client.post(self.url("/v1/admin/cuts/reset")))?
            .json(&ResetRequest { nonce })
            .send()
            .await?;

        Ok(Self::handle_response(response).await?.data)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn admin(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let key = self.admin_key.as_ref().ok_or(ClientError::MissingAdminKey)?;
        Ok(request.header("x-admin-key", key))
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        tracing::debug!(status = %status, "beef-chart request failed");
        let message = serde_json::from_str::<Envelope<String>>(&body)
            .map_or_else(|_| format!("HTTP {status}"), |envelope| envelope.data);

        Err(ClientError::Api {
            message,
            status: status.as_u16(),
        })
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Admin key for save and admin calls.
    pub admin_key: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            admin_key: None,
        }
    }
}

impl ClientOptions {
    /// Create options with an admin key.
    #[must_use]
    pub fn with_admin_key(key: impl Into<String>) -> Self {
        Self {
            admin_key: Some(key.into()),
            ..Self::default()
        }
    }
}
