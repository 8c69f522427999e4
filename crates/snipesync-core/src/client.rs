//! Snipe-IT HTTP client (reqwest-based).
//!
//! Wraps `reqwest::Client` with bearer-token auth and the engine's retry
//! policy.  Lookup endpoints deserialize the `rows` array; mutation endpoints
//! hand back the raw status and body so the upsert engine can classify
//! success, duplicate-key conflicts, and structured errors itself.

use crate::error::{SyncError, SyncResult};
use crate::models::{HardwareRow, IdRow, ModelRow, RawResponse, Rows};
use crate::retry::RetryPolicy;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Snipe-IT API client.
#[derive(Debug, Clone)]
pub struct SnipeClient {
    /// Base URL including the API prefix, e.g. `https://assets.example.com/api/v1`.
    base_url: String,
    token: String,
    http: Client,
    retry: RetryPolicy,
}

impl SnipeClient {
    /// Create a new client with its own HTTP connection pool.
    pub fn new(base_url: &str, token: &str, retry: RetryPolicy) -> SyncResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("snipesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(base_url, token, http, retry))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: &str, token: &str, http: Client, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
            retry,
        }
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Hardware ──────────────────────────────────────────────────────

    /// Search hardware assets (all statuses) by free-text query.
    pub async fn search_hardware(&self, search: &str) -> SyncResult<Vec<HardwareRow>> {
        self.get_rows("/hardware", &[("search", search), ("status", "all")])
            .await
    }

    /// Create a hardware asset (POST /hardware).
    pub async fn create_hardware(&self, payload: &Value) -> SyncResult<RawResponse> {
        self.mutate(Method::POST, "/hardware".to_string(), payload)
            .await
    }

    /// Update a hardware asset (PATCH /hardware/{id}).
    pub async fn update_hardware(&self, id: i64, payload: &Value) -> SyncResult<RawResponse> {
        self.mutate(Method::PATCH, format!("/hardware/{id}"), payload)
            .await
    }

    // ── Models ────────────────────────────────────────────────────────

    /// Search models by free-text query.
    pub async fn search_models(&self, search: &str) -> SyncResult<Vec<ModelRow>> {
        self.get_rows("/models", &[("search", search)]).await
    }

    /// Create a model (POST /models).
    pub async fn create_model(&self, payload: &Value) -> SyncResult<RawResponse> {
        self.mutate(Method::POST, "/models".to_string(), payload)
            .await
    }

    /// Assign a fieldset to a model (PATCH /models/{id}).
    pub async fn assign_fieldset(&self, model_id: i64, fieldset_id: i64) -> SyncResult<RawResponse> {
        let payload = serde_json::json!({ "fieldset_id": fieldset_id });
        self.mutate(Method::PATCH, format!("/models/{model_id}"), &payload)
            .await
    }

    // ── Lookup tables ─────────────────────────────────────────────────

    /// Search status labels by name.
    pub async fn search_status_labels(&self, name: &str) -> SyncResult<Vec<IdRow>> {
        self.get_rows("/statuslabels", &[("name", name)]).await
    }

    /// Search categories by name.
    pub async fn search_categories(&self, name: &str) -> SyncResult<Vec<IdRow>> {
        self.get_rows("/categories", &[("name", name)]).await
    }

    /// Search users by email.
    pub async fn search_users(&self, email: &str) -> SyncResult<Vec<IdRow>> {
        self.get_rows("/users", &[("email", email)]).await
    }

    // ── Internal ──────────────────────────────────────────────────────

    async fn get_rows<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SyncResult<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path, ?query, "GET {}", url);

        let op = format!("GET {path}");
        let response = self
            .retry
            .execute(&op, || {
                let req = self
                    .http
                    .get(&url)
                    .bearer_auth(&self.token)
                    .header(ACCEPT, "application/json")
                    .query(query);
                dispatch(req)
            })
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::Api {
                status: status.as_u16(),
                detail: body,
            });
        }

        let rows: Rows<T> = serde_json::from_str(&body)
            .map_err(|e| SyncError::Parse(format!("{op}: {e}")))?;
        Ok(rows.rows)
    }

    /// Send a mutation and return the raw response regardless of HTTP status;
    /// Snipe-IT reports most failures inside a 200 envelope.
    async fn mutate(&self, method: Method, path: String, body: &Value) -> SyncResult<RawResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "{} {}", method, url);

        let op = format!("{method} {path}");
        let response = self
            .retry
            .execute(&op, || {
                let req = self
                    .http
                    .request(method.clone(), &url)
                    .bearer_auth(&self.token)
                    .header(ACCEPT, "application/json")
                    .header(CONTENT_TYPE, "application/json")
                    .json(body);
                dispatch(req)
            })
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Send one request, converting HTTP 429 into the retryable rate-limit error.
async fn dispatch(req: RequestBuilder) -> SyncResult<reqwest::Response> {
    let response = req.send().await?;
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        return Err(SyncError::RateLimited { retry_after_secs });
    }
    Ok(response)
}
