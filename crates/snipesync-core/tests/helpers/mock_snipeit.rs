//! Mock Snipe-IT server using wiremock for integration testing.
//!
//! Mounts canned responses for the hardware, model, and lookup-table
//! endpoints, including the error envelopes Snipe-IT hides inside HTTP 200.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use snipesync_core::{
    ModelClassifier, ModelMatch, RetryPolicy, SnipeClient, SyncConfig, SyncError, SyncResult,
    TaxonomyResolver, Upserter,
};
use std::sync::Arc;

/// A classifier that always answers with a fixed category.
pub struct StubClassifier(pub &'static str);

#[async_trait]
impl ModelClassifier for StubClassifier {
    async fn classify(&self, _model_name: &str, _categories: &[String]) -> SyncResult<String> {
        Ok(self.0.to_string())
    }
}

/// A classifier that always fails.
pub struct FailingClassifier;

#[async_trait]
impl ModelClassifier for FailingClassifier {
    async fn classify(&self, model_name: &str, _categories: &[String]) -> SyncResult<String> {
        Err(SyncError::Classifier(format!(
            "no category for {model_name}"
        )))
    }
}

/// Configuration pointed at a mock server, with the historical defaults.
pub fn test_config(base_url: &str) -> SyncConfig {
    SyncConfig {
        api_token: "test-token".to_string(),
        base_url: base_url.to_string(),
        default_model_id: 87,
        default_status_id: 2,
        fieldset_id: 9,
        field_mac_address: "_snipeit_mac_address_1".to_string(),
        field_sync_date: "_snipeit_sync_date_9".to_string(),
        field_ip_address: "_snipeit_ip_address_3".to_string(),
        field_user: "_snipeit_user_10".to_string(),
        active_status: "ACTIVE".to_string(),
        max_retries: 4,
        retry_delay_secs: 0,
        model_match: ModelMatch::BestEffort,
        gemini_api_key: "gemini-key".to_string(),
        gemini_model: "gemini-1.5-flash".to_string(),
        categories: vec!["Chromebook".to_string(), "Laptop".to_string()],
        google_access_token: None,
        google_customer_id: "my_customer".to_string(),
        dry_run: false,
    }
}

/// Mock Snipe-IT instance plus factory helpers for pre-wired components.
pub struct MockSnipeIt {
    server: MockServer,
}

impl MockSnipeIt {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// A client with zero retry delay for fast tests.
    pub fn client(&self) -> SnipeClient {
        self.client_with_retry(RetryPolicy::new(4, 0))
    }

    pub fn client_with_retry(&self, retry: RetryPolicy) -> SnipeClient {
        SnipeClient::with_http_client(&self.uri(), "test-token", reqwest::Client::new(), retry)
    }

    pub fn config(&self) -> SyncConfig {
        test_config(&self.uri())
    }

    pub fn resolver(&self, classifier: Arc<dyn ModelClassifier>) -> TaxonomyResolver {
        TaxonomyResolver::new(self.client(), classifier, &self.config())
    }

    pub fn resolver_with_config(
        &self,
        classifier: Arc<dyn ModelClassifier>,
        config: &SyncConfig,
    ) -> TaxonomyResolver {
        TaxonomyResolver::new(self.client(), classifier, config)
    }

    pub fn upserter(&self, classifier: Arc<dyn ModelClassifier>) -> Upserter {
        let config = self.config();
        Upserter::new(
            self.client(),
            TaxonomyResolver::new(self.client(), classifier, &config),
            &config,
        )
    }

    // ── Hardware mocks ────────────────────────────────────────────────

    /// Hardware search returning the given rows for a serial.
    pub async fn mock_hardware_search(&self, serial: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/hardware"))
            .and(query_param("search", serial))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows_body(rows)))
            .mount(&self.server)
            .await;
    }

    /// Hardware search that finds nothing, consumed after `times` calls.
    pub async fn mock_hardware_search_empty_times(&self, serial: &str, times: u64) {
        Mock::given(method("GET"))
            .and(path("/hardware"))
            .and(query_param("search", serial))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows_body(json!([]))))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_hardware_success(&self, id: i64) {
        Mock::given(method("POST"))
            .and(path("/hardware"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "messages": "Asset created successfully.",
                "payload": {"id": id}
            })))
            .mount(&self.server)
            .await;
    }

    /// Create that reports a duplicate asset tag inside an HTTP 200 envelope.
    pub async fn mock_create_hardware_duplicate(&self) {
        Mock::given(method("POST"))
            .and(path("/hardware"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "error",
                "messages": {
                    "asset_tag": ["The asset tag has already been taken."],
                    "serial": ["The serial has already been taken."]
                }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_update_hardware_success(&self, id: i64) {
        Mock::given(method("PATCH"))
            .and(path(format!("/hardware/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "messages": "Asset updated successfully.",
                "payload": {"id": id}
            })))
            .mount(&self.server)
            .await;
    }

    // ── Model mocks ───────────────────────────────────────────────────

    pub async fn mock_model_search(&self, search: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(query_param("search", search))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows_body(rows)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_create_model_success(&self, id: i64) {
        Mock::given(method("POST"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "messages": "Model created successfully.",
                "payload": {"id": id}
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_assign_fieldset_success(&self, model_id: i64) {
        Mock::given(method("PATCH"))
            .and(path(format!("/models/{model_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "messages": "Model updated successfully.",
                "payload": {"id": model_id}
            })))
            .mount(&self.server)
            .await;
    }

    // ── Lookup-table mocks ────────────────────────────────────────────

    pub async fn mock_status_labels(&self, name: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/statuslabels"))
            .and(query_param("name", name))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows_body(rows)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_categories(&self, name: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/categories"))
            .and(query_param("name", name))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows_body(rows)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_users(&self, email: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("email", email))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows_body(rows)))
            .mount(&self.server)
            .await;
    }

    // ── Failure mocks ─────────────────────────────────────────────────

    /// Rate-limit the hardware endpoint for the first `times` requests.
    pub async fn mock_rate_limited_times(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path("/hardware"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("Retry-After", "1"),
            )
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Rate-limit the hardware endpoint permanently.
    pub async fn mock_rate_limited_always(&self) {
        Mock::given(method("GET"))
            .and(path("/hardware"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&self.server)
            .await;
    }
}

fn rows_body(rows: Value) -> Value {
    let total = rows.as_array().map(Vec::len).unwrap_or(0);
    json!({ "total": total, "rows": rows })
}
