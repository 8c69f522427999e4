//! Device inventory sources.
//!
//! The sync engine pulls devices through the [`DirectorySource`] trait so
//! tests can feed fixtures without a live Google tenant.

use crate::device::DirectoryDevice;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

/// Default Admin SDK endpoint.
const GOOGLE_ADMIN_BASE: &str = "https://admin.googleapis.com/admin/directory/v1";

/// Page size requested from the directory.
const PAGE_SIZE: u32 = 200;

/// Anything that can enumerate the device fleet.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Fetch every device the source knows about.
    async fn fetch_devices(&self) -> SyncResult<Vec<DirectoryDevice>>;
}

/// Google Admin Directory ChromeOS device listing.
pub struct GoogleDirectory {
    base_url: String,
    access_token: String,
    customer_id: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevicePage {
    #[serde(default)]
    chromeosdevices: Vec<DirectoryDevice>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl GoogleDirectory {
    #[must_use]
    pub fn new(access_token: &str, customer_id: &str) -> Self {
        Self::with_base_url(GOOGLE_ADMIN_BASE, access_token, customer_id)
    }

    /// Point the source at a different endpoint (for testing).
    #[must_use]
    pub fn with_base_url(base_url: &str, access_token: &str, customer_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            customer_id: customer_id.to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_page(&self, page_token: Option<&str>) -> SyncResult<DevicePage> {
        let url = format!(
            "{}/customer/{}/devices/chromeos",
            self.base_url, self.customer_id
        );
        let mut query: Vec<(&str, String)> = vec![("maxResults", PAGE_SIZE.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::Api {
                status: status.as_u16(),
                detail: body,
            });
        }
        serde_json::from_str(&body).map_err(|e| SyncError::Parse(format!("device page: {e}")))
    }
}

#[async_trait]
impl DirectorySource for GoogleDirectory {
    /// Walk every page of the device listing.
    ///
    /// An authorization failure yields an empty fleet rather than an error so
    /// a revoked token produces a clean "nothing to sync" run.
    async fn fetch_devices(&self) -> SyncResult<Vec<DirectoryDevice>> {
        let mut devices = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self.fetch_page(page_token.as_deref()).await {
                Ok(page) => page,
                Err(SyncError::Api { status, detail })
                    if status == StatusCode::UNAUTHORIZED.as_u16()
                        || status == StatusCode::FORBIDDEN.as_u16() =>
                {
                    warn!(status, detail = %detail, "directory rejected credentials; treating fleet as empty");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e),
            };

            debug!(count = page.chromeosdevices.len(), "fetched device page");
            devices.extend(page.chromeosdevices);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(devices)
    }
}

/// Fixed in-memory device list, used by tests and dry runs.
pub struct StaticSource {
    devices: Vec<DirectoryDevice>,
}

impl StaticSource {
    #[must_use]
    pub fn new(devices: Vec<DirectoryDevice>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl DirectorySource for StaticSource {
    async fn fetch_devices(&self) -> SyncResult<Vec<DirectoryDevice>> {
        Ok(self.devices.clone())
    }
}
