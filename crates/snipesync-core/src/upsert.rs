//! Create-or-update logic for a single device.
//!
//! The happy path is a straight create.  When the create collides with an
//! existing asset tag or serial, the engine re-resolves the asset and falls
//! through to an update, so running the sync twice against the same fleet is
//! a no-op apart from refreshed field values.

use crate::client::SnipeClient;
use crate::config::SyncConfig;
use crate::device::DirectoryDevice;
use crate::error::{SyncError, SyncResult};
use crate::mapper::AssetMapper;
use crate::stats::Outcome;
use crate::taxonomy::TaxonomyResolver;
use tracing::{debug, info, warn};

pub struct Upserter {
    client: SnipeClient,
    taxonomy: TaxonomyResolver,
    mapper: AssetMapper,
    default_model_id: i64,
    default_status_id: i64,
    active_status: String,
}

impl Upserter {
    #[must_use]
    pub fn new(client: SnipeClient, taxonomy: TaxonomyResolver, config: &SyncConfig) -> Self {
        Self {
            client,
            taxonomy,
            mapper: AssetMapper::new(config),
            default_model_id: config.default_model_id,
            default_status_id: config.default_status_id,
            active_status: config.active_status.clone(),
        }
    }

    /// Sync one device into Snipe-IT.
    pub async fn upsert_device(&self, device: &DirectoryDevice) -> SyncResult<Outcome> {
        let serial = device
            .serial_number
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                SyncError::InvalidRecord("device has no serial number".to_string())
            })?;

        let model_id = self.resolve_model(device).await?;
        let status_id = self.resolve_status(device).await;

        match self.find_asset(serial).await? {
            Some(asset_id) => {
                let payload = self.mapper.update_payload(device, model_id, status_id);
                self.update(asset_id, serial, &payload).await?;
                Ok(Outcome::Updated)
            }
            None => self.create(device, serial, model_id, status_id).await,
        }
    }

    /// Locate an existing asset by serial number.
    ///
    /// `Ok(Some(id))` when an asset owns this serial or tag, `Ok(None)` when
    /// the search came back clean, `Err` when the search itself failed.
    async fn find_asset(&self, serial: &str) -> SyncResult<Option<i64>> {
        let rows = self.client.search_hardware(serial).await?;
        Ok(rows
            .iter()
            .find(|row| {
                row.serial.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(serial))
                    || row
                        .asset_tag
                        .as_deref()
                        .is_some_and(|t| t.eq_ignore_ascii_case(serial))
            })
            .map(|row| row.id))
    }

    async fn resolve_model(&self, device: &DirectoryDevice) -> SyncResult<i64> {
        match device.model.as_deref().filter(|m| !m.trim().is_empty()) {
            Some(model) => self.taxonomy.ensure_model(model).await,
            None => Ok(self.default_model_id),
        }
    }

    /// Map the directory status to a status-label id.  The active sentinel
    /// maps straight to the configured deployed status; other statuses are
    /// looked up by name.  A miss or a failed lookup falls back to the
    /// default label; status ambiguity never blocks the device.
    async fn resolve_status(&self, device: &DirectoryDevice) -> i64 {
        let status = match device.status.as_deref().filter(|s| !s.is_empty()) {
            Some(status) => status,
            None => return self.default_status_id,
        };
        if status.eq_ignore_ascii_case(&self.active_status) {
            return self.default_status_id;
        }
        match self.taxonomy.resolve_status_id(status).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(status, "unknown device status; using default status label");
                self.default_status_id
            }
            Err(e) => {
                warn!(status, error = %e, "status lookup failed; using default status label");
                self.default_status_id
            }
        }
    }

    async fn create(
        &self,
        device: &DirectoryDevice,
        serial: &str,
        model_id: i64,
        status_id: i64,
    ) -> SyncResult<Outcome> {
        let payload = self
            .mapper
            .create_payload(device, serial, model_id, status_id);
        let response = self.client.create_hardware(&payload).await?;
        let envelope = response.envelope()?;

        if envelope.status == "success" {
            info!(serial, "created asset");
            return Ok(Outcome::Created);
        }

        if envelope.is_duplicate_key() {
            // Another writer (or a tag-only collision the search missed) got
            // there first; route the device through the update path.
            debug!(serial, "create collided with existing asset; updating instead");
            let Some(asset_id) = self.find_asset(serial).await? else {
                // The owning asset vanished between the collision and the
                // re-lookup; nothing to write against.
                warn!(serial, "duplicate reported but no matching asset found; skipping");
                return Ok(Outcome::Skipped);
            };
            let payload = self.mapper.update_payload(device, model_id, status_id);
            self.update(asset_id, serial, &payload).await?;
            return Ok(Outcome::Updated);
        }

        Err(SyncError::Api {
            status: response.status,
            detail: format!("asset creation rejected: {}", response.body),
        })
    }

    async fn update(&self, asset_id: i64, serial: &str, payload: &serde_json::Value) -> SyncResult<()> {
        let response = self.client.update_hardware(asset_id, payload).await?;
        let envelope = response.envelope()?;
        if envelope.status != "success" {
            return Err(SyncError::Api {
                status: response.status,
                detail: format!("asset update rejected: {}", response.body),
            });
        }
        info!(serial, asset_id, "updated asset");
        Ok(())
    }
}
