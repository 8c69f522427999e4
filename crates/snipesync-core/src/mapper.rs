//! Directory-device to asset-payload mapping.

use crate::config::SyncConfig;
use crate::device::{format_mac, DirectoryDevice};
use serde_json::{Map, Value};

/// Date format used for custom date fields.
const DATE_FMT: &str = "%Y-%m-%d";

/// Builds Snipe-IT payloads out of directory records.
///
/// Custom-field keys come from configuration; fields the directory did not
/// report are omitted from the payload rather than sent as null.
pub struct AssetMapper {
    field_mac_address: String,
    field_sync_date: String,
    field_ip_address: String,
    field_user: String,
}

impl AssetMapper {
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            field_mac_address: config.field_mac_address.clone(),
            field_sync_date: config.field_sync_date.clone(),
            field_ip_address: config.field_ip_address.clone(),
            field_user: config.field_user.clone(),
        }
    }

    /// Payload for creating an asset.  The serial doubles as the asset tag.
    #[must_use]
    pub fn create_payload(
        &self,
        device: &DirectoryDevice,
        serial: &str,
        model_id: i64,
        status_id: i64,
    ) -> Value {
        let mut fields = Map::new();
        fields.insert("asset_tag".into(), serial.into());
        fields.insert("serial".into(), serial.into());
        fields.insert("model_id".into(), model_id.into());
        fields.insert("status_id".into(), status_id.into());
        self.custom_fields(&mut fields, device);
        Value::Object(fields)
    }

    /// Payload for updating an existing asset.
    ///
    /// Updates additionally carry the end-of-life date; creates leave it to
    /// the follow-up sync because Snipe-IT rejects `eol` on POST.
    #[must_use]
    pub fn update_payload(
        &self,
        device: &DirectoryDevice,
        model_id: i64,
        status_id: i64,
    ) -> Value {
        let mut fields = Map::new();
        fields.insert("model_id".into(), model_id.into());
        fields.insert("status_id".into(), status_id.into());
        if let Some(eol) = device.eol_date() {
            fields.insert("eol".into(), eol.format(DATE_FMT).to_string().into());
        }
        self.custom_fields(&mut fields, device);
        Value::Object(fields)
    }

    /// The sync date is the device's first reported activity date, so the
    /// asset records when the fleet last saw the machine, not when the sync
    /// ran.
    fn custom_fields(&self, fields: &mut Map<String, Value>, device: &DirectoryDevice) {
        if let Some(date) = device.first_activity() {
            fields.insert(self.field_sync_date.clone(), date.into());
        }
        if let Some(mac) = device.mac_address.as_deref() {
            fields.insert(self.field_mac_address.clone(), format_mac(mac).into());
        }
        if let Some(ip) = device.last_ip_address() {
            fields.insert(self.field_ip_address.clone(), ip.into());
        }
        if let Some(email) = device.recent_user_email() {
            fields.insert(self.field_user.clone(), email.into());
        }
    }
}
