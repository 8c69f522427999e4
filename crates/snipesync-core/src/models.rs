//! Wire types for the Snipe-IT REST API.

use serde::Deserialize;
use serde_json::Value;

/// List responses wrap their results in a `rows` array.
#[derive(Debug, Deserialize)]
pub struct Rows<T> {
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
}

/// A hardware asset row, keyed for duplicate detection by tag and serial.
#[derive(Debug, Clone, Deserialize)]
pub struct HardwareRow {
    pub id: i64,
    #[serde(default)]
    pub asset_tag: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
}

/// A model row; `name` is unique by convention.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRow {
    pub id: i64,
    pub name: String,
}

/// Minimal row for status labels, categories, and users: only the id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRow {
    pub id: i64,
}

/// Envelope returned by mutation endpoints.
///
/// Snipe-IT answers mutations with HTTP 200 and `{"status": "success"|"error"}`;
/// duplicate-key conflicts arrive as an error whose `messages` object names
/// the colliding field.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub messages: Option<Value>,
}

impl ApiEnvelope {
    /// Whether the error messages name the asset-tag or serial field, i.e.
    /// the create collided with an existing asset.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        self.messages
            .as_ref()
            .and_then(Value::as_object)
            .map(|m| m.contains_key("asset_tag") || m.contains_key("serial"))
            .unwrap_or(false)
    }

    /// The id of the created resource, if the payload carries one.
    #[must_use]
    pub fn payload_id(&self) -> Option<i64> {
        self.payload.as_ref()?.get("id")?.as_i64()
    }
}

/// Status code and raw body of a mutation response, before classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// Parse the body as a mutation envelope.
    pub fn envelope(&self) -> crate::error::SyncResult<ApiEnvelope> {
        serde_json::from_str(&self.body).map_err(|e| {
            crate::error::SyncError::Parse(format!("unparseable API envelope: {e}: {}", self.body))
        })
    }
}
