//! Directory device records and field normalization.

use chrono::NaiveDate;
use serde::Deserialize;

/// A device as reported by the Google Admin Directory API.
///
/// Only the fields the sync consumes are modeled; the raw payload carries
/// many more.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDevice {
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub recent_users: Vec<RecentUser>,
    #[serde(default)]
    pub last_known_network: Vec<KnownNetwork>,
    #[serde(default)]
    pub active_time_ranges: Vec<ActiveTimeRange>,
    #[serde(default)]
    pub auto_update_through: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentUser {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownNetwork {
    #[serde(default)]
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimeRange {
    #[serde(default)]
    pub date: Option<String>,
}

impl DirectoryDevice {
    /// The first recorded activity date, used as the device's sync date.
    #[must_use]
    pub fn first_activity(&self) -> Option<&str> {
        self.active_time_ranges.first().and_then(|r| r.date.as_deref())
    }

    /// Email of the most recent user, if reported.
    #[must_use]
    pub fn recent_user_email(&self) -> Option<&str> {
        self.recent_users.first().and_then(|u| u.email.as_deref())
    }

    /// IP address from the most recent known network, if reported.
    #[must_use]
    pub fn last_ip_address(&self) -> Option<&str> {
        self.last_known_network
            .first()
            .and_then(|n| n.ip_address.as_deref())
    }

    /// Auto-update expiration parsed as an end-of-life date.
    #[must_use]
    pub fn eol_date(&self) -> Option<NaiveDate> {
        let raw = self.auto_update_through.as_deref()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

/// Normalize a MAC address to lowercase colon-separated pairs.
///
/// Input that already contains colons passes through unchanged, as does
/// anything that does not reduce to 12 hex digits after stripping hyphens
/// and whitespace. Applying the function twice yields the same output as
/// applying it once.
#[must_use]
pub fn format_mac(raw: &str) -> String {
    if raw.contains(':') {
        return raw.to_string();
    }
    let hex: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return raw.to_string();
    }
    hex.as_bytes()
        .chunks(2)
        .map(|pair| std::str::from_utf8(pair).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(":")
}
