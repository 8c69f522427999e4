//! Engine configuration loaded from environment variables.
//!
//! All components receive an explicit `&SyncConfig`; nothing reads process
//! environment after startup.

/// How model-name lookups behave when there is no exact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMatch {
    /// Fall back to the first row of the substring search.  Matches the
    /// historical behavior; may pick a wrong model when names are ambiguous.
    BestEffort,
    /// Exact (case-insensitive) matches only; anything else is a miss.
    Strict,
}

/// Configuration for a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Snipe-IT API bearer token.
    pub api_token: String,
    /// Snipe-IT API base URL, e.g. `https://assets.example.com/api/v1`.
    pub base_url: String,

    /// Model id used when a device reports no model name.
    pub default_model_id: i64,
    /// Status id used when the status cannot be resolved.
    pub default_status_id: i64,
    /// Fieldset assigned to newly created models.
    pub fieldset_id: i64,

    /// Custom field column names on the hardware resource.
    pub field_mac_address: String,
    pub field_sync_date: String,
    pub field_ip_address: String,
    pub field_user: String,

    /// Status name that maps straight to `default_status_id` without a lookup.
    pub active_status: String,

    /// Attempt budget per request.
    pub max_retries: u32,
    /// Fixed delay between attempts, in seconds.
    pub retry_delay_secs: u64,

    /// Model lookup fallback behavior.
    pub model_match: ModelMatch,

    /// Gemini API key for model categorization.
    pub gemini_api_key: String,
    /// Gemini model name.
    pub gemini_model: String,
    /// Category vocabulary offered to the classifier.
    pub categories: Vec<String>,

    /// Pre-obtained access token for the Google Admin directory.  When absent
    /// the directory client yields an empty device list.
    pub google_access_token: Option<String>,
    /// Google Workspace customer id.
    pub google_customer_id: String,

    /// Log what would happen without touching the remote.
    pub dry_run: bool,
}

/// Category names offered to the classifier when `GEMINI_CATEGORIES` is unset.
const DEFAULT_CATEGORIES: &[&str] = &[
    "Chromebook",
    "Laptop",
    "Desktop",
    "Tablet",
    "Monitor",
    "Printer",
    "Projector",
    "Networking",
    "Accessory",
];

impl SyncConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Lets tests supply variables without mutating process-global state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let api_token =
            reader("API_TOKEN").map_err(|_| ConfigError::MissingVar("API_TOKEN".into()))?;

        let base_url = reader("ENDPOINT_URL")
            .map_err(|_| ConfigError::MissingVar("ENDPOINT_URL".into()))?
            .trim_end_matches('/')
            .to_string();

        let gemini_api_key =
            reader("GEMINI_API_KEY").map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".into()))?;

        let default_model_id = parse_var(&reader, "SNIPE_IT_DEFAULT_MODEL_ID", 87)?;
        let default_status_id = parse_var(&reader, "SNIPE_IT_DEFAULT_STATUS_ID", 2)?;
        let fieldset_id = parse_var(&reader, "SNIPE_IT_FIELDSET_ID", 9)?;

        let field_mac_address = reader("SNIPE_IT_FIELD_MAC_ADDRESS")
            .unwrap_or_else(|_| "_snipeit_mac_address_1".to_string());
        let field_sync_date = reader("SNIPE_IT_FIELD_SYNC_DATE")
            .unwrap_or_else(|_| "_snipeit_sync_date_9".to_string());
        let field_ip_address = reader("SNIPE_IT_FIELD_IP_ADDRESS")
            .unwrap_or_else(|_| "_snipeit_ip_address_3".to_string());
        let field_user =
            reader("SNIPE_IT_FIELD_USER").unwrap_or_else(|_| "_snipeit_user_10".to_string());

        let active_status =
            reader("SNIPE_IT_ACTIVE_STATUS").unwrap_or_else(|_| "ACTIVE".to_string());

        let max_retries = parse_var(&reader, "MAX_RETRIES", 4u32)?;
        let retry_delay_secs = parse_var(&reader, "RETRY_DELAY_SECONDS", 20u64)?;

        let model_match = match reader("MODEL_MATCH")
            .unwrap_or_else(|_| "best_effort".to_string())
            .as_str()
        {
            "best_effort" => ModelMatch::BestEffort,
            "strict" => ModelMatch::Strict,
            other => {
                return Err(ConfigError::InvalidValue(
                    "MODEL_MATCH".into(),
                    format!("expected 'best_effort' or 'strict', got '{other}'"),
                ))
            }
        };

        let gemini_model =
            reader("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());

        let categories = match reader("GEMINI_CATEGORIES") {
            Ok(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        };

        let google_access_token = reader("GOOGLE_ACCESS_TOKEN").ok();
        let google_customer_id =
            reader("GOOGLE_CUSTOMER_ID").unwrap_or_else(|_| "my_customer".to_string());

        let dry_run = reader("DRY_RUN")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            api_token,
            base_url,
            default_model_id,
            default_status_id,
            fieldset_id,
            field_mac_address,
            field_sync_date,
            field_ip_address,
            field_user,
            active_status,
            max_retries,
            retry_delay_secs,
            model_match,
            gemini_api_key,
            gemini_model,
            categories,
            google_access_token,
            google_customer_id,
            dry_run,
        })
    }
}

fn parse_var<F, T>(reader: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match reader(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.  Any of these blocks the run from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
