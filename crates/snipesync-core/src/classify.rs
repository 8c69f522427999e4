//! Model-name classification.
//!
//! Unknown hardware models are bucketed into an asset category before a
//! Snipe-IT model record is created for them.  The production classifier
//! asks Gemini; tests plug in a canned implementation.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Maps a raw model name to one of the configured categories.
#[async_trait]
pub trait ModelClassifier: Send + Sync {
    async fn classify(&self, model_name: &str, categories: &[String]) -> SyncResult<String>;
}

/// Gemini-backed classifier.
pub struct GeminiClassifier {
    base_url: String,
    api_key: String,
    model: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiClassifier {
    #[must_use]
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_base_url(GEMINI_BASE, api_key, model)
    }

    /// Point the classifier at a different endpoint (for testing).
    #[must_use]
    pub fn with_base_url(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: Client::new(),
        }
    }

    fn prompt(model_name: &str, categories: &[String]) -> String {
        format!(
            "Classify the hardware model \"{model_name}\" into exactly one of the \
             following asset categories: {}. Reply with the chosen category name \
             wrapped in double asterisks, e.g. **Laptop**.",
            categories.join(", ")
        )
    }
}

#[async_trait]
impl ModelClassifier for GeminiClassifier {
    async fn classify(&self, model_name: &str, categories: &[String]) -> SyncResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(model_name, categories) }] }]
        });

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SyncError::Classifier(format!(
                "classifier returned HTTP {}: {text}",
                status.as_u16()
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| SyncError::Classifier(format!("unparseable classifier reply: {e}")))?;
        let answer = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| SyncError::Classifier("classifier reply had no candidates".into()))?;

        let category = extract_category(answer);
        if category.is_empty() {
            return Err(SyncError::Classifier(format!(
                "classifier reply carried no category: {answer:?}"
            )));
        }
        debug!(model_name, category = %category, "classified model");
        Ok(category)
    }
}

/// Pull the category out of a reply.
///
/// The expected shape is `**Category**`; replies without the markers fall
/// back to the whole trimmed text.
fn extract_category(answer: &str) -> String {
    if let Some(start) = answer.find("**") {
        let rest = &answer[start + 2..];
        if let Some(end) = rest.find("**") {
            let inner = rest[..end].trim();
            if !inner.is_empty() {
                return inner.to_string();
            }
        }
    }
    warn!(answer, "classifier reply missing ** markers; using raw text");
    answer.trim().to_string()
}
