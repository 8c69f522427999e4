//! Reference-data resolution against Snipe-IT.
//!
//! Models, status labels, categories and users are referenced by numeric id
//! in the asset API.  The resolver turns directory strings into those ids,
//! creating model records on demand when the fleet reports hardware Snipe-IT
//! has never seen.
//!
//! Every lookup distinguishes three outcomes: `Ok(Some(id))` the record
//! exists, `Ok(None)` the search succeeded but nothing matched, `Err` the
//! lookup itself failed.

use crate::classify::ModelClassifier;
use crate::client::SnipeClient;
use crate::config::{ModelMatch, SyncConfig};
use crate::error::{SyncError, SyncResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub struct TaxonomyResolver {
    client: SnipeClient,
    classifier: Arc<dyn ModelClassifier>,
    model_match: ModelMatch,
    fieldset_id: i64,
    categories: Vec<String>,
    model_cache: Mutex<HashMap<String, i64>>,
}

impl TaxonomyResolver {
    #[must_use]
    pub fn new(
        client: SnipeClient,
        classifier: Arc<dyn ModelClassifier>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            client,
            classifier,
            model_match: config.model_match,
            fieldset_id: config.fieldset_id,
            categories: config.categories.clone(),
            model_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a model by name.
    ///
    /// An exact case-insensitive name match wins.  When nothing matches
    /// exactly, best-effort mode falls back to the first search hit while
    /// strict mode reports the model as absent.
    pub async fn resolve_model_id(&self, model_name: &str) -> SyncResult<Option<i64>> {
        if let Some(id) = self.cached_model(model_name) {
            return Ok(Some(id));
        }

        let rows = self.client.search_models(model_name).await?;
        let exact = rows
            .iter()
            .find(|row| row.name.eq_ignore_ascii_case(model_name))
            .map(|row| row.id);

        let resolved = match (exact, self.model_match) {
            (Some(id), _) => Some(id),
            (None, ModelMatch::BestEffort) => {
                let first = rows.first().map(|row| row.id);
                if let Some(id) = first {
                    warn!(
                        model_name,
                        model_id = id,
                        "no exact model match; using first search hit"
                    );
                }
                first
            }
            (None, ModelMatch::Strict) => None,
        };

        if let Some(id) = resolved {
            self.cache_model(model_name, id);
        }
        Ok(resolved)
    }

    /// Resolve a model id, creating the model record when it does not exist.
    ///
    /// Creation classifies the model name into an asset category, resolves
    /// that category in Snipe-IT, posts the model, and attaches the
    /// configured fieldset so custom fields land on assets of that model.
    pub async fn ensure_model(&self, model_name: &str) -> SyncResult<i64> {
        if let Some(id) = self.resolve_model_id(model_name).await? {
            return Ok(id);
        }

        let category = self
            .classifier
            .classify(model_name, &self.categories)
            .await?;
        let category_id = self
            .resolve_category_id(&category)
            .await?
            .ok_or_else(|| {
                SyncError::Classifier(format!(
                    "classifier chose category {category:?} which does not exist in Snipe-IT"
                ))
            })?;

        let payload = serde_json::json!({
            "name": model_name,
            "category_id": category_id,
        });
        let response = self.client.create_model(&payload).await?;
        let envelope = response.envelope()?;
        if envelope.status != "success" {
            return Err(SyncError::Api {
                status: response.status,
                detail: format!("model creation rejected: {}", response.body),
            });
        }
        let model_id = envelope.payload_id().ok_or_else(|| {
            SyncError::Parse(format!("model creation reply had no id: {}", response.body))
        })?;
        info!(model_name, model_id, category = %category, "created model");

        let fieldset = self.client.assign_fieldset(model_id, self.fieldset_id).await?;
        if fieldset.envelope()?.status != "success" {
            warn!(
                model_id,
                fieldset_id = self.fieldset_id,
                body = %fieldset.body,
                "fieldset assignment rejected"
            );
        }

        self.cache_model(model_name, model_id);
        Ok(model_id)
    }

    /// Find the status label id for a status name.
    pub async fn resolve_status_id(&self, status_name: &str) -> SyncResult<Option<i64>> {
        let rows = self.client.search_status_labels(status_name).await?;
        Ok(rows.first().map(|row| row.id))
    }

    /// Find the category id for a category name.
    pub async fn resolve_category_id(&self, category_name: &str) -> SyncResult<Option<i64>> {
        let rows = self.client.search_categories(category_name).await?;
        Ok(rows.first().map(|row| row.id))
    }

    /// Find the user id for an email address.
    pub async fn resolve_user_id(&self, email: &str) -> SyncResult<Option<i64>> {
        let rows = self.client.search_users(email).await?;
        Ok(rows.first().map(|row| row.id))
    }

    fn cached_model(&self, model_name: &str) -> Option<i64> {
        self.model_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(&model_name.to_lowercase()).copied())
    }

    fn cache_model(&self, model_name: &str, id: i64) {
        if let Ok(mut cache) = self.model_cache.lock() {
            cache.insert(model_name.to_lowercase(), id);
        }
    }
}
