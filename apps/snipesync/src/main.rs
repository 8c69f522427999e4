//! Directory-to-Snipe-IT sync binary.

use snipesync_core::{
    GeminiClassifier, GoogleDirectory, RetryPolicy, SnipeClient, StaticSource, SyncConfig,
    SyncEngine, TaxonomyResolver, Upserter,
};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {e}");
            process::exit(1);
        }
    };
    if std::env::args().any(|arg| arg == "--dry-run") {
        config.dry_run = true;
    }

    let retry = RetryPolicy::new(config.max_retries, config.retry_delay_secs);
    let client = match SnipeClient::new(&config.base_url, &config.api_token, retry) {
        Ok(client) => client,
        Err(e) => {
            error!("failed to build API client: {e}");
            process::exit(1);
        }
    };

    let classifier = Arc::new(GeminiClassifier::new(
        &config.gemini_api_key,
        &config.gemini_model,
    ));
    let taxonomy = TaxonomyResolver::new(client.clone(), classifier, &config);
    let upserter = Upserter::new(client, taxonomy, &config);

    let source: Arc<dyn snipesync_core::DirectorySource> = match &config.google_access_token {
        Some(token) => Arc::new(GoogleDirectory::new(token, &config.google_customer_id)),
        None => {
            warn!("GOOGLE_ACCESS_TOKEN not set; no devices will be fetched");
            Arc::new(StaticSource::new(Vec::new()))
        }
    };

    let engine = SyncEngine::new(source, upserter, config.dry_run);
    // The summary prints on both exit paths; an aborted run still reports
    // what it got through before dying.
    let mut stats = snipesync_core::SyncStats::start();
    let fatal = match engine.run().await {
        Ok(run_stats) => {
            stats = run_stats;
            false
        }
        Err(e) => {
            stats.finish();
            error!("sync aborted: {e}");
            true
        }
    };
    info!("{stats}");
    println!("{stats}");
    if fatal {
        process::exit(1);
    }
}
