//! Core engine for syncing a device directory into Snipe-IT.
//!
//! The pipeline is: enumerate devices from a [`directory::DirectorySource`],
//! resolve reference data (models, statuses, users) through
//! [`taxonomy::TaxonomyResolver`], and create-or-update each asset via
//! [`upsert::Upserter`], with [`sync::SyncEngine`] coordinating the batch
//! and accumulating [`stats::SyncStats`].

pub mod classify;
pub mod client;
pub mod config;
pub mod device;
pub mod directory;
pub mod error;
pub mod mapper;
pub mod models;
pub mod retry;
pub mod stats;
pub mod sync;
pub mod taxonomy;
pub mod upsert;

pub use classify::{GeminiClassifier, ModelClassifier};
pub use client::SnipeClient;
pub use config::{ModelMatch, SyncConfig};
pub use device::{format_mac, DirectoryDevice};
pub use directory::{DirectorySource, GoogleDirectory, StaticSource};
pub use error::{SyncError, SyncResult};
pub use retry::RetryPolicy;
pub use stats::{Outcome, SyncStats};
pub use sync::SyncEngine;
pub use taxonomy::TaxonomyResolver;
pub use upsert::Upserter;
