//! Batch sync coordinator.

use crate::device::DirectoryDevice;
use crate::directory::DirectorySource;
use crate::error::SyncResult;
use crate::stats::{Outcome, SyncStats};
use crate::upsert::Upserter;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct SyncEngine {
    source: Arc<dyn DirectorySource>,
    upserter: Upserter,
    dry_run: bool,
}

impl SyncEngine {
    #[must_use]
    pub fn new(source: Arc<dyn DirectorySource>, upserter: Upserter, dry_run: bool) -> Self {
        Self {
            source,
            upserter,
            dry_run,
        }
    }

    /// Run one full sync pass.
    ///
    /// A failure to enumerate the fleet is fatal; a failure on any single
    /// device is counted and logged, and the run moves on to the next
    /// device.
    pub async fn run(&self) -> SyncResult<SyncStats> {
        let mut stats = SyncStats::start();
        let devices = self.source.fetch_devices().await?;
        info!(count = devices.len(), dry_run = self.dry_run, "starting sync");

        for device in &devices {
            stats.record(self.sync_one(device).await);
        }

        stats.finish();
        info!(
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            failed = stats.failed,
            "sync finished"
        );
        Ok(stats)
    }

    async fn sync_one(&self, device: &DirectoryDevice) -> Outcome {
        let serial = device.serial_number.as_deref().unwrap_or("<no serial>");
        if self.dry_run {
            info!(serial, "dry run; skipping write");
            return Outcome::Skipped;
        }
        match self.upserter.upsert_device(device).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_retryable() {
                    error!(serial, error = %e, "device sync failed after retries");
                } else {
                    warn!(serial, error = %e, "device sync failed");
                }
                Outcome::Failed
            }
        }
    }
}
