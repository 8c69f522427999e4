//! Per-run sync counters.

use chrono::{DateTime, Utc};
use std::fmt;

/// Outcome of a single device upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Skipped,
    Failed,
}

/// Counters accumulated over one sync run.
#[derive(Debug, Clone)]
pub struct SyncStats {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub failed: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl Default for SyncStats {
    fn default() -> Self {
        Self::start()
    }
}

impl SyncStats {
    /// Fresh counters stamped with the current time.
    #[must_use]
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            created: 0,
            updated: 0,
            skipped: 0,
            failed: 0,
            started_at: now,
            finished_at: now,
        }
    }

    /// Stamp the end of the run.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Total devices seen.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.created + self.updated + self.skipped + self.failed
    }

    /// Wall-clock time between start and finish.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Whether any device failed to sync.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} devices processed in {}s: {} created, {} updated, {} skipped, {} failed",
            self.total(),
            self.duration().num_seconds(),
            self.created,
            self.updated,
            self.skipped,
            self.failed
        )
    }
}
