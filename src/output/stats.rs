//! Run statistics
//!
//! Counters accumulated while a harvest runs and the final summary written
//! through the log.

use crate::harvest::{IdentifierOutcome, IdentifierReport};
use chrono::{DateTime, Utc};

/// Harvest run statistics summary
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Identifiers returned by discovery, duplicates included
    pub identifiers_discovered: usize,

    pub completed: usize,
    pub skipped: usize,
    pub abandoned: usize,
    pub partial: usize,

    /// Rating pages fetched successfully
    pub pages_fetched: u64,

    /// Rating records seen across all pages
    pub ratings_seen: usize,

    /// Rating records whose value parsed as a number
    pub numeric_ratings: usize,
}

impl RunStatistics {
    /// Starts a new set of counters stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            identifiers_discovered: 0,
            completed: 0,
            skipped: 0,
            abandoned: 0,
            partial: 0,
            pages_fetched: 0,
            ratings_seen: 0,
            numeric_ratings: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Adds one identifier's report to the totals
    pub fn record(&mut self, report: &IdentifierReport) {
        match report.outcome {
            IdentifierOutcome::Completed => self.completed += 1,
            IdentifierOutcome::Skipped(_) => self.skipped += 1,
            IdentifierOutcome::Abandoned { .. } => self.abandoned += 1,
            IdentifierOutcome::Partial { .. } => self.partial += 1,
        }
        self.pages_fetched += u64::from(report.pages_fetched);
        self.ratings_seen += report.ratings_seen;
        self.numeric_ratings += report.numeric_ratings;
    }

    /// Identifiers whose fetch loop ran, whatever the outcome
    pub fn identifiers_processed(&self) -> usize {
        self.completed + self.skipped + self.abandoned + self.partial
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Logs the run statistics
pub fn log_statistics(stats: &RunStatistics) {
    tracing::info!("=== Harvest Statistics ===");
    tracing::info!(
        "Identifiers: {} discovered, {} processed",
        stats.identifiers_discovered,
        stats.identifiers_processed()
    );
    tracing::info!(
        "Outcomes: {} completed, {} skipped, {} abandoned, {} partial",
        stats.completed,
        stats.skipped,
        stats.abandoned,
        stats.partial
    );
    tracing::info!(
        "Pages fetched: {}, ratings seen: {} ({} numeric)",
        stats.pages_fetched,
        stats.ratings_seen,
        stats.numeric_ratings
    );

    if let Some(duration) = stats.duration_seconds() {
        tracing::info!("Duration: {}s", duration);
    }
}
