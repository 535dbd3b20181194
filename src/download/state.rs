//! Run-level tallies.

use crate::download::outcome::{DownloadOutcome, DownloadStatus};

/// Append-only counters for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Items handed to the download manager.
    pub items: u64,
    pub success: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl DownloadSummary {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome.status {
            DownloadStatus::Success => self.success += 1,
            DownloadStatus::Skipped(_) => self.skipped += 1,
            DownloadStatus::Failed(_) => self.failed += 1,
        }
    }

    /// Get total file count across all statuses.
    pub fn total(&self) -> u64 {
        self.success + self.skipped + self.failed
    }
}

/// Ordered outcomes plus their summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub outcomes: Vec<DownloadOutcome>,
    pub summary: DownloadSummary,
}

impl DownloadReport {
    /// Append the outcomes of one item, preserving order.
    pub fn push_item(&mut self, outcomes: Vec<DownloadOutcome>) {
        self.summary.items += 1;
        for outcome in &outcomes {
            self.summary.record(outcome);
        }
        self.outcomes.extend(outcomes);
    }

    /// Outcomes of one item, in page order.
    pub fn outcomes_for<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a DownloadOutcome> + 'a {
        self.outcomes.iter().filter(move |o| o.item_id == item_id)
    }
}
