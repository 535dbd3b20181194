//! Per-file download results.

use std::fmt;

use crate::download::retry::FetchError;
use crate::media::MediaTarget;

/// Why a target was not downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A complete file already exists at the target path.
    AlreadyDownloaded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyDownloaded => write!(f, "already-downloaded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Success,
    Skipped(SkipReason),
    Failed(FetchError),
}

impl DownloadStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadStatus::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DownloadStatus::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DownloadStatus::Failed(_))
    }
}

/// Result for one target of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Illustration the target belongs to.
    pub item_id: String,
    pub target: MediaTarget,
    pub status: DownloadStatus,
}

impl DownloadOutcome {
    pub fn new(item_id: &str, target: MediaTarget, status: DownloadStatus) -> Self {
        Self {
            item_id: item_id.to_string(),
            target,
            status,
        }
    }
}
