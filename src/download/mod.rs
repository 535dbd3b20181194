//! Download module for illustration pages.
//!
//! This module provides:
//! - Request spacing shared by every outbound call
//! - Bounded retries with backoff
//! - Per-item page download with atomic writes
//! - Outcome tracking and the listing-to-disk pipeline

pub mod manager;
pub mod outcome;
pub mod pipeline;
pub mod rate_limit;
pub mod retry;
pub mod state;

pub use manager::DownloadManager;
pub use outcome::{DownloadOutcome, DownloadStatus, SkipReason};
pub use pipeline::run_query;
pub use rate_limit::RateLimiter;
pub use retry::{Attempt, FetchError, RetryPolicy};
pub use state::{DownloadReport, DownloadSummary};
