//! pixiv-downloader - keyword search and ranking downloads from pixiv
//!
//! This library turns a logical request ("search X", "monthly ranking
//! ending on Y") into a rate-limited, retrying sequence of HTTP calls that
//! leaves files on disk under a deterministic layout.
//!
//! # Features
//!
//! - Keyword search and daily/weekly/monthly rankings
//! - Lazy pagination with duplicate removal
//! - One shared request spacing for listing and downloads
//! - Bounded retries with linear backoff
//! - Idempotent re-runs: pages already on disk are skipped without a request
//! - Atomic writes through temporary `.part` files
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pixiv_downloader::{
//!     Config, DownloadManager, PixivApi, QueryDescriptor, RateLimiter, ReqwestTransport,
//!     Resolver, RetryPolicy, SortOrder, SystemClock,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let limiter = Arc::new(RateLimiter::new(
//!         config.delay(),
//!         config.jitter(),
//!         Arc::new(SystemClock::new()),
//!     ));
//!     let api = Arc::new(PixivApi::new(
//!         Arc::new(ReqwestTransport::from_config(&config)?),
//!         limiter,
//!     )?);
//!
//!     let policy = RetryPolicy::new(config.download.retry_times, config.delay());
//!     let resolver = Resolver::new(api.clone(), policy.clone());
//!     let manager = DownloadManager::new(api, policy, "./downloads");
//!
//!     let query = QueryDescriptor::keyword("landscape", SortOrder::DateDesc, 2)?;
//!     let report = pixiv_downloader::run_query(&resolver, &manager, &query, None).await?;
//!     println!("{} downloaded", report.summary.success);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;
pub mod resolver;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use api::{PixivApi, ReqwestTransport, Transport};
pub use clock::{Clock, SystemClock};
pub use config::{Config, RankingMode, SortOrder};
pub use download::{
    run_query, DownloadManager, DownloadOutcome, DownloadReport, DownloadStatus, DownloadSummary,
    RateLimiter, RetryPolicy,
};
pub use error::{Error, Result};
pub use media::{ItemRef, MediaTarget};
pub use resolver::{QueryDescriptor, RankingWindow, Resolver};
