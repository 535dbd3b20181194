//! Configuration module for the pixiv-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Ranking mode and sort order definitions
//! - Configuration and query validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, DownloadConfig, HeadersConfig, ProxyConfig};
pub use modes::{RankingMode, SortOrder};
pub use validation::{parse_ranking_date, validate_config, validate_keyword};
