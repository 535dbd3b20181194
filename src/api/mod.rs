//! pixiv API module.
//!
//! This module provides:
//! - The transport seam and its reqwest implementation
//! - Endpoint URLs and rate-limited requests
//! - Per-endpoint response translation
//! - API response types

pub mod client;
pub mod parse;
pub mod transport;
pub mod types;

pub use client::{PixivApi, RANKING_MAX_PAGES};
pub use parse::{ListingPage, ParseError};
pub use transport::{RawResponse, ReqwestTransport, RequestKind, Transport, TransportError};
