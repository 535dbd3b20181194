//! pixiv API client.

use std::sync::Arc;

use chrono::NaiveDate;
use url::Url;

use crate::api::parse::{parse_illust_pages, parse_ranking_page, parse_search_page, ListingPage};
use crate::api::transport::{RequestKind, Transport};
use crate::clock::Clock;
use crate::config::{RankingMode, SortOrder};
use crate::download::rate_limit::RateLimiter;
use crate::download::retry::{Attempt, FetchError};
use crate::error::Result;

/// pixiv web base URL.
const BASE_URL: &str = "https://www.pixiv.net";

/// The ranking endpoint serves at most this many pages (50 entries each).
pub const RANKING_MAX_PAGES: u32 = 10;

/// Endpoint client. Every request waits on the shared [`RateLimiter`] first.
#[derive(Debug)]
pub struct PixivApi {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    base: Url,
}

impl PixivApi {
    /// Create a client for the public pixiv endpoints.
    pub fn new(transport: Arc<dyn Transport>, limiter: Arc<RateLimiter>) -> Result<Self> {
        Self::with_base_url(transport, limiter, BASE_URL)
    }

    /// Create a client against another host (e.g. a mirror or a local stub).
    pub fn with_base_url(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        base_url: &str,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            limiter,
            base: Url::parse(base_url)?,
        })
    }

    /// Clock shared with the rate limiter, used for retry backoff.
    pub fn clock(&self) -> &dyn Clock {
        self.limiter.clock()
    }

    /// `/ajax/search/illustrations/{keyword}`
    pub fn search_url(&self, keyword: &str, sort: SortOrder, page: u32) -> Url {
        let mut url = self.base.clone();
        url.set_path("/ajax/search/illustrations");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(keyword);
        }
        url.query_pairs_mut()
            .append_pair("word", keyword)
            .append_pair("order", sort.as_param())
            .append_pair("mode", "all")
            .append_pair("p", &page.to_string())
            .append_pair("s_mode", "s_tag_full")
            .append_pair("type", "illust_and_ugoira");
        url
    }

    /// `/ranking.php` in JSON mode.
    pub fn ranking_url(&self, mode: RankingMode, date: NaiveDate, page: u32) -> Url {
        let mut url = self.base.clone();
        url.set_path("/ranking.php");
        url.query_pairs_mut()
            .append_pair("mode", mode.as_param())
            .append_pair("content", "illust")
            .append_pair("date", &date.format("%Y%m%d").to_string())
            .append_pair("p", &page.to_string())
            .append_pair("format", "json");
        url
    }

    /// `/ajax/illust/{id}/pages`
    pub fn illust_pages_url(&self, illust_id: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path("/ajax/illust");
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(illust_id).push("pages");
        }
        url
    }

    /// Make one rate-limited GET request and classify the result.
    async fn get(&self, url: &Url, kind: RequestKind) -> Attempt<Vec<u8>> {
        self.limiter.acquire().await;
        tracing::debug!("GET {}", url);

        match self.transport.get(url, kind).await {
            Ok(response) if (200..300).contains(&response.status) => {
                Attempt::Success(response.body)
            }
            Ok(response) => {
                tracing::debug!("{} answered HTTP {}", url, response.status);
                Attempt::from_status(response.status)
            }
            Err(e) => Attempt::from_transport(e),
        }
    }

    /// Fetch and parse one page of keyword search results.
    pub async fn fetch_search_page(
        &self,
        keyword: &str,
        sort: SortOrder,
        page: u32,
    ) -> Attempt<ListingPage> {
        let url = self.search_url(keyword, sort, page);
        self.get(&url, RequestKind::Api)
            .await
            .and_then(|body| parsed(parse_search_page(&body, page)))
    }

    /// Fetch and parse one page of a ranking.
    pub async fn fetch_ranking_page(
        &self,
        mode: RankingMode,
        date: NaiveDate,
        page: u32,
    ) -> Attempt<ListingPage> {
        let url = self.ranking_url(mode, date, page);
        self.get(&url, RequestKind::Api)
            .await
            .and_then(|body| parsed(parse_ranking_page(&body)))
    }

    /// Fetch the original-resolution URLs of every page of an illustration.
    pub async fn fetch_illust_pages(&self, illust_id: &str) -> Attempt<Vec<String>> {
        let url = self.illust_pages_url(illust_id);
        self.get(&url, RequestKind::Api)
            .await
            .and_then(|body| parsed(parse_illust_pages(&body)))
    }

    /// Download the bytes of one media file.
    pub async fn fetch_media(&self, url: &str) -> Attempt<Vec<u8>> {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => {
                return Attempt::Permanent(FetchError::InvalidRequest(format!(
                    "bad media URL '{}': {}",
                    url, e
                )))
            }
        };

        self.get(&url, RequestKind::Media).await.and_then(|body| {
            if body.is_empty() {
                Attempt::Transient(FetchError::Connection("empty response body".to_string()))
            } else {
                Attempt::Success(body)
            }
        })
    }
}

fn parsed<T>(result: std::result::Result<T, crate::api::parse::ParseError>) -> Attempt<T> {
    match result {
        Ok(value) => Attempt::Success(value),
        Err(e) => Attempt::from_parse(e),
    }
}
