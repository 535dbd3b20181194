//! API response type definitions.
//!
//! Every field is optional or defaulted: the endpoints are unversioned, so
//! shape checks happen in [`crate::api::parse`] rather than in serde.

use serde::Deserialize;
use serde_json::Value;

/// Envelope used by the `/ajax/...` endpoints.
///
/// `body` stays untyped until `error` has been checked: failed requests
/// send `"body": []` regardless of the endpoint.
#[derive(Debug, Deserialize)]
pub struct AjaxResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    pub body: Option<Value>,
}

/// Body of the keyword search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub illust: Option<SearchIllusts>,
    #[serde(rename = "illustManga")]
    pub illust_manga: Option<SearchIllusts>,
}

/// Result block of a search page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIllusts {
    #[serde(default)]
    pub data: Vec<SearchEntry>,
    pub total: Option<u64>,
    pub last_page: Option<u32>,
}

/// One search hit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    /// Numeric id, sent as a string.
    pub id: Option<Value>,
    pub title: Option<String>,
    pub user_name: Option<String>,
    pub page_count: Option<Value>,
    #[serde(default)]
    pub is_ad_container: bool,
}

/// Body of `ranking.php?format=json`.
#[derive(Debug, Deserialize)]
pub struct RankingResponse {
    pub contents: Option<Vec<RankingEntry>>,
    pub page: Option<u32>,
    /// Next page number, or `false` on the last page.
    pub next: Option<Value>,
    pub date: Option<String>,
    /// Present instead of `contents` when the ranking is unavailable.
    pub error: Option<String>,
}

/// One ranking row.
#[derive(Debug, Deserialize)]
pub struct RankingEntry {
    pub illust_id: Option<Value>,
    pub title: Option<String>,
    pub user_name: Option<String>,
    /// Sent as a string by the ranking endpoint.
    pub illust_page_count: Option<Value>,
}

/// One page entry of `/ajax/illust/{id}/pages`.
#[derive(Debug, Deserialize)]
pub struct IllustPage {
    pub urls: Option<PageUrls>,
}

/// Image URLs of one page.
#[derive(Debug, Deserialize)]
pub struct PageUrls {
    pub original: Option<String>,
}
