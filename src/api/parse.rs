//! Translation of raw endpoint bodies into domain types.
//!
//! One function per endpoint. Whole-body shape problems become a
//! [`ParseError`]; a single malformed entry is skipped with a warning.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::api::types::{AjaxResponse, IllustPage, RankingEntry, RankingResponse, SearchBody, SearchEntry};
use crate::media::ItemRef;

/// Why a response body could not be translated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// The service answered with an explicit error message.
    #[error("service reported an error: {0}")]
    Remote(String),
}

/// One parsed page of a listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub items: Vec<ItemRef>,
    /// Whether the service indicated further pages exist.
    pub has_next: bool,
}

/// Parse a keyword search page.
pub fn parse_search_page(body: &[u8], page: u32) -> Result<ListingPage, ParseError> {
    let body: SearchBody = ajax_body(body)?;
    let illusts = body
        .illust
        .or(body.illust_manga)
        .ok_or(ParseError::MissingField("body.illust"))?;

    let items = illusts
        .data
        .iter()
        .filter_map(search_entry_to_item)
        .collect();

    tracing::debug!(
        "Search page {}: {} entries, {} total hits",
        page,
        illusts.data.len(),
        illusts.total.unwrap_or(0)
    );

    Ok(ListingPage {
        items,
        has_next: illusts.last_page.map_or(true, |last| page < last),
    })
}

fn search_entry_to_item(entry: &SearchEntry) -> Option<ItemRef> {
    // Advertisement placeholders carry no illustration at all
    if entry.is_ad_container {
        return None;
    }

    let item = build_item(
        entry.id.as_ref(),
        entry.title.as_deref(),
        entry.user_name.as_deref(),
        entry.page_count.as_ref(),
    );
    if item.is_none() {
        tracing::warn!("Skipping search entry with missing fields: {:?}", entry);
    }
    item
}

/// Parse a ranking page (`ranking.php?format=json`).
pub fn parse_ranking_page(body: &[u8]) -> Result<ListingPage, ParseError> {
    let response: RankingResponse = from_json(body)?;
    if let Some(error) = response.error {
        return Err(ParseError::Remote(error));
    }

    let contents = response
        .contents
        .ok_or(ParseError::MissingField("contents"))?;

    tracing::debug!(
        "Ranking page {} for {}: {} entries",
        response.page.unwrap_or(0),
        response.date.as_deref().unwrap_or("?"),
        contents.len()
    );

    let items = contents.iter().filter_map(ranking_entry_to_item).collect();
    let has_next = matches!(response.next, Some(Value::Number(_)));

    Ok(ListingPage { items, has_next })
}

fn ranking_entry_to_item(entry: &RankingEntry) -> Option<ItemRef> {
    let item = build_item(
        entry.illust_id.as_ref(),
        entry.title.as_deref(),
        entry.user_name.as_deref(),
        entry.illust_page_count.as_ref(),
    );
    if item.is_none() {
        tracing::warn!("Skipping ranking entry with missing fields: {:?}", entry);
    }
    item
}

/// Parse `/ajax/illust/{id}/pages` into original-resolution URLs in page order.
pub fn parse_illust_pages(body: &[u8]) -> Result<Vec<String>, ParseError> {
    let pages: Vec<IllustPage> = ajax_body(body)?;
    if pages.is_empty() {
        return Err(ParseError::MissingField("body[0]"));
    }

    pages
        .into_iter()
        .map(|page| {
            page.urls
                .and_then(|urls| urls.original)
                .filter(|url| !url.is_empty())
                .ok_or(ParseError::MissingField("body[].urls.original"))
        })
        .collect()
}

fn from_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ParseError> {
    serde_json::from_slice(body).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Unwrap the `/ajax/` envelope and decode its body.
fn ajax_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ParseError> {
    let response: AjaxResponse = from_json(body)?;
    if response.error {
        return Err(ParseError::Remote(response.message));
    }

    let body = response.body.ok_or(ParseError::MissingField("body"))?;
    serde_json::from_value(body).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Assemble an [`ItemRef`], requiring id, title and author.
fn build_item(
    id: Option<&Value>,
    title: Option<&str>,
    author: Option<&str>,
    page_count: Option<&Value>,
) -> Option<ItemRef> {
    let id = id.and_then(value_to_id)?;
    let title = title?;
    let author = author?;
    let page_count = page_count.and_then(value_to_u32).unwrap_or(1).max(1);

    Some(ItemRef {
        id,
        title: title.to_string(),
        author_name: author.to_string(),
        page_count,
    })
}

/// Ids arrive as numbers or numeric strings.
fn value_to_id(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.as_u64()?.to_string(),
        _ => return None,
    };

    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}

fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}
