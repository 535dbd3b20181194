//! HTTP transport abstraction.
//!
//! The API client talks to the network only through [`Transport`], so the
//! resolver and download manager can be exercised against an in-memory fake.

use std::fmt;

use async_trait::async_trait;
use reqwest::{header, Client, Proxy};
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Accept header for JSON endpoints.
const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";

/// Accept header for image downloads.
const ACCEPT_IMAGE: &str = "image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// What a request is for; selects the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Api,
    Media,
}

/// A fully received HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Failure below the HTTP status level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be built or sent at all; retrying will not help.
    #[error("invalid request: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_builder() {
            TransportError::Request(err.to_string())
        } else {
            // Connect failures, resets and truncated bodies all end up here.
            TransportError::Connect(err.to_string())
        }
    }
}

/// Minimal GET-only HTTP interface.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn get(&self, url: &Url, kind: RequestKind) -> std::result::Result<RawResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a client with the configured timeout, static headers and proxy.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::REFERER, header_value("referer", &config.headers.referer)?);
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header_value("accept_language", &config.headers.accept_language)?,
        );
        if let Some(cookie) = &config.headers.cookie {
            headers.insert(header::COOKIE, header_value("cookie", cookie)?);
        }

        let mut builder = Client::builder()
            .user_agent(&config.headers.user_agent)
            .default_headers(headers)
            .timeout(config.timeout());

        if config.proxy.enabled {
            if let Some(http) = &config.proxy.http {
                builder = builder.proxy(Proxy::http(http)?);
            }
            if let Some(https) = &config.proxy.https {
                builder = builder.proxy(Proxy::https(https)?);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

fn header_value(field: &str, value: &str) -> Result<header::HeaderValue> {
    value.parse().map_err(|_| Error::ConfigValidation {
        field: format!("headers.{}", field),
        message: "Value is not a valid HTTP header".to_string(),
    })
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, kind: RequestKind) -> std::result::Result<RawResponse, TransportError> {
        let accept = match kind {
            RequestKind::Api => ACCEPT_JSON,
            RequestKind::Media => ACCEPT_IMAGE,
        };

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, accept)
            .send()
            .await?;

        let status = response.status().as_u16();
        tracing::debug!("Response status: {}", status);

        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { status, body })
    }
}
