//! Configuration validation logic.

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Minimum length for user agent.
const MIN_USER_AGENT_LENGTH: usize = 10;

/// Maximum accepted request timeout (seconds).
const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Maximum accepted request delay or jitter (seconds).
const MAX_DELAY_SECONDS: f64 = 3600.0;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_download(config)?;
    validate_user_agent(&config.headers.user_agent)?;
    validate_proxy(config)?;

    Ok(())
}

/// Validate the numeric download settings.
fn validate_download(config: &Config) -> Result<()> {
    let download = &config.download;

    if download.retry_times == 0 {
        return Err(Error::ConfigValidation {
            field: "download.retry_times".to_string(),
            message: "At least one attempt per request is required".to_string(),
        });
    }

    if download.timeout == 0 || download.timeout > MAX_TIMEOUT_SECONDS {
        return Err(Error::ConfigValidation {
            field: "download.timeout".to_string(),
            message: format!(
                "Timeout must be between 1 and {} seconds (got {})",
                MAX_TIMEOUT_SECONDS, download.timeout
            ),
        });
    }

    for (field, value) in [
        ("download.delay", download.delay),
        ("download.jitter", download.jitter),
    ] {
        if !value.is_finite() || !(0.0..=MAX_DELAY_SECONDS).contains(&value) {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: format!(
                    "Must be between 0 and {} seconds (got {})",
                    MAX_DELAY_SECONDS, value
                ),
            });
        }
    }

    if download.output_dir.as_os_str().is_empty() {
        return Err(Error::ConfigValidation {
            field: "download.output_dir".to_string(),
            message: "Output directory cannot be empty".to_string(),
        });
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "headers.user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.trim().len()
            ),
        });
    }

    Ok(())
}

/// Validate proxy settings when the proxy is enabled.
fn validate_proxy(config: &Config) -> Result<()> {
    let proxy = &config.proxy;
    if !proxy.enabled {
        return Ok(());
    }

    if proxy.http.is_none() && proxy.https.is_none() {
        return Err(Error::ConfigValidation {
            field: "proxy".to_string(),
            message: "Proxy is enabled but neither 'http' nor 'https' is set".to_string(),
        });
    }

    for (field, value) in [("proxy.http", &proxy.http), ("proxy.https", &proxy.https)] {
        if let Some(value) = value {
            Url::parse(value).map_err(|e| Error::ConfigValidation {
                field: field.to_string(),
                message: format!("Invalid proxy URL '{}': {}", value, e),
            })?;
        }
    }

    Ok(())
}

/// Validate a search keyword, returning it trimmed.
pub fn validate_keyword(keyword: &str) -> Result<String> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::InvalidQuery(
            "Search keyword cannot be empty".to_string(),
        ));
    }

    Ok(keyword.to_string())
}

/// Parse a ranking date given as `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_ranking_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();

    let pattern = Regex::new(r"^(\d{4})-?(\d{2})-?(\d{2})$")
        .map_err(|e| Error::Config(format!("Invalid date pattern: {}", e)))?;

    let captures = pattern.captures(input).ok_or_else(|| {
        Error::InvalidQuery(format!(
            "Invalid ranking date '{}'. Expected YYYYMMDD or YYYY-MM-DD.",
            input
        ))
    })?;

    let compact = format!("{}{}{}", &captures[1], &captures[2], &captures[3]);
    NaiveDate::parse_from_str(&compact, "%Y%m%d").map_err(|e| {
        Error::InvalidQuery(format!("Invalid ranking date '{}': {}", input, e))
    })
}
