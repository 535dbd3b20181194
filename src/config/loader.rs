//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub headers: HeadersConfig,
}

/// Download behaviour configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Base directory for downloads.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of search result pages to walk.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Attempts per request, including the first one.
    #[serde(default = "default_retry_times")]
    pub retry_times: u32,

    /// Minimum seconds between two outbound requests.
    #[serde(default = "default_delay")]
    pub delay: f64,

    /// Extra random delay in seconds added on top of `delay`.
    #[serde(default)]
    pub jitter: f64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_pages: default_max_pages(),
            timeout: default_timeout(),
            retry_times: default_retry_times(),
            delay: default_delay(),
            jitter: 0.0,
        }
    }
}

/// Proxy configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Whether the proxy settings below are applied.
    #[serde(default)]
    pub enabled: bool,

    /// Proxy for plain HTTP requests.
    #[serde(default)]
    pub http: Option<String>,

    /// Proxy for HTTPS requests.
    #[serde(default)]
    pub https: Option<String>,
}

/// Static request headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadersConfig {
    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer sent with every request. The image CDN rejects requests without it.
    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Optional raw `Cookie` header (e.g. `PHPSESSID=...`).
    #[serde(default)]
    pub cookie: Option<String>,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            referer: default_referer(),
            accept_language: default_accept_language(),
            cookie: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_max_pages() -> u32 {
    10
}

fn default_timeout() -> u64 {
    30
}

fn default_retry_times() -> u32 {
    3
}

fn default_delay() -> f64 {
    1.0
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string()
}

fn default_referer() -> String {
    "https://www.pixiv.net/".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Generate one with `config --generate`",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Minimum spacing between outbound requests.
    pub fn delay(&self) -> Duration {
        seconds(self.download.delay)
    }

    /// Upper bound of the random extra delay.
    pub fn jitter(&self) -> Duration {
        seconds(self.download.jitter)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.download.timeout)
    }
}

/// Convert fractional seconds, clamping negatives and NaN to zero and
/// overflow to `Duration::MAX`.
fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
