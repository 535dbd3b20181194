//! Bounded retries over explicit per-attempt results.
//!
//! Every single request attempt returns an [`Attempt`]: success, a
//! transient failure worth retrying, or a permanent one. [`RetryPolicy::run`]
//! owns the loop and the backoff, so the retry limit is independent of how
//! the attempt itself is made.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::api::parse::ParseError;
use crate::api::transport::TransportError;
use crate::clock::Clock;

/// Attempts granted to a response that fails to parse, regardless of the
/// configured retry count.
pub const PARSE_ATTEMPTS: u32 = 2;

/// Failure of one unit of work (a page, an item, or a file).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("service refused: {0}")]
    Remote(String),

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("local I/O error: {0}")]
    Io(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Whether this failure means the listing has no further results.
    pub fn is_end_of_data(&self) -> bool {
        matches!(
            self,
            FetchError::Status(400) | FetchError::Status(404) | FetchError::Status(410)
                | FetchError::Remote(_)
        )
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => FetchError::Timeout(msg),
            TransportError::Connect(msg) => FetchError::Connection(msg),
            TransportError::Request(msg) => FetchError::InvalidRequest(msg),
        }
    }
}

impl From<ParseError> for FetchError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Remote(msg) => FetchError::Remote(msg),
            other => FetchError::Parse(other.to_string()),
        }
    }
}

/// Result of one request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Success(T),
    /// Timeouts, connection errors, 429, 5xx, unparsable bodies.
    Transient(FetchError),
    /// 4xx responses and explicit service errors.
    Permanent(FetchError),
}

impl<T> Attempt<T> {
    /// Classify an HTTP status that is not a success.
    pub fn from_status(status: u16) -> Self {
        match status {
            408 | 429 | 500..=599 => Attempt::Transient(FetchError::Status(status)),
            _ => Attempt::Permanent(FetchError::Status(status)),
        }
    }

    /// Classify a transport-level failure.
    pub fn from_transport(err: TransportError) -> Self {
        match err {
            TransportError::Request(_) => Attempt::Permanent(err.into()),
            _ => Attempt::Transient(err.into()),
        }
    }

    /// Classify a body translation failure.
    pub fn from_parse(err: ParseError) -> Self {
        match err {
            ParseError::Remote(_) => Attempt::Permanent(err.into()),
            _ => Attempt::Transient(err.into()),
        }
    }

    /// Chain a further step onto a successful attempt.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Attempt<U>) -> Attempt<U> {
        match self {
            Attempt::Success(value) => f(value),
            Attempt::Transient(e) => Attempt::Transient(e),
            Attempt::Permanent(e) => Attempt::Permanent(e),
        }
    }
}

/// Retry limits and backoff.
///
/// Backoff before attempt `n + 1` is `base_delay × n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the initial attempt and is clamped to at least 1.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay applied after failed attempt `attempt` (1-indexed).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `op` receives the 1-indexed attempt number. Parse failures get at
    /// most [`PARSE_ATTEMPTS`] attempts.
    pub async fn run<T, F, Fut>(&self, clock: &dyn Clock, label: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let mut parse_failures = 0;
        let mut attempt = 1;

        loop {
            let error = match op(attempt).await {
                Attempt::Success(value) => return Ok(value),
                Attempt::Permanent(error) => {
                    tracing::debug!("{}: permanent failure: {}", label, error);
                    return Err(error);
                }
                Attempt::Transient(error) => error,
            };

            if matches!(error, FetchError::Parse(_)) {
                parse_failures += 1;
                if parse_failures >= PARSE_ATTEMPTS {
                    tracing::debug!("{}: response still unparsable, giving up", label);
                    return Err(error);
                }
            }

            if attempt >= self.max_attempts {
                tracing::debug!("{}: giving up after {} attempts: {}", label, attempt, error);
                return Err(error);
            }

            let delay = self.backoff(attempt);
            tracing::warn!(
                "{}: attempt {}/{} failed ({}), retrying in {:.1}s",
                label,
                attempt,
                self.max_attempts,
                error,
                delay.as_secs_f64()
            );
            clock.sleep(delay).await;
            attempt += 1;
        }
    }
}
