//! Process-wide request spacing.
//!
//! One [`RateLimiter`] is shared by the listing resolver and the download
//! manager.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::Mutex;

use crate::clock::Clock;

/// Minimum spacing between consecutive outbound requests.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    jitter: Duration,
    clock: Arc<dyn Clock>,
    /// Clock reading of the previous request; `None` before the first one.
    last_request: Mutex<Option<Duration>>,
}

impl RateLimiter {
    pub fn new(delay: Duration, jitter: Duration, clock: Arc<dyn Clock>) -> Self {
        tracing::debug!(
            "Creating rate limiter: delay {:?}, jitter up to {:?}",
            delay,
            jitter
        );
        Self {
            delay,
            jitter,
            clock,
            last_request: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Wait until a request may be sent, then record it as sent.
    ///
    /// The lock is held across the sleep so that concurrent callers queue up
    /// behind each other instead of all waking at the same instant.
    pub async fn acquire(&self) {
        let mut last_request = self.last_request.lock().await;

        if let Some(last) = *last_request {
            let spacing = self.delay + self.random_jitter();
            let elapsed = self.clock.now().saturating_sub(last);

            if elapsed < spacing {
                let wait = spacing - elapsed;
                tracing::debug!("Rate limit: waiting {} ms", wait.as_millis());
                self.clock.sleep(wait).await;
            }
        }

        *last_request = Some(self.clock.now());
    }

    fn random_jitter(&self) -> Duration {
        if self.jitter.is_zero() {
            return Duration::ZERO;
        }
        let max_ms = self.jitter.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }
}
