//! Test doubles shared by the unit tests: a manual clock and an in-memory transport.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use url::Url;

use crate::api::transport::{RawResponse, RequestKind, Transport, TransportError};
use crate::api::PixivApi;
use crate::clock::Clock;
use crate::download::RateLimiter;

/// Clock whose `sleep` advances time instantly.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Duration>,
    today: NaiveDate,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            now: Mutex::new(Duration::ZERO),
            today,
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

type Handler = dyn Fn(&Url, usize) -> Result<RawResponse, TransportError> + Send + Sync;

/// A transport answering from a closure and recording every call.
///
/// The handler receives the request URL and how many times that exact URL
/// has been requested before.
pub struct FakeTransport {
    handler: Box<Handler>,
    clock: Arc<ManualClock>,
    calls: Mutex<Vec<(Url, Duration)>>,
    per_url: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl std::fmt::Debug for FakeTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeTransport")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl FakeTransport {
    pub fn new<F>(clock: Arc<ManualClock>, handler: F) -> Self
    where
        F: Fn(&Url, usize) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            clock,
            calls: Mutex::new(Vec::new()),
            per_url: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Clock readings at which each request was issued.
    pub fn call_times(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn called_urls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &Url, _kind: RequestKind) -> Result<RawResponse, TransportError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((url.clone(), self.clock.now()));

        let previous = {
            let mut per_url = self.per_url.lock().unwrap();
            let count = per_url.entry(url.to_string()).or_insert(0);
            let previous = *count;
            *count += 1;
            previous
        };

        (self.handler)(url, previous)
    }
}

/// JSON response with status 200.
pub fn json(body: serde_json::Value) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status: 200,
        body: body.to_string().into_bytes(),
    })
}

/// Empty-bodied response with the given status.
pub fn status(code: u16) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status: code,
        body: Vec::new(),
    })
}

/// Binary response with status 200.
pub fn bytes(body: &[u8]) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status: 200,
        body: body.to_vec(),
    })
}

/// Reference date used by most tests.
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
}

/// Build an API client over a fake transport sharing one manual clock.
pub fn fake_api<F>(delay: Duration, handler: F) -> (Arc<PixivApi>, Arc<FakeTransport>, Arc<ManualClock>)
where
    F: Fn(&Url, usize) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
{
    let clock = Arc::new(ManualClock::new(test_today()));
    let transport = Arc::new(FakeTransport::new(clock.clone(), handler));
    let limiter = Arc::new(RateLimiter::new(delay, Duration::ZERO, clock.clone()));
    let api = PixivApi::new(transport.clone(), limiter).unwrap();
    (Arc::new(api), transport, clock)
}
