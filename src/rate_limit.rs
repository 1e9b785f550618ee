//! Interval rate limiter for upstream requests.

use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Rate limiter that enforces a minimum spacing between requests.
///
/// Each upstream (a bibliographic source, the geocoder) owns one. An optional
/// jitter is added on top of the base interval, which keeps scraped sources
/// from seeing a perfectly regular request rhythm. A `Retry-After` reported
/// by the server pauses the limiter until it expires.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
}

#[derive(Debug)]
struct RateLimiterInner {
    /// Minimum time between two requests.
    min_interval: Duration,
    /// Extra random delay, uniformly drawn from `0..=jitter`.
    jitter: Duration,
    /// Time of the last request.
    last_request: Option<Instant>,
    /// Server-requested pause (from `Retry-After`).
    blocked_until: Option<Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given maximum requests per second.
    pub fn new(max_per_second: f64) -> Self {
        let interval = if max_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / max_per_second)
        } else {
            Duration::ZERO
        };
        Self::with_interval(interval, Duration::ZERO)
    }

    /// Create a rate limiter from an explicit interval and jitter.
    pub fn with_interval(min_interval: Duration, jitter: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                min_interval,
                jitter,
                last_request: None,
                blocked_until: None,
            })),
        }
    }

    /// A limiter that never waits. Used by tests and mock upstreams.
    pub fn unlimited() -> Self {
        Self::with_interval(Duration::ZERO, Duration::ZERO)
    }

    /// Wait until a request is allowed, then mark it as sent.
    pub async fn acquire(&self) {
        let mut inner = self.inner.lock().await;

        // Server-requested pause first
        if let Some(until) = inner.blocked_until.take() {
            let now = Instant::now();
            if now < until {
                drop(inner);
                tokio::time::sleep(until - now).await;
                inner = self.inner.lock().await;
            }
        }

        if let Some(last) = inner.last_request {
            let mut min_interval = inner.min_interval;
            if !inner.jitter.is_zero() {
                let extra = rand::thread_rng().gen_range(0..=inner.jitter.as_millis() as u64);
                min_interval += Duration::from_millis(extra);
            }
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                drop(inner);
                tokio::time::sleep(wait).await;
                inner = self.inner.lock().await;
            }
        }

        inner.last_request = Some(Instant::now());
    }

    /// Pause all requests for the given duration (server `Retry-After`).
    pub async fn back_off(&self, wait: Duration) {
        let mut inner = self.inner.lock().await;
        let until = Instant::now() + wait;
        if inner.blocked_until.map_or(true, |current| current < until) {
            inner.blocked_until = Some(until);
        }
    }
}
