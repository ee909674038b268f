//! Client-side throttling for the injectable HTTP transport.
//!
//! Models a token bucket: tokens accrue at `refill_rate` tokens/second up to
//! `capacity`, and every request consumes one. A throttled transport waits
//! for a token instead of failing, so callers stay within their API plan.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::HttpError;
use crate::transport::HttpTransport;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum tokens in the bucket (burst size).
    pub capacity: f64,
    /// Token refill rate (requests per second).
    pub refill_rate: f64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        // unauthenticated tonapi.io allows one request per second
        Self {
            capacity: 1.0,
            refill_rate: 1.0,
        }
    }
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Thread-safe token bucket.
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            state: Mutex::new(BucketState {
                tokens: config.capacity,
                last_refill: Instant::now(),
            }),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take one token if available.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.lock();
        self.refill(&mut state);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Estimated wait before the next token is available.
    pub fn wait_time(&self) -> Duration {
        let mut state = self.lock();
        self.refill(&mut state);
        let deficit = 1.0 - state.tokens;
        if deficit <= 0.0 {
            Duration::ZERO
        } else if self.config.refill_rate <= 0.0 {
            Duration::MAX
        } else {
            Duration::from_secs_f64(deficit / self.config.refill_rate)
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.config.refill_rate).min(self.config.capacity);
        state.last_refill = now;
    }
}

/// Transport wrapper that waits for the rate limiter before every request.
pub struct ThrottledTransport<T> {
    inner: T,
    limiter: RateLimiter,
}

impl<T: HttpTransport> ThrottledTransport<T> {
    pub fn new(inner: T, config: RateLimiterConfig) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(config),
        }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for ThrottledTransport<T> {
    async fn execute(&self, req: reqwest::Request) -> Result<reqwest::Response, HttpError> {
        while !self.limiter.try_acquire() {
            let wait = self.limiter.wait_time();
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limited, backing off");
            tokio::time::sleep(wait).await;
        }
        self.inner.execute(req).await
    }
}
