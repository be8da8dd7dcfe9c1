//! Rate limiting for provider API calls.
//!
//! A token bucket shared by every concurrent probe of a pass, so a large
//! subject list cannot burst through the provider's request quota.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::trace;

use crate::{Error, Result};

/// Configuration for a token bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiterConfig {
    /// Maximum tokens (burst capacity).
    pub max_tokens: u32,
    /// Tokens added per second.
    pub refill_rate: f64,
    /// Tokens available at start.
    pub initial_tokens: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_tokens: 10,
            refill_rate: 5.0,
            initial_tokens: 10,
        }
    }
}

impl RateLimiterConfig {
    /// Create a config for a requests-per-second limit with a 2x burst.
    pub fn with_rps(rps: f64) -> Result<Self> {
        if !rps.is_finite() || rps <= 0.0 {
            return Err(Error::config(format!(
                "rate limit must be a positive finite number, got {}",
                rps
            )));
        }

        let max_tokens = (rps * 2.0).ceil().max(1.0) as u32;

        Ok(Self {
            max_tokens,
            refill_rate: rps,
            initial_tokens: max_tokens,
        })
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    max_tokens: u32,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimiterConfig) -> Self {
        Self {
            tokens: config.initial_tokens as f64,
            max_tokens: config.max_tokens,
            refill_rate: config.refill_rate,
            last_refill: Instant::now(),
        }
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();

        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.refill_rate)
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        self.tokens =
            (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.max_tokens as f64);
        self.last_refill = now;
    }
}

/// Cloneable handle to a shared token bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    bucket: Arc<Mutex<TokenBucket>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(&config))),
        }
    }

    /// Take a token without waiting.
    pub async fn try_acquire(&self) -> bool {
        self.bucket.lock().await.try_acquire()
    }

    /// Take a token, sleeping until one is available. Returns the time waited.
    ///
    /// Cancel safe: the lock is never held across the sleep, so dropping the
    /// future consumes no token.
    pub async fn acquire(&self) -> Duration {
        let mut total_wait = Duration::ZERO;

        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                if bucket.try_acquire() {
                    return total_wait;
                }
                bucket.time_until_available()
            };

            trace!(wait = ?wait, "provider rate limited");
            tokio::time::sleep(wait).await;
            total_wait += wait;
        }
    }

    pub async fn available_tokens(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        bucket.refill();
        bucket.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
