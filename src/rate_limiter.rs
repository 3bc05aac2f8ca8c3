//! Per-city request debouncing
//!
//! Not a token bucket: a city may be fetched again only once the minimum
//! interval has passed since its last accepted request. Rejected requests
//! leave the state untouched and are dropped by the caller.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Rate limiter keyed by city name
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between two accepted requests for one key
    min_interval: Duration,
    /// Time of the last accepted request per key
    last_request: HashMap<String, Instant>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: HashMap::new(),
        }
    }

    /// Check if a request for `key` is allowed at `now` and record it
    pub fn allow(&mut self, key: &str, now: Instant) -> bool {
        if let Some(last) = self.last_request.get(key) {
            if now.saturating_duration_since(*last) < self.min_interval {
                return false;
            }
        }
        self.last_request.insert(key.to_string(), now);
        true
    }

    /// Get time until the next request for `key` is allowed
    #[must_use]
    pub fn time_until_allowed(&self, key: &str, now: Instant) -> Duration {
        self.last_request.get(key).map_or(Duration::ZERO, |last| {
            self.min_interval
                .saturating_sub(now.saturating_duration_since(*last))
        })
    }

    /// Time of the last accepted request for `key`
    #[must_use]
    pub fn last_request(&self, key: &str) -> Option<Instant> {
        self.last_request.get(key).copied()
    }
}
