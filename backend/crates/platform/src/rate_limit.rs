//! Rate Limiting Infrastructure
//!
//! Fixed-window counters. A window opens on the first hit and lasts
//! `config.window`; the counter and the window reset together once it expires.

use std::time::Duration;

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Result for an accepted hit that brought the counter to `count`
    pub fn accepted(count: u32, config: &RateLimitConfig, reset_at_ms: i64) -> Self {
        Self {
            allowed: true,
            remaining: config.max_requests.saturating_sub(count),
            reset_at_ms,
        }
    }

    /// Result for a hit rejected because the window is saturated
    pub fn rejected(reset_at_ms: i64) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_at_ms,
        }
    }

    /// Time left until the window resets, never negative
    pub fn retry_after(&self, now_ms: i64) -> Duration {
        Duration::from_millis((self.reset_at_ms - now_ms).max(0) as u64)
    }
}

/// Counter state for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    pub expires_at_ms: i64,
}

impl RateWindow {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Apply one hit to the window stored in `slot`
    ///
    /// Opens a fresh window when the slot is empty or expired. A rejected hit
    /// leaves the counter untouched, so it never exceeds `max_requests`.
    pub fn hit(
        slot: &mut Option<RateWindow>,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> RateLimitResult {
        match slot {
            Some(window) if !window.is_expired(now_ms) => {
                if window.count >= config.max_requests {
                    RateLimitResult::rejected(window.expires_at_ms)
                } else {
                    window.count += 1;
                    RateLimitResult::accepted(window.count, config, window.expires_at_ms)
                }
            }
            _ => {
                if config.max_requests == 0 {
                    *slot = None;
                    return RateLimitResult::rejected(now_ms + config.window_ms());
                }
                let window = RateWindow {
                    count: 1,
                    expires_at_ms: now_ms + config.window_ms(),
                };
                *slot = Some(window);
                RateLimitResult::accepted(1, config, window.expires_at_ms)
            }
        }
    }
}
