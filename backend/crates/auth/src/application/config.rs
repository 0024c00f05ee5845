//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::rate_limit::RateLimitConfig;

use crate::domain::value_object::phone_number::PhoneRules;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Number of digits in a verification code
    pub code_length: usize,
    /// How long an issued code stays valid (5 minutes)
    pub code_ttl: Duration,
    /// Wrong guesses a single code tolerates before it is discarded
    pub max_attempts: u32,
    /// Code requests allowed per phone and window
    pub rate_limit: RateLimitConfig,
    /// Upper bound on any single store call
    pub store_timeout: Duration,
    /// Secret key for HMAC signing session tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Session token TTL (30 days)
    pub token_ttl: Duration,
    /// Phone number shape constraints
    pub phone_rules: PhoneRules,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            code_ttl: Duration::from_secs(5 * 60),
            max_attempts: 5,
            rate_limit: RateLimitConfig::default(),
            store_timeout: Duration::from_secs(3),
            token_secret: [0u8; 32],
            token_ttl: Duration::from_secs(30 * 24 * 3600),
            phone_rules: PhoneRules::default(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret
    ///
    /// Tokens stop verifying after a restart.
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (looser rate limit)
    pub fn development() -> Self {
        Self {
            rate_limit: RateLimitConfig::new(20, 60),
            ..Self::with_random_secret()
        }
    }

    /// Check values that would make the service unusable
    pub fn validate(&self) -> Result<(), String> {
        if !(4..=10).contains(&self.code_length) {
            return Err(format!("code length must be 4..=10, got {}", self.code_length));
        }
        if self.code_ttl.is_zero() {
            return Err("code TTL must be positive".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max attempts must be positive".to_string());
        }
        if self.rate_limit.window.is_zero() {
            return Err("rate limit window must be positive".to_string());
        }
        if self.store_timeout.is_zero() {
            return Err("store timeout must be positive".to_string());
        }
        if self.token_secret == [0u8; 32] {
            return Err("token secret must be set".to_string());
        }
        Ok(())
    }

    /// Get code TTL in milliseconds
    pub fn code_ttl_ms(&self) -> i64 {
        self.code_ttl.as_millis() as i64
    }

    /// Get token TTL in milliseconds
    pub fn token_ttl_ms(&self) -> i64 {
        self.token_ttl.as_millis() as i64
    }
}
