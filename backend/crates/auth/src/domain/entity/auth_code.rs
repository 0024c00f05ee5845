//! Auth Code Entity
//!
//! The single live verification code for a phone. Issuing a new one
//! replaces the previous; a successful login deletes it, and so does
//! running out of attempts.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    phone_number::PhoneNumber, verification_code::VerificationCode,
};

/// Auth code entity
#[derive(Debug, Clone)]
pub struct AuthCode {
    pub phone: PhoneNumber,
    pub code: VerificationCode,
    /// Expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    /// Wrong guesses submitted against this code
    pub failed_attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl AuthCode {
    /// Issue a code valid for `ttl_ms` from now
    pub fn issue(phone: PhoneNumber, code: VerificationCode, ttl_ms: i64) -> Self {
        let now = Utc::now();
        Self {
            phone,
            code,
            expires_at_ms: now.timestamp_millis() + ttl_ms,
            failed_attempts: 0,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Count one wrong guess; true once the code must be discarded
    pub fn record_failure(&mut self, max_attempts: u32) -> bool {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.failed_attempts >= max_attempts
    }
}
