//! VerificationCode Value Object
//!
//! Numeric one-time code. Debug output is redacted and equality is only
//! exposed through a constant-time comparison.

use std::fmt;

use crate::error::{AuthError, AuthResult};

/// One-time verification code
#[derive(Clone)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Draw a fresh code of `len` digits from the OS CSPRNG
    pub fn generate(len: usize) -> Self {
        Self(platform::crypto::random_digits(len))
    }

    /// Parse a code submitted by a client
    ///
    /// Anything that could never equal an issued code is reported as a
    /// mismatch without touching the store.
    pub fn parse_submitted(raw: &str, expected_len: usize) -> AuthResult<Self> {
        let raw = raw.trim();
        if raw.len() != expected_len || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::CodeMismatch);
        }
        Ok(Self(raw.to_string()))
    }

    /// Create from database value
    pub fn from_db(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Constant-time equality
    pub fn matches(&self, other: &VerificationCode) -> bool {
        platform::crypto::constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }

    /// Raw digits, for storage and delivery only
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}
