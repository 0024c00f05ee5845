//! PhoneNumber Value Object
//!
//! Identity key for code issuance and user lookup. Validated and normalised
//! once at the boundary, opaque afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Shape constraints applied when parsing caller input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneRules {
    /// Minimum number of digits (country code included)
    pub min_digits: usize,
    /// Maximum number of digits (E.164 caps at 15)
    pub max_digits: usize,
    /// Require a leading `+` country code
    ///
    /// Turning this off lets `+86…` and `86…` become distinct keys.
    pub require_country_code: bool,
}

impl Default for PhoneRules {
    fn default() -> Self {
        Self {
            min_digits: 7,
            max_digits: 15,
            require_country_code: true,
        }
    }
}

/// Phone number value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse caller input
    ///
    /// Surrounding whitespace and visual separators (spaces, dashes, dots,
    /// parentheses) are dropped; what remains must be an optional `+`
    /// followed only by digits. The `+` is mandatory unless the rules
    /// relax it.
    pub fn parse(raw: &str, rules: &PhoneRules) -> AuthResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AuthError::InvalidPhone("phone number cannot be empty".into()));
        }

        let compact: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();

        let (has_plus, digits) = match compact.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, compact.as_str()),
        };

        if rules.require_country_code && !has_plus {
            return Err(AuthError::InvalidPhone(
                "phone number must start with a country code (+)".into(),
            ));
        }

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::InvalidPhone(
                "phone number may only contain digits after an optional +".into(),
            ));
        }

        if !(rules.min_digits..=rules.max_digits).contains(&digits.len()) {
            return Err(AuthError::InvalidPhone(format!(
                "phone number must have between {} and {} digits",
                rules.min_digits, rules.max_digits
            )));
        }

        Ok(Self(if has_plus {
            format!("+{digits}")
        } else {
            digits.to_string()
        }))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(phone: impl Into<String>) -> Self {
        Self(phone.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// One-way tag for log fields; the number itself is never logged
    pub fn log_tag(&self) -> String {
        platform::crypto::log_tag(self.0.as_bytes())
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
