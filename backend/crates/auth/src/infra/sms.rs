//! SMS Delivery
//!
//! No carrier integration is wired in; this sender only records that a
//! delivery would have happened.

use crate::domain::repository::SmsSender;
use crate::domain::value_object::{
    phone_number::PhoneNumber, verification_code::VerificationCode,
};
use crate::error::AuthResult;

/// SMS sender that writes to the log
#[derive(Debug, Clone, Default)]
pub struct LogSmsSender {
    /// Include the code itself (local development only)
    reveal_code: bool,
}

impl LogSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revealing_codes() -> Self {
        Self { reveal_code: true }
    }
}

impl SmsSender for LogSmsSender {
    async fn send(&self, phone: &PhoneNumber, code: &VerificationCode) -> AuthResult<()> {
        if self.reveal_code {
            tracing::info!(phone_tag = %phone.log_tag(), code = code.as_str(), "SMS dispatched");
        } else {
            tracing::info!(phone_tag = %phone.log_tag(), "SMS dispatched");
        }
        Ok(())
    }
}
