//! Request Code Use Case
//!
//! Validates the phone, applies the per-phone rate limit, stores a fresh
//! code and hands it to SMS delivery without waiting for it.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::store_call::bounded;
use crate::domain::entity::auth_code::AuthCode;
use crate::domain::repository::{CodeStore, SmsSender};
use crate::domain::value_object::{
    phone_number::PhoneNumber, verification_code::VerificationCode,
};
use crate::error::{AuthError, AuthResult};

/// Request code output
#[derive(Debug, Clone)]
pub struct RequestCodeOutput {
    /// When the issued code stops being accepted (Unix timestamp ms)
    pub expires_at_ms: i64,
}

/// Auth code issuer
pub struct AuthCodeIssuer<C, S>
where
    C: CodeStore,
    S: SmsSender,
{
    code_store: Arc<C>,
    sms: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<C, S> AuthCodeIssuer<C, S>
where
    C: CodeStore,
    S: SmsSender + Sync + 'static,
{
    pub fn new(code_store: Arc<C>, sms: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            code_store,
            sms,
            config,
        }
    }

    pub async fn execute(&self, phone: &str) -> AuthResult<RequestCodeOutput> {
        let phone = PhoneNumber::parse(phone, &self.config.phone_rules)?;
        let phone_tag = phone.log_tag();

        let code = AuthCode::issue(
            phone,
            VerificationCode::generate(self.config.code_length),
            self.config.code_ttl_ms(),
        );

        let decision = bounded(
            self.config.store_timeout,
            "code_store.issue",
            self.code_store.issue(&code, &self.config.rate_limit),
        )
        .await?;

        if !decision.allowed {
            let retry_after = decision.retry_after(Utc::now().timestamp_millis());
            tracing::info!(
                phone_tag = %phone_tag,
                retry_after_ms = retry_after.as_millis() as u64,
                "Code request over limit"
            );
            return Err(AuthError::RateLimited { retry_after });
        }

        tracing::info!(
            phone_tag = %phone_tag,
            remaining = decision.remaining,
            expires_at_ms = code.expires_at_ms,
            "Verification code issued"
        );

        let expires_at_ms = code.expires_at_ms;
        self.dispatch(code);

        Ok(RequestCodeOutput { expires_at_ms })
    }

    /// Hand the code to SMS delivery in the background
    ///
    /// Delivery failures are logged; the code stays valid either way.
    fn dispatch(&self, code: AuthCode) {
        let sms = self.sms.clone();
        tokio::spawn(async move {
            if let Err(e) = sms.send(&code.phone, &code.code).await {
                tracing::warn!(
                    phone_tag = %code.phone.log_tag(),
                    error = %e,
                    "SMS delivery failed"
                );
            }
        });
    }
}
