//! Auth Service
//!
//! Front door composing code issuance, identity resolution and token
//! issuance.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::request_code::{AuthCodeIssuer, RequestCodeOutput};
use crate::application::resolve_identity::IdentityResolver;
use crate::application::session_token::{HmacTokenIssuer, TokenIssuer};
use crate::domain::repository::{CodeStore, SmsSender, UserDirectory};
use crate::error::AuthResult;

/// Login or signup output
#[derive(Debug, Clone)]
pub struct LoginOrSignupOutput {
    pub uuid: String,
    pub token: String,
    pub expires_at_ms: i64,
    /// Whether this login created the user
    pub created: bool,
}

/// Auth service
pub struct AuthService<C, U, S, T = HmacTokenIssuer>
where
    C: CodeStore,
    U: UserDirectory,
    S: SmsSender,
    T: TokenIssuer,
{
    issuer: AuthCodeIssuer<C, S>,
    resolver: IdentityResolver<C, U>,
    tokens: Arc<T>,
}

impl<C, U, S, T> AuthService<C, U, S, T>
where
    C: CodeStore,
    U: UserDirectory,
    S: SmsSender + Sync + 'static,
    T: TokenIssuer,
{
    pub fn new(
        code_store: Arc<C>,
        directory: Arc<U>,
        sms: Arc<S>,
        tokens: Arc<T>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            issuer: AuthCodeIssuer::new(code_store.clone(), sms, config.clone()),
            resolver: IdentityResolver::new(code_store, directory, config),
            tokens,
        }
    }

    /// Issue and send a verification code
    pub async fn request_code(&self, phone: &str) -> AuthResult<RequestCodeOutput> {
        self.issuer.execute(phone).await
    }

    /// Exchange a verification code for a session token
    ///
    /// A user created here is kept even if token issuance then fails; the
    /// next successful login resolves to it.
    pub async fn login_or_signup(
        &self,
        phone: &str,
        code: &str,
    ) -> AuthResult<LoginOrSignupOutput> {
        let identity = self.resolver.execute(phone, code).await?;

        let token = self.tokens.issue(&identity.user_uuid).inspect_err(|e| {
            tracing::error!(
                user_uuid = %identity.user_uuid,
                created = identity.created,
                error = %e,
                "Token issuance failed after identity resolution"
            );
        })?;

        Ok(LoginOrSignupOutput {
            uuid: identity.user_uuid.into_string(),
            token: token.token,
            expires_at_ms: token.expires_at_ms,
            created: identity.created,
        })
    }

    pub fn resolver(&self) -> &IdentityResolver<C, U> {
        &self.resolver
    }
}
