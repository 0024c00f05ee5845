//! Resolve Identity Use Case
//!
//! Consumes a verification code and maps the phone to exactly one user,
//! creating the user on first login.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::store_call::bounded;
use crate::domain::entity::user::UserRecord;
use crate::domain::repository::{CodeCheck, CodeStore, UserDirectory};
use crate::domain::value_object::{
    phone_number::PhoneNumber, user_uuid::UserUuid, verification_code::VerificationCode,
};
use crate::error::{AuthError, AuthResult};

/// Resolved identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_uuid: UserUuid,
    /// Whether this call created the user
    pub created: bool,
}

/// Identity resolver
pub struct IdentityResolver<C, U>
where
    C: CodeStore,
    U: UserDirectory,
{
    code_store: Arc<C>,
    directory: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<C, U> IdentityResolver<C, U>
where
    C: CodeStore,
    U: UserDirectory,
{
    pub fn new(code_store: Arc<C>, directory: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self {
            code_store,
            directory,
            config,
        }
    }

    /// Verify the code, then find or create the user
    pub async fn execute(&self, phone: &str, code: &str) -> AuthResult<ResolvedIdentity> {
        let phone = PhoneNumber::parse(phone, &self.config.phone_rules)?;
        let submitted = VerificationCode::parse_submitted(code, self.config.code_length)?;

        let check = bounded(
            self.config.store_timeout,
            "code_store.consume",
            self.code_store
                .consume(&phone, &submitted, self.config.max_attempts),
        )
        .await?;

        match check {
            CodeCheck::Consumed => {}
            CodeCheck::Mismatch => return Err(AuthError::CodeMismatch),
            CodeCheck::Expired => return Err(AuthError::CodeExpired),
        }

        self.find_or_create(&phone).await
    }

    /// Map a verified phone to its user
    ///
    /// Concurrent calls for one phone all return the same identifier;
    /// losing an insert race falls back to the stored record.
    pub async fn find_or_create(&self, phone: &PhoneNumber) -> AuthResult<ResolvedIdentity> {
        let existing = bounded(
            self.config.store_timeout,
            "user_directory.find_by_phone",
            self.directory.find_by_phone(phone),
        )
        .await?;

        if let Some(user) = existing {
            tracing::info!(user_uuid = %user.uuid, "User logged in");
            return Ok(ResolvedIdentity {
                user_uuid: user.uuid,
                created: false,
            });
        }

        let candidate = UserRecord::new(phone.clone());
        let (user, created) = bounded(
            self.config.store_timeout,
            "user_directory.create_if_absent",
            self.directory.create_if_absent(&candidate),
        )
        .await?;

        if created {
            tracing::info!(user_uuid = %user.uuid, "User signed up");
        } else {
            tracing::debug!(user_uuid = %user.uuid, "Concurrent signup resolved to stored user");
        }

        Ok(ResolvedIdentity {
            user_uuid: user.uuid,
            created,
        })
    }
}
