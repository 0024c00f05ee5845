//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Every variant maps to its own stable machine code so clients can tell
//! "wait" (`RATE_LIMITED`) from "resend" (`CODE_EXPIRED`) from
//! "wrong code" (`CODE_MISMATCH`).

use std::time::Duration;

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Phone number failed format validation
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// Too many codes requested for this phone within the window
    #[error("Too many code requests, retry in {}s", retry_after_secs(.retry_after))]
    RateLimited { retry_after: Duration },

    /// No live code for the phone (never issued, consumed, or expired)
    #[error("Invalid or expired code")]
    CodeExpired,

    /// A live code exists but the submitted value differs
    #[error("Code does not match")]
    CodeMismatch,

    /// Request body could not be parsed
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Store call timed out or the backend is temporarily unreachable
    #[error("Store unavailable: {0}")]
    TransientStore(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Whole seconds, rounded up so a client never retries early
fn retry_after_secs(retry_after: &Duration) -> u64 {
    let secs = retry_after.as_secs();
    let rounded = if retry_after.subsec_nanos() > 0 { secs + 1 } else { secs };
    rounded.max(1)
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidPhone(_) | AuthError::MalformedRequest(_) => ErrorKind::BadRequest,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::CodeExpired | AuthError::CodeMismatch => ErrorKind::Unauthorized,
            AuthError::TransientStore(_) | AuthError::Database(_) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidPhone(_) => "INVALID_PHONE",
            AuthError::RateLimited { .. } => "RATE_LIMITED",
            AuthError::CodeExpired => "CODE_EXPIRED",
            AuthError::CodeMismatch => "CODE_MISMATCH",
            AuthError::MalformedRequest(_) => "MALFORMED_REQUEST",
            AuthError::TransientStore(_) | AuthError::Database(_) => "STORE_UNAVAILABLE",
            AuthError::Internal(_) => "INTERNAL",
        }
    }

    /// What the caller should do next
    fn action(&self) -> Option<String> {
        match self {
            AuthError::InvalidPhone(_) => {
                Some("Enter the phone number in international format".to_string())
            }
            AuthError::RateLimited { retry_after } => Some(format!(
                "Wait {} seconds before requesting another code",
                retry_after_secs(retry_after)
            )),
            AuthError::CodeExpired => Some("Request a new code".to_string()),
            AuthError::CodeMismatch => Some("Check the code and try again".to_string()),
            AuthError::TransientStore(_) | AuthError::Database(_) => {
                Some("Retry the request".to_string())
            }
            AuthError::MalformedRequest(_) | AuthError::Internal(_) => None,
        }
    }

    /// Whether repeating the same call can succeed
    pub fn is_transient(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Convert to AppError
    ///
    /// Server-side details are not echoed to clients.
    pub fn to_app_error(&self) -> AppError {
        let message = match self {
            AuthError::TransientStore(_) | AuthError::Database(_) => {
                "Service temporarily unavailable".to_string()
            }
            AuthError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        let err = AppError::new(self.kind(), message).with_code(self.code());
        match self.action() {
            Some(action) => err.with_action(action),
            None => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::TransientStore(msg) => {
                tracing::error!(message = %msg, "Auth store unavailable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::RateLimited { retry_after } => {
                tracing::warn!(
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Code request rate limited"
                );
            }
            AuthError::CodeMismatch => {
                tracing::warn!("Verification code mismatch");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let mut response = self.to_app_error().into_response();
        if let AuthError::RateLimited { retry_after } = &self {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_secs(retry_after)),
            );
        }
        response
    }
}
