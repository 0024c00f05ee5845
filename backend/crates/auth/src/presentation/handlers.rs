//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use std::sync::Arc;

use crate::application::AuthService;
use crate::domain::repository::{CodeStore, SmsSender, UserDirectory};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LoginOrSignupRequest, LoginOrSignupResponse, SendAuthCodeRequest, SendAuthCodeResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, S>
where
    R: CodeStore + UserDirectory + Send + Sync + 'static,
    S: SmsSender + Sync + 'static,
{
    pub service: Arc<AuthService<R, R, S>>,
}

impl<R, S> Clone for AuthAppState<R, S>
where
    R: CodeStore + UserDirectory + Send + Sync + 'static,
    S: SmsSender + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

/// Body rejections share the crate's error shape
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AuthResult<T> {
    payload
        .map(|Json(req)| req)
        .map_err(|rejection| AuthError::MalformedRequest(rejection.body_text()))
}

// ============================================================================
// Send Auth Code
// ============================================================================

/// POST /api/v1/send_auth_code
pub async fn send_auth_code<R, S>(
    State(state): State<AuthAppState<R, S>>,
    payload: Result<Json<SendAuthCodeRequest>, JsonRejection>,
) -> AuthResult<Json<SendAuthCodeResponse>>
where
    R: CodeStore + UserDirectory + Send + Sync + 'static,
    S: SmsSender + Sync + 'static,
{
    let req = body(payload)?;
    let output = state.service.request_code(&req.phone).await?;

    Ok(Json(SendAuthCodeResponse {
        expires_at_ms: output.expires_at_ms,
    }))
}

// ============================================================================
// Login Or Signup
// ============================================================================

/// POST /api/v1/login_or_signup
pub async fn login_or_signup<R, S>(
    State(state): State<AuthAppState<R, S>>,
    payload: Result<Json<LoginOrSignupRequest>, JsonRejection>,
) -> AuthResult<Json<LoginOrSignupResponse>>
where
    R: CodeStore + UserDirectory + Send + Sync + 'static,
    S: SmsSender + Sync + 'static,
{
    let req = body(payload)?;
    let output = state.service.login_or_signup(&req.phone, &req.code).await?;

    Ok(Json(LoginOrSignupResponse {
        uuid: output.uuid,
        token: output.token,
    }))
}
