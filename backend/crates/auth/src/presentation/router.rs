//! Auth Router

use axum::{Router, routing::post};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{AuthService, HmacTokenIssuer};
use crate::domain::repository::{CodeStore, SmsSender, UserDirectory};
use crate::infra::{postgres::PgAuthRepository, sms::LogSmsSender};
use crate::presentation::handlers::{self, AuthAppState};

pub const URL_SEND_AUTH_CODE: &str = "/send_auth_code";
pub const URL_LOGIN_OR_SIGNUP: &str = "/login_or_signup";

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, LogSmsSender::new(), config)
}

/// Create a generic Auth router for any store and SMS implementation
pub fn auth_router_generic<R, S>(repo: R, sms: S, config: AuthConfig) -> Router
where
    R: CodeStore + UserDirectory + Send + Sync + 'static,
    S: SmsSender + Sync + 'static,
{
    let repo = Arc::new(repo);
    let tokens = Arc::new(HmacTokenIssuer::from_config(&config));
    let state = AuthAppState {
        service: Arc::new(AuthService::new(
            repo.clone(),
            repo,
            Arc::new(sms),
            tokens,
            Arc::new(config),
        )),
    };

    Router::new()
        .route(URL_SEND_AUTH_CODE, post(handlers::send_auth_code::<R, S>))
        .route(URL_LOGIN_OR_SIGNUP, post(handlers::login_or_signup::<R, S>))
        .with_state(state)
}
