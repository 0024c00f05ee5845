//! Auth (Authentication) Backend Module
//!
//! Phone number + one-time code login.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, store and delivery traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory stores, SMS delivery
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Flow
//! 1. `POST /send_auth_code` issues a code for a phone (rate limited per phone)
//! 2. `POST /login_or_signup` consumes the code, finds or creates the user
//!    and returns a signed session token
//!
//! ## Security Model
//! - Codes drawn from the OS CSPRNG and compared in constant time
//! - At most one live code per phone; a successful login consumes it
//! - Each code tolerates a bounded number of wrong guesses
//! - Phone numbers appear in logs only as one-way tags
//! - Session tokens are HMAC-SHA256 signed

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::{AuthService, HmacTokenIssuer, TokenIssuer};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, LogSmsSender, PgAuthRepository};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::domain::repository::{CodeStore, SmsSender, UserDirectory};
    pub use crate::infra::memory::InMemoryAuthRepository as MemoryStore;
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}

#[cfg(test)]
mod tests;
