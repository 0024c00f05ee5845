//! Application Layer
//!
//! Use cases and application services.

pub mod auth_service;
pub mod config;
pub mod request_code;
pub mod resolve_identity;
pub mod session_token;
mod store_call;

// Re-exports
pub use auth_service::{AuthService, LoginOrSignupOutput};
pub use config::AuthConfig;
pub use request_code::{AuthCodeIssuer, RequestCodeOutput};
pub use resolve_identity::{IdentityResolver, ResolvedIdentity};
pub use session_token::{HmacTokenIssuer, SessionToken, TokenClaims, TokenIssuer};
