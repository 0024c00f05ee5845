//! Session Tokens
//!
//! Signed, self-contained bearer tokens:
//! `base64url(claims_json).base64url(hmac_sha256(secret, first_segment))`.

use chrono::Utc;
use hmac::{Hmac, Mac};
use kernel::id::TokenId;
use platform::crypto::{from_base64url, to_base64url};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_uuid::UserUuid;
use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User identifier
    pub sub: String,
    /// Token ID
    pub jti: String,
    /// Issued at (Unix timestamp ms)
    pub iat: i64,
    /// Expiration (Unix timestamp ms)
    pub exp: i64,
}

/// Issued session token
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at_ms: i64,
}

/// Token issuer seam
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &UserUuid) -> AuthResult<SessionToken>;
}

/// HMAC-SHA256 token issuer
#[derive(Clone)]
pub struct HmacTokenIssuer {
    secret: [u8; 32],
    ttl_ms: i64,
}

impl HmacTokenIssuer {
    pub fn new(secret: [u8; 32], ttl_ms: i64) -> Self {
        Self { secret, ttl_ms }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token_secret, config.token_ttl_ms())
    }

    fn mac(&self) -> AuthResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Check signature and expiry, returning the claims of a valid token
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        let (payload, signature) = token.split_once('.')?;
        let signature = from_base64url(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let claims: TokenClaims = serde_json::from_slice(&from_base64url(payload).ok()?).ok()?;
        if Utc::now().timestamp_millis() >= claims.exp {
            return None;
        }
        Some(claims)
    }
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self, user: &UserUuid) -> AuthResult<SessionToken> {
        let now_ms = Utc::now().timestamp_millis();
        let claims = TokenClaims {
            sub: user.as_str().to_string(),
            jti: TokenId::new().to_string(),
            iat: now_ms,
            exp: now_ms + self.ttl_ms,
        };

        let json = serde_json::to_vec(&claims).map_err(|e| AuthError::Internal(e.to_string()))?;
        let payload = to_base64url(&json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(SessionToken {
            token: format!("{}.{}", payload, to_base64url(&signature)),
            expires_at_ms: claims.exp,
        })
    }
}
