//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// Send Auth Code
// ============================================================================

/// Send auth code request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAuthCodeRequest {
    pub phone: String,
}

/// Send auth code response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAuthCodeResponse {
    /// Code expiry (Unix timestamp ms)
    pub expires_at_ms: i64,
}

// ============================================================================
// Login Or Signup
// ============================================================================

/// Login or signup request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOrSignupRequest {
    pub phone: String,
    pub code: String,
}

/// Login or signup response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOrSignupResponse {
    pub uuid: String,
    pub token: String,
}
