//! Cryptographic Utilities
//!
//! Every random value handed to a client (verification codes, token ids)
//! comes from the operating system CSPRNG.

use base64::{Engine, engine::general_purpose};
use rand::{Rng, RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a string of `len` uniformly distributed decimal digits
///
/// Leading zeros are kept, so the result always has exactly `len` characters.
pub fn random_digits(len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + OsRng.gen_range(0..10u8)))
        .collect()
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Short, one-way tag for identifiers that must not appear in logs
///
/// Hex of the first 6 bytes of SHA-256.
pub fn log_tag(data: &[u8]) -> String {
    sha256(data)[..6]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Encode bytes as URL-safe base64 without padding
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 without padding
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Constant-time comparison to prevent timing attacks
///
/// Only the length is allowed to short-circuit.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
