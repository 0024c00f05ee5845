//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG, SHA-256, Base64url, constant-time compare)
//! - Fixed-window rate limiting primitives

pub mod crypto;
pub mod rate_limit;
