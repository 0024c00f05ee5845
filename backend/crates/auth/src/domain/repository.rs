//! Repository Traits
//!
//! Interfaces for the code store, the user directory and SMS delivery.
//! Implementations are in the infrastructure layer.
//!
//! Every store operation on a single phone is atomic with respect to other
//! operations on that phone; no operation needs a lock wider than one key.

use platform::rate_limit::{RateLimitConfig, RateLimitResult};

use crate::domain::entity::{auth_code::AuthCode, user::UserRecord};
use crate::domain::value_object::{
    phone_number::PhoneNumber, verification_code::VerificationCode,
};
use crate::error::AuthResult;

/// Outcome of checking a submitted code against the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// Matched a live code, which is now gone together with its rate window
    Consumed,
    /// A live code exists but differs; the guess was counted and the code
    /// dropped if that used up its attempts
    Mismatch,
    /// No live code (never issued, already consumed, or expired)
    Expired,
}

/// Verification code store
#[trait_variant::make(CodeStore: Send)]
pub trait LocalCodeStore {
    /// Store a code, replacing any previous one for the phone
    async fn set(&self, code: &AuthCode) -> AuthResult<()>;

    /// Live code for the phone, if any
    async fn get(&self, phone: &PhoneNumber) -> AuthResult<Option<AuthCode>>;

    /// Drop both the code and the rate window for the phone
    async fn delete(&self, phone: &PhoneNumber) -> AuthResult<()>;

    /// Count one request against the phone's window
    async fn increment_rate_counter(
        &self,
        phone: &PhoneNumber,
        config: &RateLimitConfig,
    ) -> AuthResult<RateLimitResult>;

    /// Count one request and, if allowed, store the code
    ///
    /// The check and the overwrite happen as one step.
    async fn issue(&self, code: &AuthCode, config: &RateLimitConfig)
    -> AuthResult<RateLimitResult>;

    /// Compare and, on match, delete the code and the rate window
    ///
    /// A mismatch counts against the code, which is deleted once
    /// `max_attempts` wrong guesses have been made. Concurrent calls for one
    /// phone see at most one `Consumed`.
    async fn consume(
        &self,
        phone: &PhoneNumber,
        submitted: &VerificationCode,
        max_attempts: u32,
    ) -> AuthResult<CodeCheck>;

    /// Remove expired codes and windows, returning how many were dropped
    async fn purge_expired(&self) -> AuthResult<u64>;
}

/// User directory
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    /// Find user by phone
    async fn find_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<UserRecord>>;

    /// Insert unless the phone is taken
    ///
    /// Returns the stored record and whether this call created it. When the
    /// phone already exists the stored record wins.
    async fn create_if_absent(&self, user: &UserRecord) -> AuthResult<(UserRecord, bool)>;

    /// Delete user by phone
    async fn delete_by_phone(&self, phone: &PhoneNumber) -> AuthResult<bool>;
}

/// SMS delivery
#[trait_variant::make(SmsSender: Send)]
pub trait LocalSmsSender {
    /// Deliver a code to the phone
    async fn send(&self, phone: &PhoneNumber, code: &VerificationCode) -> AuthResult<()>;
}
