//! In-Memory Repository Implementations
//!
//! Each phone owns one map entry; the entry guard serialises operations on
//! that phone while other phones proceed on other shards.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateWindow};

use crate::domain::entity::{auth_code::AuthCode, user::UserRecord};
use crate::domain::repository::{CodeCheck, CodeStore, UserDirectory};
use crate::domain::value_object::{
    phone_number::PhoneNumber, verification_code::VerificationCode,
};
use crate::error::AuthResult;

/// Code and rate window for one phone
#[derive(Debug, Default)]
struct CodeSlot {
    code: Option<AuthCode>,
    window: Option<RateWindow>,
}

impl CodeSlot {
    /// Drop expired parts, returning how many went
    fn prune(&mut self, now_ms: i64) -> usize {
        let mut dropped = 0;
        if self.code.as_ref().is_some_and(|c| c.is_expired_at(now_ms)) {
            self.code = None;
            dropped += 1;
        }
        if self.window.is_some_and(|w| w.is_expired(now_ms)) {
            self.window = None;
            dropped += 1;
        }
        dropped
    }

    fn is_empty(&self) -> bool {
        self.code.is_none() && self.window.is_none()
    }
}

/// In-memory auth repository
#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    codes: Arc<DashMap<PhoneNumber, CodeSlot>>,
    users: Arc<DashMap<PhoneNumber, UserRecord>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users in the directory
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

// ============================================================================
// Code Store Implementation
// ============================================================================

impl CodeStore for InMemoryAuthRepository {
    async fn set(&self, code: &AuthCode) -> AuthResult<()> {
        self.codes.entry(code.phone.clone()).or_default().code = Some(code.clone());
        Ok(())
    }

    async fn get(&self, phone: &PhoneNumber) -> AuthResult<Option<AuthCode>> {
        let now_ms = Utc::now().timestamp_millis();
        Ok(self
            .codes
            .get(phone)
            .and_then(|slot| slot.code.clone())
            .filter(|code| !code.is_expired_at(now_ms)))
    }

    async fn delete(&self, phone: &PhoneNumber) -> AuthResult<()> {
        self.codes.remove(phone);
        Ok(())
    }

    async fn increment_rate_counter(
        &self,
        phone: &PhoneNumber,
        config: &RateLimitConfig,
    ) -> AuthResult<RateLimitResult> {
        let now_ms = Utc::now().timestamp_millis();
        let mut slot = self.codes.entry(phone.clone()).or_default();
        Ok(RateWindow::hit(&mut slot.window, config, now_ms))
    }

    async fn issue(
        &self,
        code: &AuthCode,
        config: &RateLimitConfig,
    ) -> AuthResult<RateLimitResult> {
        let now_ms = Utc::now().timestamp_millis();
        let mut slot = self.codes.entry(code.phone.clone()).or_default();

        let decision = RateWindow::hit(&mut slot.window, config, now_ms);
        if decision.allowed {
            slot.code = Some(code.clone());
        }
        Ok(decision)
    }

    async fn consume(
        &self,
        phone: &PhoneNumber,
        submitted: &VerificationCode,
        max_attempts: u32,
    ) -> AuthResult<CodeCheck> {
        let now_ms = Utc::now().timestamp_millis();

        let Entry::Occupied(mut entry) = self.codes.entry(phone.clone()) else {
            return Ok(CodeCheck::Expired);
        };

        let check = match &entry.get().code {
            None => CodeCheck::Expired,
            Some(stored) if stored.is_expired_at(now_ms) => CodeCheck::Expired,
            Some(stored) if stored.code.matches(submitted) => CodeCheck::Consumed,
            Some(_) => CodeCheck::Mismatch,
        };

        match check {
            CodeCheck::Consumed => {
                entry.remove();
            }
            CodeCheck::Expired => {
                entry.get_mut().code = None;
                if entry.get().window.is_none_or(|w| w.is_expired(now_ms)) {
                    entry.remove();
                }
            }
            CodeCheck::Mismatch => {
                let slot = entry.get_mut();
                let exhausted = slot
                    .code
                    .as_mut()
                    .is_some_and(|code| code.record_failure(max_attempts));
                if exhausted {
                    tracing::warn!(
                        phone = %phone.log_tag(),
                        "Code discarded after too many wrong guesses"
                    );
                    slot.code = None;
                }
            }
        }

        Ok(check)
    }

    async fn purge_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut dropped = 0u64;

        self.codes.retain(|_, slot| {
            dropped += slot.prune(now_ms) as u64;
            !slot.is_empty()
        });

        tracing::debug!(dropped, "Purged expired in-memory codes");
        Ok(dropped)
    }
}

// ============================================================================
// User Directory Implementation
// ============================================================================

impl UserDirectory for InMemoryAuthRepository {
    async fn find_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<UserRecord>> {
        Ok(self.users.get(phone).map(|user| user.value().clone()))
    }

    async fn create_if_absent(&self, user: &UserRecord) -> AuthResult<(UserRecord, bool)> {
        match self.users.entry(user.phone.clone()) {
            Entry::Occupied(existing) => Ok((existing.get().clone(), false)),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok((user.clone(), true))
            }
        }
    }

    async fn delete_by_phone(&self, phone: &PhoneNumber) -> AuthResult<bool> {
        Ok(self.users.remove(phone).is_some())
    }
}
