//! User Record Entity
//!
//! Directory entry keyed by phone. The list fields belong to other parts of
//! the product; this crate only seeds them.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{phone_number::PhoneNumber, user_uuid::UserUuid};

/// Serialized empty list stored for a fresh user
pub const EMPTY_LIST: &str = "[]";

/// User record entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub uuid: UserUuid,
    /// Unique across the directory
    pub phone: PhoneNumber,
    pub match_list: String,
    pub black_list: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new user with a freshly generated identifier
    pub fn new(phone: PhoneNumber) -> Self {
        Self::with_uuid(UserUuid::generate(), phone)
    }

    /// Create a user with a known identifier (seeding, imports)
    pub fn with_uuid(uuid: UserUuid, phone: PhoneNumber) -> Self {
        let now = Utc::now();
        Self {
            uuid,
            phone,
            match_list: EMPTY_LIST.to_string(),
            black_list: EMPTY_LIST.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
