//! Domain Layer
//!
//! Contains entities, value objects, and the collaborator traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{auth_code::AuthCode, user::UserRecord};
pub use repository::{CodeCheck, CodeStore, SmsSender, UserDirectory};
pub use value_object::{
    phone_number::{PhoneNumber, PhoneRules},
    user_uuid::UserUuid,
    verification_code::VerificationCode,
};
