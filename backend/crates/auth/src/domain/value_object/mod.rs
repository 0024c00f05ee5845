//! Value Object Module

pub mod phone_number;
pub mod user_uuid;
pub mod verification_code;
