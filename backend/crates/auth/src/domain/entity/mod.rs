//! Entity Module

pub mod auth_code;
pub mod user;
