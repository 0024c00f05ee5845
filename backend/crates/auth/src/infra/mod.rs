//! Infrastructure Layer
//!
//! Store implementations and external service integrations.

pub mod memory;
pub mod postgres;
pub mod sms;

pub use memory::InMemoryAuthRepository;
pub use postgres::PgAuthRepository;
pub use sms::LogSmsSender;
