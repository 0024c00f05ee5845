use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User identifier
///
/// New users get a UUIDv4; identifiers already in the directory are kept
/// verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct UserUuid(String);

impl UserUuid {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_db(uuid: impl Into<String>) -> Self {
        Self(uuid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
