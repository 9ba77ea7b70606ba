//! Error types for access checks.

use thiserror::Error as ThisError;

use super::AccessLevel;
use crate::Error;

#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AccessError {
    /// The session has not logged in.
    #[error("Login required")]
    NotAuthenticated,

    /// The session level is below what the operation needs.
    #[error("Access denied: {operation} requires level {required}, session has {actual}")]
    InsufficientLevel {
        operation: &'static str,
        required: AccessLevel,
        actual: AccessLevel,
    },

    /// A numeric level outside 1..=3.
    #[error("Unknown access level: {value}")]
    UnknownLevel { value: i64 },
}

impl AccessError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            AccessError::NotAuthenticated | AccessError::InsufficientLevel { .. }
        )
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Error::Access(err)
    }
}
