//! Error types for the credential store

use thiserror::Error as ThisError;

use crate::Error;

#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum CredentialError {
    /// The credential file exists but is not a valid user mapping.
    #[error("Malformed credential file {path}: {source}")]
    MalformedFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Unknown username or wrong password. Deliberately does not say which.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User already exists: {username}")]
    DuplicateUser { username: String },

    /// Only the bootstrap admin account may hold the top level.
    #[error("Creating additional administrators is restricted: {username}")]
    PrivilegeRestricted { username: String },

    #[error("Field must not be empty: {field}")]
    EmptyField { field: &'static str },

    #[error("Credential file I/O failed for {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize credentials: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Password hashing failed: {reason}")]
    PasswordHash { reason: String },

    /// The store is running on the in-memory fallback because the file on
    /// disk could not be parsed. Accounts stay read-only until it is repaired.
    #[error("Credential file must be repaired before accounts can change: {reason}")]
    FileNeedsRepair { reason: String },
}

impl CredentialError {
    /// Check if this error indicates the username is already taken.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CredentialError::DuplicateUser { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, CredentialError::PrivilegeRestricted { .. })
    }

    pub fn is_authentication_error(&self) -> bool {
        matches!(self, CredentialError::InvalidCredentials)
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, CredentialError::EmptyField { .. })
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, CredentialError::FileIo { .. })
    }

    /// Check if this error was raised because the file on disk is unreadable.
    pub fn needs_repair(&self) -> bool {
        matches!(self, CredentialError::FileNeedsRepair { .. })
    }
}

impl From<CredentialError> for Error {
    fn from(err: CredentialError) -> Self {
        Error::Credential(err)
    }
}
