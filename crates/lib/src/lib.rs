//!
//! Trade Manual: a login-gated registry of PDF documents.
//! This library holds the state and rules behind the trade manual portal; the
//! web front end lives in the `trade-manual-bin` crate.
//!
//! ## Core Concepts
//!
//! * **Credential store (`credentials::CredentialStore`)**: username → password and access level, kept in one JSON file. Seeds a bootstrap admin on first run.
//! * **Document registry (`documents::DocumentRegistry`)**: the PDFs in one directory. The directory is the source of truth; the listing is rescanned after every change.
//! * **Access levels (`access::AccessLevel`)**: `View` (1) < `Upload` (2) < `Admin` (3). A level includes everything below it.
//! * **Session (`session::Session`)**: who is logged in, at what level, and which document they have open.
//! * **Portal (`portal::Portal`)**: owns the credential store and registry and exposes the operations a front end may call, each checked against the caller's session.
//!
//! ## Initialization order
//!
//! [`Portal::open`] loads configuration paths, loads credentials (creating the
//! file with the bootstrap admin if absent), then scans the document
//! directory. There is no global state; the front end owns the `Portal`.

pub mod access;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod documents;
pub mod portal;
pub mod session;

pub use clock::{Clock, SystemClock};
pub use config::PortalConfig;
pub use documents::Document;
pub use portal::Portal;
pub use session::Session;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;

/// Result type used throughout the Trade Manual library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Trade Manual library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured access-control errors from the access module
    #[error(transparent)]
    Access(access::AccessError),

    /// Structured credential errors from the credentials module
    #[error(transparent)]
    Credential(credentials::CredentialError),

    /// Structured document errors from the documents module
    #[error(transparent)]
    Document(documents::DocumentError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Access(_) => "access",
            Error::Credential(_) => "credentials",
            Error::Document(_) => "documents",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates permission was denied.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Access(access_err) => access_err.is_permission_denied(),
            Error::Credential(cred_err) => cred_err.is_permission_denied(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Credential(cred_err) => cred_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is a failed login.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Credential(cred_err) => cred_err.is_authentication_error(),
            Error::Access(access::AccessError::NotAuthenticated) => true,
            _ => false,
        }
    }

    /// Check if this error is caused by bad caller input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Credential(cred_err) => cred_err.is_validation_error(),
            Error::Document(doc_err) => doc_err.is_validation_error(),
            Error::Access(access::AccessError::UnknownLevel { .. }) => true,
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Credential(cred_err) => cred_err.is_io_error(),
            Error::Document(doc_err) => doc_err.is_io_error(),
            _ => false,
        }
    }
}
