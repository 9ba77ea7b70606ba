//! Error types for the document registry

use thiserror::Error as ThisError;

use crate::Error;

#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum DocumentError {
    /// The document vanished from disk, or never belonged to the registry.
    #[error("Document not found: {path}")]
    NotFound { path: String },

    #[error("Failed to write document {path}: {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete document {path}: {source}")]
    DeleteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read document {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document name: {name:?}")]
    InvalidName { name: String },

    #[error("Failed to scan document directory {path}: {source}")]
    ScanFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DocumentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound { .. })
    }

    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            DocumentError::WriteError { .. }
                | DocumentError::DeleteError { .. }
                | DocumentError::ReadError { .. }
                | DocumentError::ScanFailed { .. }
        )
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, DocumentError::InvalidName { .. })
    }

    /// Path the failing operation was working on, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            DocumentError::NotFound { path }
            | DocumentError::WriteError { path, .. }
            | DocumentError::DeleteError { path, .. }
            | DocumentError::ReadError { path, .. }
            | DocumentError::ScanFailed { path, .. } => Some(path),
            DocumentError::InvalidName { .. } => None,
        }
    }
}

impl From<DocumentError> for Error {
    fn from(err: DocumentError) -> Self {
        Error::Document(err)
    }
}
