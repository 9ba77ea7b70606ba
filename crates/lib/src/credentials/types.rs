//! Core data types for the credential store

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::access::AccessLevel;

/// On-disk mapping of username to account.
///
/// A `BTreeMap` keeps the written file in a stable order.
pub type CredentialMap = BTreeMap<String, UserRecord>;

/// One account as stored in the credential file.
///
/// The field names are part of the file format:
/// `{"password": "...", "level": 1}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Plaintext password, or an Argon2id PHC string
    pub password: String,

    pub level: AccessLevel,
}

/// Account listing entry. Never carries the password.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub level: AccessLevel,
}

/// The account seeded on first run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "123456".to_string(),
        }
    }
}

/// How a credential load was satisfied.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Read from an existing, valid file
    Loaded,
    /// No file existed; one was created with the bootstrap admin
    Seeded,
    /// The file was malformed; an in-memory bootstrap admin is in use and the
    /// file was left untouched
    Recovered { reason: String },
}
