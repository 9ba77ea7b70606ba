//! Access control for the portal.
//!
//! Every session carries one [`AccessLevel`]. Levels are strictly ordered and
//! each level includes the capabilities of the ones below it:
//!
//! | Level | Name     | Capabilities                         |
//! |-------|----------|--------------------------------------|
//! | 1     | `View`   | search, list and view documents      |
//! | 2     | `Upload` | everything above, plus upload        |
//! | 3     | `Admin`  | everything above, delete, new users  |
//!
//! The check itself is [`allows`], a total function over integers, so it can
//! be applied to raw levels read from the credential file before they are
//! validated.

mod errors;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use errors::AccessError;

/// Returns true if a session at `session_level` may perform an operation that
/// requires `required_level`.
///
/// ```
/// use trade_manual::access::allows;
///
/// assert!(allows(3, 2));
/// assert!(!allows(1, 2));
/// ```
pub fn allows(session_level: i64, required_level: i64) -> bool {
    session_level >= required_level
}

/// Access tier of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AccessLevel {
    /// Search and view documents
    View = 1,
    /// View plus upload new documents
    Upload = 2,
    /// Upload plus delete documents and register users
    Admin = 3,
}

impl AccessLevel {
    /// All levels, lowest first.
    pub const ALL: [AccessLevel; 3] = [AccessLevel::View, AccessLevel::Upload, AccessLevel::Admin];

    /// Numeric value as stored in the credential file.
    pub fn value(self) -> i64 {
        self as i64
    }

    /// Parse a stored numeric level.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(AccessLevel::View),
            2 => Some(AccessLevel::Upload),
            3 => Some(AccessLevel::Admin),
            _ => None,
        }
    }

    /// Whether this level satisfies `required`.
    pub fn allows(self, required: AccessLevel) -> bool {
        allows(self.value(), required.value())
    }

    /// Human-readable label used in forms and listings.
    pub fn label(self) -> &'static str {
        match self {
            AccessLevel::View => "View",
            AccessLevel::Upload => "Upload",
            AccessLevel::Admin => "Admin",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.value())
    }
}

impl TryFrom<i64> for AccessLevel {
    type Error = AccessError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        AccessLevel::from_value(value).ok_or(AccessError::UnknownLevel { value })
    }
}

impl From<AccessLevel> for i64 {
    fn from(level: AccessLevel) -> Self {
        level.value()
    }
}

/// Operations exposed at the portal boundary that are gated by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    View,
    Upload,
    Delete,
    ManageUsers,
}

impl Operation {
    /// Minimum level needed to perform this operation.
    pub fn required_level(self) -> AccessLevel {
        match self {
            Operation::Search | Operation::View => AccessLevel::View,
            Operation::Upload => AccessLevel::Upload,
            Operation::Delete | Operation::ManageUsers => AccessLevel::Admin,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::View => "view",
            Operation::Upload => "upload",
            Operation::Delete => "delete",
            Operation::ManageUsers => "manage users",
        }
    }
}

/// Check that an optional session level may perform `operation`.
///
/// `None` means the session is not logged in.
pub fn check(level: Option<AccessLevel>, operation: Operation) -> Result<(), AccessError> {
    let Some(level) = level else {
        return Err(AccessError::NotAuthenticated);
    };
    let required = operation.required_level();
    if level.allows(required) {
        Ok(())
    } else {
        Err(AccessError::InsufficientLevel {
            operation: operation.name(),
            required,
            actual: level,
        })
    }
}
