//! Per-session state
//!
//! A [`Session`] belongs to one interactive user. It records whether they are
//! logged in, at which level, what they last searched for and which document
//! they have open. It owns no document data: the selection is only a path
//! into the registry and is re-validated whenever it is used.
//!
//! Sessions are not persisted; a process restart logs everyone out.

use std::path::{Path, PathBuf};

use crate::access::{self, AccessError, AccessLevel, Operation};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
    level: Option<AccessLevel>,
    selected_document: Option<PathBuf>,
    search_query: String,
}

impl Session {
    /// A logged-out session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.level.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn level(&self) -> Option<AccessLevel> {
        self.level
    }

    pub fn selected_document(&self) -> Option<&Path> {
        self.selected_document.as_deref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Check whether this session may perform `operation`.
    pub fn check(&self, operation: Operation) -> Result<(), AccessError> {
        access::check(self.level, operation)
    }

    pub fn can(&self, operation: Operation) -> bool {
        self.check(operation).is_ok()
    }

    /// Return to the logged-out state, dropping selection and search.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn sign_in(&mut self, username: &str, level: AccessLevel) {
        *self = Self {
            username: Some(username.to_string()),
            level: Some(level),
            ..Self::default()
        };
    }

    pub(crate) fn select(&mut self, path: PathBuf) {
        self.selected_document = Some(path);
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_document = None;
    }

    pub(crate) fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }
}
