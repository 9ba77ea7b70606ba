//! Credential store
//!
//! Accounts live in a single JSON file mapping username to
//! `{"password": ..., "level": ...}`. The file is the source of truth: it is
//! reloaded before every login and every registration, and rewritten in full
//! after every registration.
//!
//! On first run the file is created with a bootstrap admin account. If the
//! file exists but cannot be parsed, the store falls back to an in-memory
//! bootstrap admin and leaves the file untouched, so an operator can inspect
//! and repair it. The failure is logged and kept as [`CredentialStore::load_warning`].
//! While it is set, registration and [`CredentialStore::save`] are refused so
//! the accounts in the damaged file are never overwritten by the fallback.
//!
//! There is no file locking. Within one process callers serialize access
//! through `&mut self`; separate processes writing the same file race.

pub mod crypto;
mod errors;
mod types;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use crypto::PasswordStorage;
pub use errors::CredentialError;
pub use types::{BootstrapAdmin, CredentialMap, LoadOutcome, UserRecord, UserSummary};

use crate::{Result, access::AccessLevel};

/// File-backed username → account mapping.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    admin: BootstrapAdmin,
    storage: PasswordStorage,
    users: CredentialMap,
    load_warning: Option<String>,
}

impl CredentialStore {
    /// Open the store at `path`, seeding the bootstrap admin if the file is absent.
    pub async fn open(
        path: impl Into<PathBuf>,
        admin: BootstrapAdmin,
        storage: PasswordStorage,
    ) -> Result<Self> {
        let mut store = Self {
            path: path.into(),
            admin,
            storage,
            users: CredentialMap::new(),
            load_warning: None,
        };
        store.reload().await?;
        Ok(store)
    }

    /// Re-read the credential file, replacing the in-memory mapping.
    pub async fn reload(&mut self) -> Result<LoadOutcome> {
        let (users, outcome) = load(&self.path, &self.admin, self.storage).await?;
        self.users = users;
        self.load_warning = match &outcome {
            LoadOutcome::Recovered { reason } => Some(reason.clone()),
            _ => None,
        };
        Ok(outcome)
    }

    /// Write the current mapping back to disk.
    ///
    /// Fails with [`CredentialError::FileNeedsRepair`] while the store is on
    /// the in-memory fallback.
    pub async fn save(&self) -> Result<()> {
        self.ensure_writable()?;
        save(&self.path, &self.users).await
    }

    fn ensure_writable(&self) -> Result<()> {
        match &self.load_warning {
            Some(reason) => Err(CredentialError::FileNeedsRepair {
                reason: reason.clone(),
            }
            .into()),
            None => Ok(()),
        }
    }

    /// Check a username/password pair and return the account level.
    ///
    /// The file is reloaded first so accounts registered by another process
    /// are visible.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<AccessLevel> {
        self.reload().await?;

        match self.users.get(username) {
            Some(record) if crypto::verify_password(password, &record.password) => {
                tracing::info!(username, level = record.level.value(), "Login succeeded");
                Ok(record.level)
            }
            _ => {
                tracing::info!(username, "Login rejected");
                Err(CredentialError::InvalidCredentials.into())
            }
        }
    }

    /// Create a new account and persist it immediately.
    ///
    /// The username is trimmed and lowercased. Checks run in order: empty
    /// fields, an unreadable credential file, duplicate username, then the
    /// admin restriction.
    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        level: AccessLevel,
    ) -> Result<UserSummary> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Err(CredentialError::EmptyField { field: "username" }.into());
        }
        if password.is_empty() {
            return Err(CredentialError::EmptyField { field: "password" }.into());
        }

        self.reload().await?;
        self.ensure_writable()?;

        if self.users.contains_key(&username) {
            return Err(CredentialError::DuplicateUser { username }.into());
        }
        if level == AccessLevel::Admin && username != self.admin.username {
            return Err(CredentialError::PrivilegeRestricted { username }.into());
        }

        let record = UserRecord {
            password: self.storage.encode(password)?,
            level,
        };
        self.users.insert(username.clone(), record);
        if let Err(e) = self.save().await {
            self.users.remove(&username);
            return Err(e);
        }

        tracing::info!(username = %username, level = level.value(), "Registered user");
        Ok(UserSummary { username, level })
    }

    /// All accounts, sorted by username, without passwords.
    pub fn users(&self) -> Vec<UserSummary> {
        self.users
            .iter()
            .map(|(username, record)| UserSummary {
                username: username.clone(),
                level: record.level,
            })
            .collect()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// Description of the last load failure, if the store is running on the
    /// in-memory fallback.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn bootstrap_map(admin: &BootstrapAdmin, password: String) -> CredentialMap {
    let mut users = CredentialMap::new();
    users.insert(
        admin.username.clone(),
        UserRecord {
            password,
            level: AccessLevel::Admin,
        },
    );
    users
}

/// Load the credential mapping from `path`.
///
/// A missing file is created with the bootstrap admin. A malformed file is
/// reported through [`LoadOutcome::Recovered`] and an unsaved bootstrap
/// mapping is returned in its place. Any other read failure is an error.
pub async fn load(
    path: &Path,
    admin: &BootstrapAdmin,
    storage: PasswordStorage,
) -> Result<(CredentialMap, LoadOutcome)> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => match serde_json::from_str::<CredentialMap>(&json) {
            Ok(users) => {
                tracing::debug!(path = %path.display(), users = users.len(), "Loaded credentials");
                Ok((users, LoadOutcome::Loaded))
            }
            Err(source) => {
                let err = CredentialError::MalformedFile {
                    path: path.display().to_string(),
                    source,
                };
                tracing::warn!("{err}. Using in-memory bootstrap admin; file left unchanged");
                let users = bootstrap_map(admin, admin.password.clone());
                Ok((
                    users,
                    LoadOutcome::Recovered {
                        reason: err.to_string(),
                    },
                ))
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let users = bootstrap_map(admin, storage.encode(&admin.password)?);
            save(path, &users).await?;
            tracing::info!(
                path = %path.display(),
                admin = %admin.username,
                "Created credential file with bootstrap admin"
            );
            Ok((users, LoadOutcome::Seeded))
        }
        Err(source) => Err(CredentialError::FileIo {
            path: path.display().to_string(),
            source,
        }
        .into()),
    }
}

/// Write `users` to `path` as 4-space indented JSON.
///
/// The data goes to a sibling temp file first and is renamed into place, so
/// a crash mid-write leaves either the old or the new file.
pub async fn save(path: &Path, users: &CredentialMap) -> Result<()> {
    let io_err = |source: std::io::Error| -> crate::Error {
        CredentialError::FileIo {
            path: path.display().to_string(),
            source,
        }
        .into()
    };

    let mut json = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
    users
        .serialize(&mut serializer)
        .map_err(|source| CredentialError::Serialization { source })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "users.json".to_string());
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    tokio::fs::write(&tmp_path, &json).await.map_err(io_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(io_err)
}
