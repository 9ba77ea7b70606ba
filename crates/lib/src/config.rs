//! Portal configuration.
//!
//! Relative file locations are resolved against `data_dir`. The defaults
//! reproduce the layout of existing deployments: `users.json` and a `pdfs/`
//! folder next to each other in the working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::{BootstrapAdmin, PasswordStorage};

pub const DEFAULT_CREDENTIAL_FILE: &str = "users.json";
pub const DEFAULT_DOCUMENTS_DIR: &str = "pdfs";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Base directory for the credential file and document folder
    pub data_dir: PathBuf,

    pub credential_file: PathBuf,

    pub documents_dir: PathBuf,

    /// Account seeded when the credential file does not exist
    pub admin: BootstrapAdmin,

    /// Encoding for passwords written by registration and seeding
    pub password_storage: PasswordStorage,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            credential_file: PathBuf::from(DEFAULT_CREDENTIAL_FILE),
            documents_dir: PathBuf::from(DEFAULT_DOCUMENTS_DIR),
            admin: BootstrapAdmin::default(),
            password_storage: PasswordStorage::default(),
        }
    }
}

impl PortalConfig {
    /// Default layout rooted at `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn credential_path(&self) -> PathBuf {
        resolve(&self.data_dir, &self.credential_file)
    }

    pub fn documents_path(&self) -> PathBuf {
        resolve(&self.data_dir, &self.documents_dir)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
