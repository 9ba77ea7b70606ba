//! Shared setup for the integration tests.

#![allow(dead_code)]

use std::{path::Path, sync::Arc};

use tempfile::TempDir;
use trade_manual::{
    Clock, Portal, PortalConfig, Session,
    access::AccessLevel,
    credentials::{BootstrapAdmin, CredentialStore, PasswordStorage},
};

pub const ADMIN_PASSWORD: &str = "123456";

/// 2024-10-21T03:55:31Z. Uploads get the suffix `482931`.
pub const UPLOAD_TIME_MILLIS: u64 = 1_729_482_931_000;

/// Clock pinned to one instant.
#[derive(Debug)]
pub struct StaticClock(pub u64);

impl Clock for StaticClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

pub fn plaintext_config(dir: &Path) -> PortalConfig {
    PortalConfig {
        password_storage: PasswordStorage::Plaintext,
        ..PortalConfig::in_dir(dir)
    }
}

/// A portal over a fresh temp directory using plaintext passwords.
///
/// The `TempDir` must outlive the portal.
pub async fn setup_portal() -> (TempDir, Portal) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let portal = open_portal(dir.path()).await;
    (dir, portal)
}

pub async fn open_portal(dir: &Path) -> Portal {
    Portal::open_with_clock(
        plaintext_config(dir),
        Arc::new(StaticClock(UPLOAD_TIME_MILLIS)),
    )
    .await
    .expect("Failed to open portal")
}

pub async fn open_store(path: &Path) -> CredentialStore {
    CredentialStore::open(path, BootstrapAdmin::default(), PasswordStorage::Plaintext)
        .await
        .expect("Failed to open credential store")
}

/// Log in as the bootstrap admin.
pub async fn admin_session(portal: &mut Portal) -> Session {
    let mut session = Session::new();
    portal
        .login(&mut session, "admin", ADMIN_PASSWORD)
        .await
        .expect("Admin login failed");
    session
}

/// Register a user at `level` (via the admin) and log them in.
pub async fn session_at(portal: &mut Portal, username: &str, level: AccessLevel) -> Session {
    if level == AccessLevel::Admin {
        return admin_session(portal).await;
    }

    let admin = admin_session(portal).await;
    portal
        .register_user(&admin, username, "senha", level)
        .await
        .expect("Failed to register user");

    let mut session = Session::new();
    portal
        .login(&mut session, username, "senha")
        .await
        .expect("Failed to login user");
    session
}

/// Drop a file into a directory, bypassing the registry.
pub fn place_file(dir: &Path, file_name: &str, contents: &[u8]) {
    std::fs::write(dir.join(file_name), contents).expect("Failed to write file");
}
