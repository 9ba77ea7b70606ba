use std::fs;

use serde_json::Value;
use tempfile::TempDir;
use trade_manual::{
    access::AccessLevel,
    credentials::{self, BootstrapAdmin, CredentialStore, LoadOutcome, PasswordStorage},
};

use crate::helpers::{ADMIN_PASSWORD, open_store};

#[tokio::test]
async fn test_first_run_seeds_admin_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    let store = open_store(&path).await;
    assert!(store.load_warning().is_none());

    let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"admin": {"password": ADMIN_PASSWORD, "level": 3}})
    );

    let users = store.users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "admin");
    assert_eq!(users[0].level, AccessLevel::Admin);
}

#[tokio::test]
async fn test_load_reports_outcome() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    let admin = BootstrapAdmin::default();

    let (_, outcome) = credentials::load(&path, &admin, PasswordStorage::Plaintext)
        .await
        .unwrap();
    assert!(matches!(outcome, LoadOutcome::Seeded));

    let (users, outcome) = credentials::load(&path, &admin, PasswordStorage::Plaintext)
        .await
        .unwrap();
    assert!(matches!(outcome, LoadOutcome::Loaded));
    assert!(users.contains_key("admin"));
}

#[tokio::test]
async fn test_file_is_written_with_four_space_indent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    open_store(&path).await;

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("\n    \"admin\": {\n        \"password\""));
}

#[tokio::test]
async fn test_malformed_file_falls_back_without_repair() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    fs::write(&path, "{not json").unwrap();

    let mut store = open_store(&path).await;
    let warning = store.load_warning().expect("Malformed file should be reported");
    assert!(warning.contains("Malformed credential file"));

    // The fallback admin works for this process
    let level = store.authenticate("admin", ADMIN_PASSWORD).await.unwrap();
    assert_eq!(level, AccessLevel::Admin);

    // But the broken file is left for an operator to inspect
    assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
}

#[tokio::test]
async fn test_registration_refused_while_file_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    // Trailing comma: readable by an operator, rejected by the parser
    let damaged = r#"{
    "admin": {"password": "123456", "level": 3},
    "ana": {"password": "a1", "level": 1},
    "bob": {"password": "b2", "level": 2},
}"#;
    fs::write(&path, damaged).unwrap();

    let mut store = open_store(&path).await;
    assert!(store.load_warning().is_some());

    let err = store
        .register("carla", "c2", AccessLevel::View)
        .await
        .unwrap_err();
    match err {
        trade_manual::Error::Credential(ref cred_err) => assert!(cred_err.needs_repair()),
        other => panic!("Unexpected error: {other:?}"),
    }
    assert!(store.save().await.is_err());
    assert!(!store.contains("carla"));

    // The accounts on disk survive untouched
    assert_eq!(fs::read_to_string(&path).unwrap(), damaged);

    // Once repaired, registration works against the real accounts
    fs::write(&path, damaged.replace("},\n}", "}\n}")).unwrap();
    store.register("carla", "c2", AccessLevel::View).await.unwrap();
    assert!(store.load_warning().is_none());
    assert!(store.contains("ana"));
    assert!(store.contains("bob"));
    assert!(store.contains("carla"));
}

#[tokio::test]
async fn test_out_of_range_level_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    fs::write(&path, r#"{"ana": {"password": "x", "level": 7}}"#).unwrap();

    let store = open_store(&path).await;
    assert!(store.load_warning().is_some());
    assert!(!store.contains("ana"));
    assert!(store.contains("admin"));
}

#[tokio::test]
async fn test_existing_file_is_not_reseeded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    fs::write(&path, r#"{"ana": {"password": "x", "level": 1}}"#).unwrap();

    let store = open_store(&path).await;
    assert!(store.load_warning().is_none());
    assert!(store.contains("ana"));
    assert!(!store.contains("admin"));
}

#[tokio::test]
async fn test_registration_is_persisted_immediately() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    let mut store = open_store(&path).await;
    store
        .register("Maria", "segredo", AccessLevel::Upload)
        .await
        .unwrap();

    let mut reopened = open_store(&path).await;
    let level = reopened.authenticate("maria", "segredo").await.unwrap();
    assert_eq!(level, AccessLevel::Upload);
}

#[tokio::test]
async fn test_other_writers_are_seen_on_login() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    let mut first = open_store(&path).await;
    let mut second = open_store(&path).await;
    second
        .register("joao", "abc", AccessLevel::View)
        .await
        .unwrap();

    assert!(!first.contains("joao"));
    assert_eq!(
        first.authenticate("joao", "abc").await.unwrap(),
        AccessLevel::View
    );
}

#[tokio::test]
async fn test_argon2_storage_hashes_new_passwords() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");

    let mut store = CredentialStore::open(&path, BootstrapAdmin::default(), PasswordStorage::Argon2)
        .await
        .unwrap();
    store
        .register("maria", "segredo", AccessLevel::Upload)
        .await
        .unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("segredo"));
    assert!(!contents.contains(ADMIN_PASSWORD));
    assert!(contents.contains("$argon2"));

    assert_eq!(
        store.authenticate("maria", "segredo").await.unwrap(),
        AccessLevel::Upload
    );
    assert_eq!(
        store.authenticate("admin", ADMIN_PASSWORD).await.unwrap(),
        AccessLevel::Admin
    );
    assert!(store.authenticate("maria", "SEGREDO").await.is_err());
}

#[tokio::test]
async fn test_argon2_storage_accepts_legacy_plaintext_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    fs::write(
        &path,
        r#"{"admin": {"password": "123456", "level": 3}, "ana": {"password": "x", "level": 1}}"#,
    )
    .unwrap();

    let mut store = CredentialStore::open(&path, BootstrapAdmin::default(), PasswordStorage::Argon2)
        .await
        .unwrap();
    assert_eq!(
        store.authenticate("ana", "x").await.unwrap(),
        AccessLevel::View
    );
}
