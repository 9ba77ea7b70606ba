use tempfile::TempDir;
use trade_manual::{
    Error,
    access::AccessLevel,
    credentials::{CredentialError, CredentialStore},
};

use crate::helpers::{ADMIN_PASSWORD, open_store};

async fn store_in(dir: &TempDir) -> CredentialStore {
    open_store(&dir.path().join("users.json")).await
}

#[tokio::test]
async fn test_registered_users_authenticate_with_their_level() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir).await;

    let accounts = [
        ("ana", "a1", AccessLevel::View),
        ("bruno", "b2", AccessLevel::Upload),
        ("carla", "c3", AccessLevel::View),
    ];
    for (username, password, level) in accounts {
        store.register(username, password, level).await.unwrap();
    }

    for (username, password, level) in accounts {
        assert_eq!(store.authenticate(username, password).await.unwrap(), level);
        let err = store
            .authenticate(username, "not-the-password")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Credential(CredentialError::InvalidCredentials)
        ));
    }
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_look_the_same() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir).await;

    let unknown = store.authenticate("ghost", ADMIN_PASSWORD).await.unwrap_err();
    let wrong = store.authenticate("admin", "654321").await.unwrap_err();
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn test_password_compare_is_case_sensitive() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir).await;
    store
        .register("ana", "Segredo", AccessLevel::View)
        .await
        .unwrap();

    assert!(store.authenticate("ana", "segredo").await.is_err());
    assert!(store.authenticate("ana", "Segredo").await.is_ok());
}

#[tokio::test]
async fn test_username_is_lowercased_on_registration() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir).await;

    let summary = store
        .register("  MariaSilva ", "x", AccessLevel::View)
        .await
        .unwrap();
    assert_eq!(summary.username, "mariasilva");
    assert!(store.authenticate("mariasilva", "x").await.is_ok());
    // Login does not normalize
    assert!(store.authenticate("MariaSilva", "x").await.is_err());
}

#[tokio::test]
async fn test_duplicate_registration_always_fails() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir).await;
    store.register("ana", "x", AccessLevel::View).await.unwrap();

    for (username, password, level) in [
        ("ana", "x", AccessLevel::View),
        ("ANA", "other", AccessLevel::Upload),
        ("admin", "new", AccessLevel::Admin),
        ("admin", "new", AccessLevel::View),
    ] {
        let err = store.register(username, password, level).await.unwrap_err();
        assert!(err.is_conflict(), "{username} should be a duplicate: {err}");
    }

    // Original password still works
    assert!(store.authenticate("ana", "x").await.is_ok());
}

#[tokio::test]
async fn test_admin_level_is_restricted_to_bootstrap_name() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir).await;

    for username in ["root", "administrador", "admin2"] {
        let err = store
            .register(username, "x", AccessLevel::Admin)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Credential(CredentialError::PrivilegeRestricted { .. })
        ));
        assert!(!store.contains(username));
    }
}

#[tokio::test]
async fn test_admin_name_can_be_registered_at_top_level_when_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"{"ana": {"password": "x", "level": 1}}"#).unwrap();
    let mut store = open_store(&path).await;

    store
        .register("Admin", "novo", AccessLevel::Admin)
        .await
        .unwrap();
    assert_eq!(
        store.authenticate("admin", "novo").await.unwrap(),
        AccessLevel::Admin
    );
}

#[tokio::test]
async fn test_empty_fields_are_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir).await;

    let err = store.register("   ", "x", AccessLevel::View).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Credential(CredentialError::EmptyField { field: "username" })
    ));

    let err = store.register("ana", "", AccessLevel::View).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Credential(CredentialError::EmptyField { field: "password" })
    ));
    assert_eq!(store.users().len(), 1);
}
