use trade_manual::{Portal, Session, access::AccessLevel};

use crate::helpers::{ADMIN_PASSWORD, open_portal, session_at, setup_portal};

#[tokio::test]
async fn test_login_sets_level_and_logout_resets() {
    let (_dir, mut portal) = setup_portal().await;
    let mut session = Session::new();

    let level = portal
        .login(&mut session, "admin", ADMIN_PASSWORD)
        .await
        .unwrap();
    assert_eq!(level, AccessLevel::Admin);
    assert!(session.is_authenticated());
    assert_eq!(session.username(), Some("admin"));

    portal.search(&mut session, "nota").unwrap();
    portal.logout(&mut session);

    assert!(!session.is_authenticated());
    assert_eq!(session.level(), None);
    assert_eq!(session.search_query(), "");
    assert_eq!(session.selected_document(), None);
}

#[tokio::test]
async fn test_invalid_login_does_not_authenticate() {
    let (_dir, mut portal) = setup_portal().await;
    let mut session = Session::new();

    let err = portal
        .login(&mut session, "admin", "000000")
        .await
        .unwrap_err();
    assert!(err.is_authentication_error());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let (_dir, mut portal) = setup_portal().await;
    let mut admin = session_at(&mut portal, "admin", AccessLevel::Admin).await;
    let viewer = session_at(&mut portal, "ana", AccessLevel::View).await;

    portal.logout(&mut admin);
    assert!(viewer.is_authenticated());
    assert_eq!(viewer.level(), Some(AccessLevel::View));
}

#[tokio::test]
async fn test_state_survives_reopen_but_sessions_do_not() {
    let (dir, mut portal) = setup_portal().await;
    let admin = session_at(&mut portal, "admin", AccessLevel::Admin).await;
    portal
        .register_user(&admin, "ana", "x", AccessLevel::Upload)
        .await
        .unwrap();
    portal
        .upload_document(&admin, b"%PDF", "Nota")
        .await
        .unwrap();
    drop(portal);

    let mut reopened: Portal = open_portal(dir.path()).await;
    assert_eq!(reopened.registry().documents().len(), 1);

    let mut session = Session::new();
    let level = reopened.login(&mut session, "ana", "x").await.unwrap();
    assert_eq!(level, AccessLevel::Upload);
}
