use trade_manual::{Error, access::AccessLevel, documents::DocumentError};

use crate::helpers::{place_file, session_at, setup_portal};

#[tokio::test]
async fn test_search_filters_by_display_name() {
    let (dir, mut portal) = setup_portal().await;
    let pdfs = dir.path().join("pdfs");
    place_file(&pdfs, "manual_de_vendas_000001.pdf", b"%PDF");
    place_file(&pdfs, "treinamento_manual.pdf", b"%PDF");
    place_file(&pdfs, "contrato.pdf", b"%PDF");
    portal.reload_documents().await.unwrap();

    let mut session = session_at(&mut portal, "ana", AccessLevel::View).await;

    let hits: Vec<_> = portal
        .search(&mut session, "Manual")
        .unwrap()
        .into_iter()
        .map(|d| d.display_name)
        .collect();
    assert_eq!(hits, vec!["Manual De Vendas", "Treinamento Manual"]);
    assert_eq!(session.search_query(), "Manual");

    assert!(portal.search(&mut session, "").unwrap().is_empty());
    assert!(portal.search(&mut session, "  ").unwrap().is_empty());
    assert_eq!(portal.documents(&session).unwrap().len(), 3);
}

#[tokio::test]
async fn test_select_and_read_document() {
    let (_dir, mut portal) = setup_portal().await;
    let mut admin = session_at(&mut portal, "admin", AccessLevel::Admin).await;
    let doc = portal
        .upload_document(&admin, b"%PDF-1.4 nota", "Nota")
        .await
        .unwrap();

    let selected = portal
        .select_document(&mut admin, Some(doc.path.as_path()))
        .await
        .unwrap();
    assert_eq!(selected.as_ref(), Some(&doc));

    let (read_doc, bytes) = portal.read_selected(&mut admin).await.unwrap().unwrap();
    assert_eq!(read_doc, doc);
    assert_eq!(bytes, b"%PDF-1.4 nota");

    // Going back to the menu clears the selection
    assert_eq!(portal.select_document(&mut admin, None).await.unwrap(), None);
    assert!(portal.read_selected(&mut admin).await.unwrap().is_none());
}

#[tokio::test]
async fn test_select_vanished_document_clears_selection() {
    let (_dir, mut portal) = setup_portal().await;
    let mut admin = session_at(&mut portal, "admin", AccessLevel::Admin).await;
    let keep = portal
        .upload_document(&admin, b"%PDF", "Manter")
        .await
        .unwrap();
    let gone = portal
        .upload_document(&admin, b"%PDF", "Sumir")
        .await
        .unwrap();

    portal
        .select_document(&mut admin, Some(keep.path.as_path()))
        .await
        .unwrap();

    // Another session deletes the file between listing and selection
    std::fs::remove_file(&gone.path).unwrap();

    let err = portal
        .select_document(&mut admin, Some(gone.path.as_path()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Document(DocumentError::NotFound { .. })
    ));
    assert_eq!(admin.selected_document(), None);
}

#[tokio::test]
async fn test_read_selected_after_file_vanishes() {
    let (_dir, mut portal) = setup_portal().await;
    let mut admin = session_at(&mut portal, "admin", AccessLevel::Admin).await;
    let doc = portal
        .upload_document(&admin, b"%PDF", "Nota")
        .await
        .unwrap();
    portal
        .select_document(&mut admin, Some(doc.path.as_path()))
        .await
        .unwrap();

    std::fs::remove_file(&doc.path).unwrap();

    let err = portal.read_selected(&mut admin).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(admin.selected_document(), None);
}

#[tokio::test]
async fn test_delete_already_removed_document() {
    let (_dir, mut portal) = setup_portal().await;
    let mut admin = session_at(&mut portal, "admin", AccessLevel::Admin).await;
    let doc = portal
        .upload_document(&admin, b"%PDF", "Nota")
        .await
        .unwrap();
    std::fs::remove_file(&doc.path).unwrap();

    let err = portal
        .delete_document(&mut admin, &doc.path)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(portal.documents(&admin).unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_matches_disk_after_each_mutation() {
    let (dir, mut portal) = setup_portal().await;
    let mut admin = session_at(&mut portal, "admin", AccessLevel::Admin).await;

    let a = portal
        .upload_document(&admin, b"%PDF", "Alfa")
        .await
        .unwrap();
    // Placed by hand; picked up by the next mutation's rescan
    place_file(&dir.path().join("pdfs"), "beta.pdf", b"%PDF");
    let c = portal
        .upload_document(&admin, b"%PDF", "Gama")
        .await
        .unwrap();

    let names: Vec<_> = portal
        .documents(&admin)
        .unwrap()
        .iter()
        .map(|d| d.display_name.clone())
        .collect();
    assert_eq!(names, vec!["Alfa", "Beta", "Gama"]);

    portal.delete_document(&mut admin, &a.path).await.unwrap();
    portal.delete_document(&mut admin, &c.path).await.unwrap();
    let names: Vec<_> = portal
        .documents(&admin)
        .unwrap()
        .iter()
        .map(|d| d.display_name.clone())
        .collect();
    assert_eq!(names, vec!["Beta"]);
}
