//! The portal: application state plus the boundary operations.
//!
//! A front end holds one [`Portal`] and one [`Session`] per user, and calls
//! the methods here and nothing else:
//!
//! | Operation                         | Required level |
//! |-----------------------------------|----------------|
//! | [`login`](Portal::login)          | none           |
//! | [`logout`](Portal::logout)        | none           |
//! | [`search`](Portal::search)        | View           |
//! | [`documents`](Portal::documents)  | View           |
//! | [`select_document`](Portal::select_document) | View |
//! | [`upload_document`](Portal::upload_document) | Upload |
//! | [`delete_document`](Portal::delete_document) | Admin  |
//! | [`register_user`](Portal::register_user)     | Admin  |
//!
//! Mutating methods take `&mut self`. A front end serving several users at
//! once has to serialize them, e.g. behind one mutex.

use std::{path::Path, sync::Arc};

use crate::{
    Clock, Document, PortalConfig, Result, Session, SystemClock,
    access::{AccessLevel, Operation},
    credentials::{CredentialStore, UserSummary},
    documents::{self, DocumentError, DocumentRegistry},
};

#[derive(Debug)]
pub struct Portal {
    config: PortalConfig,
    credentials: CredentialStore,
    registry: DocumentRegistry,
}

impl Portal {
    /// Open the portal using system time.
    pub async fn open(config: PortalConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Open the portal with a custom time source for upload suffixes.
    ///
    /// Credentials are loaded (and seeded if absent) before the document
    /// directory is scanned.
    pub async fn open_with_clock(config: PortalConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let credentials = CredentialStore::open(
            config.credential_path(),
            config.admin.clone(),
            config.password_storage,
        )
        .await?;
        let registry = DocumentRegistry::open(config.documents_path(), clock).await?;

        tracing::info!(
            credentials = %credentials.path().display(),
            documents = %registry.dir().display(),
            count = registry.documents().len(),
            "Portal opened"
        );

        Ok(Self {
            config,
            credentials,
            registry,
        })
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    /// Authenticate and sign the session in.
    ///
    /// A failed attempt leaves the session logged out.
    pub async fn login(
        &mut self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<AccessLevel> {
        match self.credentials.authenticate(username, password).await {
            Ok(level) => {
                session.sign_in(username, level);
                Ok(level)
            }
            Err(e) => {
                session.reset();
                Err(e)
            }
        }
    }

    pub fn logout(&self, session: &mut Session) {
        if let Some(username) = session.username() {
            tracing::info!(username, "Logged out");
        }
        session.reset();
    }

    /// Documents whose display name contains `query`, ignoring case.
    ///
    /// The query is remembered on the session. A blank query returns nothing.
    pub fn search(&self, session: &mut Session, query: &str) -> Result<Vec<Document>> {
        session.check(Operation::Search)?;
        session.set_search_query(query);
        Ok(documents::search(query, self.registry.documents())
            .into_iter()
            .cloned()
            .collect())
    }

    /// The full listing.
    pub fn documents(&self, session: &Session) -> Result<&[Document]> {
        session.check(Operation::View)?;
        Ok(self.registry.documents())
    }

    /// Open a document for viewing, or close the current one with `None`.
    ///
    /// If the file has disappeared since it was listed, the selection is
    /// cleared and [`DocumentError::NotFound`] is returned.
    pub async fn select_document(
        &self,
        session: &mut Session,
        path: Option<&Path>,
    ) -> Result<Option<Document>> {
        session.check(Operation::View)?;

        let Some(path) = path else {
            session.clear_selection();
            return Ok(None);
        };

        match self.registry.resolve(path).await {
            Some(document) => {
                session.select(document.path.clone());
                Ok(Some(document))
            }
            None => {
                session.clear_selection();
                Err(DocumentError::NotFound {
                    path: path.display().to_string(),
                }
                .into())
            }
        }
    }

    /// The open document and its bytes.
    ///
    /// Clears the selection if the file has vanished.
    pub async fn read_selected(
        &self,
        session: &mut Session,
    ) -> Result<Option<(Document, Vec<u8>)>> {
        let Some(path) = session.selected_document().map(Path::to_path_buf) else {
            return Ok(None);
        };

        match self.read_document(session, &path).await {
            Ok(found) => Ok(Some(found)),
            Err(e) => {
                if e.is_not_found() {
                    session.clear_selection();
                }
                Err(e)
            }
        }
    }

    /// A document and its bytes, for viewing or download.
    pub async fn read_document(
        &self,
        session: &Session,
        path: &Path,
    ) -> Result<(Document, Vec<u8>)> {
        session.check(Operation::View)?;

        let document = self
            .registry
            .resolve(path)
            .await
            .ok_or_else(|| DocumentError::NotFound {
                path: path.display().to_string(),
            })?;
        let bytes = self.registry.read(&document.path).await?;
        Ok((document, bytes))
    }

    /// Store a new document. Requires [`AccessLevel::Upload`].
    pub async fn upload_document(
        &mut self,
        session: &Session,
        bytes: &[u8],
        name: &str,
    ) -> Result<Document> {
        session.check(Operation::Upload)?;
        let document = self.registry.add(bytes, name).await?;
        tracing::info!(
            username = session.username().unwrap_or_default(),
            document = %document.file_name,
            "Document uploaded"
        );
        Ok(document)
    }

    /// Delete a document. Requires [`AccessLevel::Admin`].
    ///
    /// The listing is rescanned even when the delete fails. A successful
    /// delete closes whatever document the session had open; a failed one
    /// only closes it if it was the document being deleted.
    pub async fn delete_document(&mut self, session: &mut Session, path: &Path) -> Result<()> {
        session.check(Operation::Delete)?;

        let result = self.registry.remove(path).await;
        if result.is_ok() || session.selected_document() == Some(path) {
            session.clear_selection();
        }

        if result.is_ok() {
            tracing::info!(
                username = session.username().unwrap_or_default(),
                path = %path.display(),
                "Document deleted"
            );
        }
        result
    }

    /// Create an account. Requires [`AccessLevel::Admin`].
    pub async fn register_user(
        &mut self,
        session: &Session,
        username: &str,
        password: &str,
        level: AccessLevel,
    ) -> Result<UserSummary> {
        session.check(Operation::ManageUsers)?;
        self.credentials.register(username, password, level).await
    }

    /// All accounts without passwords. Requires [`AccessLevel::Admin`].
    ///
    /// The credential file is reloaded first so accounts added by another
    /// process are listed.
    pub async fn users(&mut self, session: &Session) -> Result<Vec<UserSummary>> {
        session.check(Operation::ManageUsers)?;
        self.credentials.reload().await?;
        Ok(self.credentials.users())
    }

    /// Drop the cached listing and rescan the document directory.
    pub async fn reload_documents(&mut self) -> Result<()> {
        self.registry.rescan().await.map(|_| ())
    }
}
