//! Document registry
//!
//! The watched directory is the only record of which documents exist. There
//! is no metadata file: everything about a [`Document`] is derived from its
//! file name and file metadata at scan time.
//!
//! The in-memory listing is a snapshot of the directory. It is recomputed in
//! full after every mutation made through the registry, so once [`add`] or
//! [`remove`] returns the listing matches the disk. Changes made behind the
//! registry's back (files copied in or deleted by hand) show up on the next
//! [`rescan`].
//!
//! [`add`]: DocumentRegistry::add
//! [`remove`]: DocumentRegistry::remove
//! [`rescan`]: DocumentRegistry::rescan

mod errors;
pub mod naming;
mod search;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

pub use errors::DocumentError;
pub use search::search;

use crate::{Clock, Result};

/// One PDF file in the watched directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Label derived from the file name. Not unique.
    pub display_name: String,

    /// File name inside the directory; doubles as the storage key
    pub file_name: String,

    /// Location of the file. Unique.
    pub path: PathBuf,

    pub size_bytes: u64,

    /// Last modification time, when the platform reports one
    pub modified: Option<DateTime<Utc>>,
}

impl Document {
    fn from_metadata(path: PathBuf, file_name: String, metadata: &std::fs::Metadata) -> Self {
        Self {
            display_name: naming::display_name(&file_name),
            file_name,
            path,
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}

/// Scan `dir` and return its documents sorted by display name.
///
/// Ties are broken by path, so the same directory contents always give the
/// same listing.
pub async fn scan_directory(dir: &Path) -> Result<Vec<Document>> {
    let scan_err = |source: std::io::Error| -> crate::Error {
        DocumentError::ScanFailed {
            path: dir.display().to_string(),
            source,
        }
        .into()
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(scan_err)?;
    let mut documents = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let Ok(file_name) = entry.file_name().into_string() else {
            tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };
        if !naming::is_pdf(&file_name) {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            // Deleted between listing and stat
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(scan_err(e)),
        };
        if !metadata.is_file() {
            continue;
        }

        documents.push(Document::from_metadata(
            dir.join(&file_name),
            file_name,
            &metadata,
        ));
    }

    documents.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.path.cmp(&b.path))
    });

    tracing::debug!(dir = %dir.display(), count = documents.len(), "Scanned documents");
    Ok(documents)
}

/// Directory-backed listing of PDF documents.
#[derive(Debug)]
pub struct DocumentRegistry {
    dir: PathBuf,
    documents: Vec<Document>,
    clock: Arc<dyn Clock>,
}

impl DocumentRegistry {
    /// Open the registry over `dir`, creating the directory if needed, and scan it.
    pub async fn open(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| DocumentError::ScanFailed {
                path: dir.display().to_string(),
                source,
            })?;

        let mut registry = Self {
            dir,
            documents: Vec::new(),
            clock,
        };
        registry.rescan().await?;
        Ok(registry)
    }

    /// Replace the cached listing with a fresh scan of the directory.
    pub async fn rescan(&mut self) -> Result<&[Document]> {
        self.documents = scan_directory(&self.dir).await?;
        Ok(&self.documents)
    }

    /// The listing as of the last scan.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Look up a document in the cached listing.
    pub fn find(&self, path: &Path) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.path == path)
    }

    /// Check that `path` names a document that still exists on disk.
    ///
    /// Returns `None` for paths outside the registry directory and for files
    /// that have been deleted since the listing was taken.
    pub async fn resolve(&self, path: &Path) -> Option<Document> {
        let (path, file_name) = self.contained(path)?;

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Some(
                self.find(&path)
                    .cloned()
                    .unwrap_or_else(|| Document::from_metadata(path, file_name, &metadata)),
            ),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(path = %path.display(), "Document did not resolve: {e}");
                None
            }
        }
    }

    /// Read the bytes of a document.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let not_found = || -> crate::Error {
            DocumentError::NotFound {
                path: path.display().to_string(),
            }
            .into()
        };
        let (path, _) = self.contained(path).ok_or_else(not_found)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(source) => Err(DocumentError::ReadError {
                path: path.display().to_string(),
                source,
            }
            .into()),
        }
    }

    /// Store `bytes` as a new document labelled `display_name`, then rescan.
    ///
    /// The file name is built from the label plus the last six digits of the
    /// current Unix time. Two uploads of the same label within one second
    /// collide; the second fails with [`DocumentError::WriteError`] rather
    /// than overwriting the first. A failed write is not cleaned up.
    pub async fn add(&mut self, bytes: &[u8], display_name: &str) -> Result<Document> {
        let base = naming::safe_base_name(display_name).ok_or_else(|| DocumentError::InvalidName {
            name: display_name.to_string(),
        })?;
        let file_name = naming::upload_file_name(&base, self.clock.now_secs());
        let path = self.dir.join(&file_name);

        write_new_file(&path, bytes)
            .await
            .map_err(|source| DocumentError::WriteError {
                path: path.display().to_string(),
                source,
            })?;

        self.rescan().await?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Stored document");

        self.find(&path).cloned().ok_or_else(|| {
            DocumentError::NotFound {
                path: path.display().to_string(),
            }
            .into()
        })
    }

    /// Delete a document's file, then rescan.
    ///
    /// The rescan happens whether or not the delete succeeded, so a document
    /// that was already gone drops out of the listing and the call still
    /// reports [`DocumentError::NotFound`].
    pub async fn remove(&mut self, path: &Path) -> Result<()> {
        let result = self.delete_file(path).await;
        let rescan = self.rescan().await.map(|_| ());

        match &result {
            Ok(()) => tracing::info!(path = %path.display(), "Removed document"),
            Err(e) => tracing::warn!(path = %path.display(), "Document removal failed: {e}"),
        }
        result.and(rescan)
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        let not_found = || -> crate::Error {
            DocumentError::NotFound {
                path: path.display().to_string(),
            }
            .into()
        };
        let (path, _) = self.contained(path).ok_or_else(not_found)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(source) => Err(DocumentError::DeleteError {
                path: path.display().to_string(),
                source,
            }
            .into()),
        }
    }

    /// Normalize `path` to `dir/<file_name>` if it names a PDF directly
    /// inside the registry directory.
    fn contained(&self, path: &Path) -> Option<(PathBuf, String)> {
        let file_name = path.file_name()?.to_str()?;
        if !naming::is_pdf(file_name) || path.parent()? != self.dir.as_path() {
            return None;
        }
        Some((self.dir.join(file_name), file_name.to_string()))
    }
}

async fn write_new_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}
