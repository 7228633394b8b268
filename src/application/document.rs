use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::{info, warn};

use crate::domain::Bookkeeping;
use crate::storage::{DocumentSeed, Repository};

use super::ServiceError;

/// An open bookkeeping document: one SQLite file holding one period.
///
/// Owned by a single session; all service operations take it by reference.
pub struct Document {
    path: PathBuf,
    repo: Repository,
    /// Invoice ids handed out by `suggest_new_invoice_id` but not stored yet
    reserved_invoice_ids: Mutex<BTreeSet<String>>,
}

impl Document {
    /// Create a new document file holding the given bookkeeping settings.
    pub async fn create(
        path: impl AsRef<Path>,
        bookkeeping: &Bookkeeping,
    ) -> Result<Self, ServiceError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(ServiceError::validation(format!(
                "Document already exists: {}",
                path.display()
            )));
        }

        let repo = Repository::init(&database_url(&path, true)).await?;
        repo.save_bookkeeping(bookkeeping).await?;
        info!(path = %path.display(), description = %bookkeeping.description, "created document");
        Ok(Self::from_parts(path, repo))
    }

    /// Open an existing document file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ServiceError::not_found(
                "Document",
                path.display().to_string(),
            ));
        }

        let repo = Repository::connect(&database_url(&path, false)).await?;
        repo.migrate().await?;
        Ok(Self::from_parts(path, repo))
    }

    /// Build a complete document from a seed. The file only appears at `path`
    /// once it has been fully written; on failure nothing is left behind.
    /// The document is first written next to `path` with a `tmp` extension;
    /// an existing file there is never overwritten.
    pub(crate) async fn create_from_seed(
        path: impl AsRef<Path>,
        seed: &DocumentSeed,
    ) -> Result<Self, ServiceError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(ServiceError::validation(format!(
                "Document already exists: {}",
                path.display()
            )));
        }

        let tmp_path = path.with_extension("tmp");
        if tmp_path.exists() {
            return Err(ServiceError::validation(format!(
                "Temporary file {} is in the way; move or remove it first",
                tmp_path.display()
            )));
        }

        let repo = Repository::init(&database_url(&tmp_path, true)).await?;
        let seeded = repo.seed(seed).await;
        repo.close().await;

        if let Err(err) = seeded {
            if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
                warn!(path = %tmp_path.display(), error = %cleanup, "failed to remove partial document");
            }
            return Err(err.into());
        }

        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to move document into {}", path.display()))?;
        Self::open(&path).await
    }

    fn from_parts(path: PathBuf, repo: Repository) -> Self {
        Self {
            path,
            repo,
            reserved_invoice_ids: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the underlying connections.
    pub async fn close(self) {
        self.repo.close().await;
    }

    /// Close the document and delete its file.
    pub(crate) async fn discard(self) -> Result<(), ServiceError> {
        let path = self.path.clone();
        self.close().await;
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        info!(path = %path.display(), "discarded document");
        Ok(())
    }

    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Bookkeeping settings, failing when the document no longer accepts changes.
    pub(crate) async fn ensure_open(&self) -> Result<Bookkeeping, ServiceError> {
        let bookkeeping = self.repo.get_bookkeeping().await?;
        if bookkeeping.closed {
            return Err(ServiceError::validation(format!(
                "Bookkeeping '{}' is closed and cannot be modified",
                bookkeeping.description
            )));
        }
        Ok(bookkeeping)
    }

    pub(crate) fn reserved_invoice_ids(&self) -> BTreeSet<String> {
        self.reserved_invoice_ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn reserve_invoice_id(&self, id: &str) {
        self.reserved_invoice_ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.to_string());
    }
}

fn database_url(path: &Path, create: bool) -> String {
    if create {
        format!("sqlite:{}?mode=rwc", path.display())
    } else {
        format!("sqlite:{}", path.display())
    }
}
