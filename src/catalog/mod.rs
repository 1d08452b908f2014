pub mod error;
pub mod gate;
pub mod registry;
pub mod sanitize;
pub mod storage;

use std::path::PathBuf;

use axum::body::Bytes;
use futures::Stream;
use tracing::{error, info, warn};

pub use error::{CatalogError, CatalogResult};
pub use gate::{AccessState, AdminCredentials};
pub use registry::SubjectRegistry;
pub use storage::{ALLOWED_EXTENSIONS, FileEntry, StorageMirror};

/// Subject registry and storage tree kept in step.
///
/// Mutations take the caller's [`AccessState`] and refuse anonymous callers.
/// When the storage step fails after the registry step succeeded, the
/// registry change is rolled back; if the rollback fails too the result is
/// [`CatalogError::Inconsistent`].
#[derive(Clone)]
pub struct Catalog {
    registry: SubjectRegistry,
    storage: StorageMirror,
}

impl Catalog {
    pub fn new(registry_path: impl Into<PathBuf>, upload_root: impl Into<PathBuf>) -> Self {
        Self {
            registry: SubjectRegistry::new(registry_path),
            storage: StorageMirror::new(upload_root),
        }
    }

    pub fn registry(&self) -> &SubjectRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &StorageMirror {
        &self.storage
    }

    pub async fn bootstrap(&self) -> CatalogResult<()> {
        self.storage.ensure_root().await?;
        self.registry.ensure_document().await
    }

    pub async fn subjects(&self) -> CatalogResult<Vec<String>> {
        self.registry.list().await
    }

    pub async fn files(&self, subject: &str) -> CatalogResult<Vec<FileEntry>> {
        self.storage.list_files(subject).await
    }

    pub async fn create_subject(&self, access: AccessState, name: &str) -> CatalogResult<String> {
        access.require_admin()?;

        let name = self.registry.add(name).await?;
        if let Err(err) = self.storage.ensure_directory(&name).await {
            warn!(?err, subject = %name, "directory creation failed, rolling back registry entry");
            if let Err(rollback_err) = self.registry.remove(&name).await {
                error!(?rollback_err, subject = %name, "failed to roll back subject creation");
                return Err(CatalogError::Inconsistent(format!(
                    "subject `{name}` is registered without a directory"
                )));
            }
            return Err(err);
        }

        info!(subject = %name, "subject created");
        Ok(name)
    }

    pub async fn rename_subject(
        &self,
        access: AccessState,
        old_name: &str,
        new_name: &str,
    ) -> CatalogResult<String> {
        access.require_admin()?;

        let new_name = self.registry.rename(old_name, new_name).await?;
        if let Err(err) = self.storage.rename_directory(old_name, &new_name).await {
            warn!(?err, from = %old_name, to = %new_name, "directory rename failed, restoring registry name");
            if let Err(rollback_err) = self.registry.rename(&new_name, old_name).await {
                error!(?rollback_err, from = %old_name, to = %new_name, "failed to roll back subject rename");
                return Err(CatalogError::Inconsistent(format!(
                    "subject renamed to `{new_name}` but its files remain under `{old_name}`"
                )));
            }
            return Err(err);
        }

        info!(from = %old_name, to = %new_name, "subject renamed");
        Ok(new_name)
    }

    /// Deletes the directory first so a blocked removal keeps the subject
    /// registered and the delete can be retried.
    pub async fn delete_subject(&self, access: AccessState, name: &str) -> CatalogResult<bool> {
        access.require_admin()?;

        if !self.registry.contains(name).await? {
            return Ok(false);
        }
        self.storage.delete_directory(name).await?;
        if let Err(err) = self.registry.remove(name).await {
            error!(?err, subject = %name, "directory removed but registry entry remains");
            return Err(CatalogError::Inconsistent(format!(
                "subject `{name}` is registered without a directory"
            )));
        }

        info!(subject = %name, "subject deleted");
        Ok(true)
    }

    pub async fn upload_file<S, E>(
        &self,
        access: AccessState,
        subject: &str,
        uploaded_name: &str,
        content: S,
    ) -> CatalogResult<String>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        access.require_admin()?;

        if !self.registry.contains(subject).await? {
            return Err(CatalogError::NotFound(subject.to_string()));
        }
        self.storage.store_file(subject, uploaded_name, content).await
    }

    pub async fn delete_file(
        &self,
        access: AccessState,
        subject: &str,
        filename: &str,
    ) -> CatalogResult<bool> {
        access.require_admin()?;
        self.storage.delete_file(subject, filename).await
    }
}
