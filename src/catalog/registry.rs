use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::info;
use uuid::Uuid;

use super::{
    error::{CatalogError, CatalogResult},
    sanitize::is_dot_only,
};

/// On-disk shape of the subject list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl RegistryDocument {
    fn position(&self, name: &str) -> Option<usize> {
        self.subjects.iter().position(|subject| subject == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

/// Ordered subject list persisted as a single JSON document.
///
/// Every call reloads the document from disk. Mutations hold an in-process
/// lock across the read-modify-write cycle; a second process writing the same
/// file can still lose updates.
#[derive(Clone)]
pub struct SubjectRegistry {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl SubjectRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the parent directory and an empty document when none exists.
    pub async fn ensure_document(&self) -> CatalogResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        self.save(&RegistryDocument::default()).await?;
        info!(path = %self.path.display(), "created empty subject registry");
        Ok(())
    }

    pub async fn load(&self) -> CatalogResult<RegistryDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(RegistryDocument::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list(&self) -> CatalogResult<Vec<String>> {
        Ok(self.load().await?.subjects)
    }

    pub async fn contains(&self, name: &str) -> CatalogResult<bool> {
        Ok(self.load().await?.contains(name))
    }

    /// Appends a subject, returning the trimmed name that was stored.
    pub async fn add(&self, name: &str) -> CatalogResult<String> {
        let name = validate_name(name)?;

        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        if document.contains(&name) {
            return Err(CatalogError::DuplicateSubject(name));
        }
        document.subjects.push(name.clone());
        self.save(&document).await?;
        Ok(name)
    }

    /// Replaces `old_name` in place, returning the trimmed new name.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> CatalogResult<String> {
        let new_name = validate_name(new_name)?;

        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        let Some(index) = document.position(old_name) else {
            return Err(CatalogError::NotFound(old_name.to_string()));
        };
        if document.contains(&new_name) {
            return Err(CatalogError::DuplicateSubject(new_name));
        }
        document.subjects[index] = new_name.clone();
        self.save(&document).await?;
        Ok(new_name)
    }

    /// Removes a subject. Returns `false` when it was not registered.
    pub async fn remove(&self, name: &str) -> CatalogResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        let Some(index) = document.position(name) else {
            return Ok(false);
        };
        document.subjects.remove(index);
        self.save(&document).await?;
        Ok(true)
    }

    /// Writes a sibling temp file and renames it over the document.
    async fn save(&self, document: &RegistryDocument) -> CatalogResult<()> {
        let payload = serde_json::to_vec_pretty(document)?;
        let tmp_path = self.path.with_extension(format!("json.{}.tmp", Uuid::new_v4().simple()));

        let write = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(&payload).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp_path, &self.path).await
        };

        if let Err(err) = write.await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> CatalogResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || is_dot_only(trimmed) {
        return Err(CatalogError::InvalidName);
    }
    Ok(trimmed.to_string())
}
