use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    error::{CatalogError, CatalogResult},
    sanitize::{encode_segment, file_extension, is_plain_component, sanitize, sanitize_file_name},
};

/// Extensions accepted by [`StorageMirror::store_file`].
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "ppt", "pptx"];

const PARTIAL_UPLOAD_PREFIX: &str = ".upload-";

/// A stored document as shown on a subject page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub view_url: String,
    pub download_url: String,
    pub extension: String,
}

/// One directory per subject under a single upload root.
#[derive(Debug, Clone)]
pub struct StorageMirror {
    root: PathBuf,
}

impl StorageMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> CatalogResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn subject_dir(&self, subject: &str) -> PathBuf {
        self.root.join(sanitize(subject))
    }

    /// Path of an existing regular file, `None` when nothing is stored there.
    ///
    /// A name that is already a single visible path component is looked up as
    /// given, so files listed from disk resolve; anything else goes through
    /// [`sanitize_file_name`] first.
    pub async fn file_path(&self, subject: &str, filename: &str) -> CatalogResult<Option<PathBuf>> {
        let dir = self.subject_dir(subject);
        if is_plain_component(filename) {
            if let Some(path) = regular_file(dir.join(filename)).await? {
                return Ok(Some(path));
            }
        }
        regular_file(dir.join(sanitize_file_name(filename))).await
    }

    /// Regular files in the subject directory, sorted case-insensitively.
    pub async fn list_files(&self, subject: &str) -> CatalogResult<Vec<FileEntry>> {
        let safe_subject = sanitize(subject);
        let dir = self.root.join(&safe_subject);

        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(subject = %safe_subject, "skipping file with non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let (subject_segment, name_segment) =
                (encode_segment(&safe_subject), encode_segment(&name));
            entries.push(FileEntry {
                view_url: format!("/uploads/{subject_segment}/{name_segment}"),
                download_url: format!("/download/{subject_segment}/{name_segment}"),
                extension: file_extension(&name),
                name,
            });
        }

        entries.sort_by_key(|entry| entry.name.to_lowercase());
        Ok(entries)
    }

    pub async fn ensure_directory(&self, subject: &str) -> CatalogResult<PathBuf> {
        let dir = self.subject_dir(subject);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Moves the subject directory. Returns `false` when there was nothing to move.
    pub async fn rename_directory(&self, old_name: &str, new_name: &str) -> CatalogResult<bool> {
        let old_dir = self.subject_dir(old_name);
        let new_dir = self.subject_dir(new_name);

        if old_dir == new_dir || !tokio::fs::try_exists(&old_dir).await? {
            return Ok(false);
        }

        tokio::fs::rename(&old_dir, &new_dir).await?;
        info!(from = %old_dir.display(), to = %new_dir.display(), "renamed subject directory");
        Ok(true)
    }

    /// Deletes every regular file in the subject directory, then the directory.
    ///
    /// Nested directories are left alone and surface as
    /// [`CatalogError::DirectoryNotEmpty`].
    pub async fn delete_directory(&self, subject: &str) -> CatalogResult<bool> {
        let dir = self.subject_dir(subject);

        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = reader.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
            }
        }

        match tokio::fs::remove_dir(&dir).await {
            Ok(()) => {
                info!(dir = %dir.display(), "removed subject directory");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => {
                Err(CatalogError::DirectoryNotEmpty(dir.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Streams an upload into the subject directory under its sanitized name.
    ///
    /// Bytes land in a hidden partial file that is renamed into place once the
    /// stream ends, so a broken transfer never replaces an existing document.
    /// An existing file with the same sanitized name is overwritten.
    pub async fn store_file<S, E>(
        &self,
        subject: &str,
        uploaded_name: &str,
        content: S,
    ) -> CatalogResult<String>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let uploaded_name = uploaded_name.trim();
        if uploaded_name.is_empty() {
            return Err(CatalogError::EmptyFilename);
        }

        let extension = file_extension(uploaded_name);
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CatalogError::InvalidExtension(extension));
        }

        let stored_name = sanitize_file_name(uploaded_name);
        let dir = self.ensure_directory(subject).await?;
        let target = dir.join(&stored_name);
        let partial = dir.join(format!("{PARTIAL_UPLOAD_PREFIX}{}", Uuid::new_v4().simple()));

        match write_stream(&partial, content).await {
            Ok(total_bytes) => {
                if let Err(err) = tokio::fs::rename(&partial, &target).await {
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(err.into());
                }
                info!(file = %target.display(), total_bytes, "stored upload");
                Ok(stored_name)
            }
            Err(err) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(err)
            }
        }
    }

    /// Removes one stored file. Returns `false` when it did not exist.
    pub async fn delete_file(&self, subject: &str, filename: &str) -> CatalogResult<bool> {
        let Some(path) = self.file_path(subject, filename).await? else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(file = %path.display(), "deleted stored file");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

async fn regular_file(path: PathBuf) -> CatalogResult<Option<PathBuf>> {
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok(Some(path)),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn write_stream<S, E>(path: &Path, content: S) -> CatalogResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut content = std::pin::pin!(content);
    let mut file = File::create(path).await?;

    let mut total_bytes: u64 = 0;
    while let Some(chunk) = content.next().await {
        let chunk = chunk.map_err(|err| CatalogError::Upload(err.to_string()))?;
        total_bytes += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(total_bytes)
}
