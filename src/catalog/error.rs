use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("subject name cannot be empty")]
    InvalidName,

    #[error("subject `{0}` already exists")]
    DuplicateSubject(String),

    #[error("`{0}` not found")]
    NotFound(String),

    #[error("file type `{0}` is not allowed")]
    InvalidExtension(String),

    #[error("no file selected")]
    EmptyFilename,

    #[error("admin session required")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("directory `{0}` still has entries that are not files")]
    DirectoryNotEmpty(String),

    #[error("registry and storage disagree after a failed step: {0}")]
    Inconsistent(String),

    #[error("upload stream failed: {0}")]
    Upload(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("registry document is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Short code carried in `?error=` for the admin flash banner.
    pub fn status_code(&self) -> &'static str {
        match self {
            CatalogError::InvalidName => "invalid_name",
            CatalogError::DuplicateSubject(_) => "duplicate_subject",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::InvalidExtension(_) => "invalid_extension",
            CatalogError::EmptyFilename => "empty_filename",
            CatalogError::Unauthorized => "not_authorized",
            CatalogError::InvalidCredentials => "invalid_credentials",
            CatalogError::DirectoryNotEmpty(_) => "directory_not_empty",
            CatalogError::Inconsistent(_) => "inconsistent",
            CatalogError::Upload(_) => "upload_failed",
            CatalogError::Io(_) | CatalogError::Json(_) => "unknown",
        }
    }

    /// Errors that indicate a fault in the host rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CatalogError::Io(_) | CatalogError::Json(_) | CatalogError::Inconsistent(_)
        )
    }
}
