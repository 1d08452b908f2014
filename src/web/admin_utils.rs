use axum::response::Redirect;
use tracing::{error, warn};

use crate::{
    catalog::CatalogError,
    web::{admin::LOGIN_PATH, templates::escape_html},
};

/// Redirect to `base` with a status code for the flash banner.
pub fn status_redirect(base: &str, status: &str) -> Redirect {
    Redirect::to(&format!("{base}?status={status}"))
}

/// Redirect to `base` with an error code for the flash banner.
pub fn error_redirect(base: &str, error: &str) -> Redirect {
    Redirect::to(&format!("{base}?error={error}"))
}

/// Map a catalog failure onto a redirect, logging faults of the host.
pub fn catalog_error_redirect(base: &str, err: &CatalogError) -> Redirect {
    if matches!(err, CatalogError::Unauthorized) {
        return Redirect::to(LOGIN_PATH);
    }
    if err.is_internal() {
        error!(?err, "catalog operation failed");
    } else {
        warn!(%err, "catalog operation rejected");
    }
    error_redirect(base, err.status_code())
}

/// Compose a flash message HTML snippet for known status or error codes.
pub fn compose_flash_message(status: Option<&str>, error: Option<&str>) -> String {
    if let Some(status) = status {
        let (class, message) = match status {
            "logged_out" => ("info", "Logged out."),
            "subject_added" => ("success", "Subject added."),
            "subject_renamed" => ("success", "Subject renamed."),
            "subject_deleted" => ("info", "Subject deleted."),
            "file_uploaded" => ("success", "File uploaded."),
            "file_deleted" => ("info", "File deleted."),
            _ => ("", ""),
        };

        if !message.is_empty() {
            return flash(class, message);
        }
    }

    if let Some(error) = error {
        let (class, message) = match error {
            "invalid_credentials" => ("danger", "Invalid credentials."),
            "not_authorized" => ("danger", "Admin login required."),
            "invalid_name" => ("warning", "Subject name cannot be empty."),
            "duplicate_subject" => ("warning", "A subject with that name already exists."),
            "not_found" => ("warning", "Subject not found."),
            "choose_subject" => ("warning", "Choose a valid subject."),
            "file_not_found" => ("warning", "File not found."),
            "empty_filename" => ("warning", "No file selected."),
            "invalid_extension" => ("warning", "File type not allowed. Use PDF, PPT, PPTX."),
            "upload_failed" => ("danger", "The upload was interrupted, please try again."),
            "directory_not_empty" => (
                "danger",
                "The subject folder contains sub-folders and was not removed.",
            ),
            "inconsistent" => (
                "danger",
                "The subject list and its folder no longer match. Check the server log.",
            ),
            _ => ("danger", "Something went wrong, check the server log."),
        };

        return flash(class, message);
    }

    String::new()
}

fn flash(class: &str, message: &str) -> String {
    format!(
        r#"<div class="flash-message {class}">{message}</div>"#,
        message = escape_html(message)
    )
}
