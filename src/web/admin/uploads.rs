use std::{
    borrow::Cow,
    sync::atomic::{AtomicBool, Ordering},
};

use axum::{
    extract::{
        Multipart, Query, State,
        multipart::MultipartError,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use futures::StreamExt;
use tracing::{error, info, warn};

use crate::{
    catalog::{ALLOWED_EXTENSIONS, CatalogError},
    web::{
        AppState,
        admin_utils::{catalog_error_redirect, compose_flash_message, error_redirect, status_redirect},
        templates::escape_html,
    },
};

use super::{auth::require_admin, subjects::render_admin_form, types::FlashQuery};

const UPLOAD_PATH: &str = "/admin/upload";
const SUBJECT_FIELD: &str = "subject";
const FILE_FIELD: &str = "file";

pub async fn upload_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    require_admin(&state, &jar).await?;

    let mut flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    let subjects = match state.catalog().subjects().await {
        Ok(subjects) => subjects,
        Err(err) => {
            error!(?err, "failed to load subjects for upload form");
            flash = compose_flash_message(None, Some(err.status_code()));
            Vec::new()
        }
    };

    Ok(Html(render_upload_form(&subjects, &flash)))
}

/// Expects the subject field ahead of the file field, as the upload form sends them.
/// Bodies over the configured limit are answered with 413.
pub async fn process_upload(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut multipart: Multipart,
) -> Response {
    let access = match require_admin(&state, &jar).await {
        Ok(access) => access,
        Err(redirect) => return redirect.into_response(),
    };

    let oversized = AtomicBool::new(false);
    let mut subject: Option<String> = None;
    let mut stored: Option<(String, String)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return multipart_failure(&err),
        };

        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            SUBJECT_FIELD => match field.text().await {
                Ok(value) => subject = Some(value),
                Err(err) => return multipart_failure(&err),
            },
            FILE_FIELD => {
                let Some(subject_name) = subject.clone().filter(|name| !name.is_empty()) else {
                    return error_redirect(UPLOAD_PATH, "choose_subject").into_response();
                };
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content = field.map(|chunk| {
                    chunk.inspect_err(|err| {
                        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                            oversized.store(true, Ordering::Relaxed);
                        }
                    })
                });

                match state
                    .catalog()
                    .upload_file(access, &subject_name, &file_name, content)
                    .await
                {
                    Ok(stored_name) => stored = Some((subject_name, stored_name)),
                    Err(_) if oversized.load(Ordering::Relaxed) => {
                        warn!(subject = %subject_name, "upload exceeded the body limit");
                        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
                    }
                    Err(CatalogError::NotFound(_)) => {
                        return error_redirect(UPLOAD_PATH, "choose_subject").into_response();
                    }
                    Err(err) => return catalog_error_redirect(UPLOAD_PATH, &err).into_response(),
                }
            }
            _ => {}
        }
    }

    let redirect = match stored {
        Some((subject, file)) => {
            info!(subject = %subject, file = %file, "admin uploaded file");
            status_redirect("/admin", "file_uploaded")
        }
        None if subject.as_deref().is_none_or(str::is_empty) => {
            error_redirect(UPLOAD_PATH, "choose_subject")
        }
        None => error_redirect(UPLOAD_PATH, "empty_filename"),
    };
    redirect.into_response()
}

fn multipart_failure(err: &MultipartError) -> Response {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(%err, "upload exceeded the body limit");
        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
    }
    warn!(%err, "failed to read upload form");
    error_redirect(UPLOAD_PATH, "upload_failed").into_response()
}

fn render_upload_form(subjects: &[String], flash: &str) -> String {
    let options = subjects
        .iter()
        .map(|subject| {
            format!(
                r#"<option value="{value}">{label}</option>"#,
                value = escape_html(subject),
                label = escape_html(subject),
            )
        })
        .collect::<String>();

    let accept = ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",");

    let body = format!(
        r#"        <section class="panel">
            <h2>Upload a document</h2>
            <form method="post" action="/admin/upload" enctype="multipart/form-data">
                <label for="subject">Subject</label>
                <select id="subject" name="subject" required>
                    <option value="">Choose a subject…</option>
                    {options}
                </select>
                <label for="file">File (PDF, PPT, PPTX)</label>
                <input id="file" type="file" name="file" accept="{accept}" onchange="previewFile('file', 'file-label')" required>
                <span id="file-label" class="file-label">Choose file...</span>
                <button type="submit">Upload</button>
            </form>
        </section>"#
    );

    render_admin_form("Upload file", flash, Cow::Owned(body))
}
