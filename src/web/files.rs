use std::{borrow::Cow, path::Path as FsPath};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::{
    catalog::sanitize::{file_extension, sanitize_file_name},
    web::AppState,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

pub async fn view_file(
    State(state): State<AppState>,
    Path((subject, filename)): Path<(String, String)>,
) -> Response {
    serve_file(&state, &subject, &filename, Disposition::Inline).await
}

pub async fn download_file(
    State(state): State<AppState>,
    Path((subject, filename)): Path<(String, String)>,
) -> Response {
    serve_file(&state, &subject, &filename, Disposition::Attachment).await
}

async fn serve_file(
    state: &AppState,
    subject: &str,
    filename: &str,
    disposition: Disposition,
) -> Response {
    let path = match state.catalog().storage().file_path(subject, filename).await {
        Ok(Some(path)) => path,
        Ok(None) => return (StatusCode::NOT_FOUND, "File not found").into_response(),
        Err(err) => {
            error!(?err, subject = %subject, file = %filename, "failed to resolve stored file");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match stream_file(&path, disposition).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Read a stored file and answer with its content type and disposition.
pub async fn stream_file(path: &FsPath, disposition: Disposition) -> Result<Response, StatusCode> {
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        error!(?err, file = %path.display(), "failed to read stored file");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("download");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(filename)),
    );
    let header_name = header_file_name(filename);
    let disposition = match disposition {
        Disposition::Inline => format!("inline; filename=\"{}\"", header_name),
        Disposition::Attachment => format!("attachment; filename=\"{}\"", header_name),
    };
    let disposition = HeaderValue::from_str(&disposition).map_err(|_| {
        error!(file = %path.display(), "stored file name is not a valid header value");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, bytes).into_response())
}

/// Names placed on disk by hand may not fit a quoted header value.
fn header_file_name(filename: &str) -> Cow<'_, str> {
    if filename.chars().all(|c| c == ' ' || (c.is_ascii_graphic() && c != '"')) {
        Cow::Borrowed(filename)
    } else {
        Cow::Owned(sanitize_file_name(filename))
    }
}

fn content_type_for(filename: &str) -> &'static str {
    match file_extension(filename).as_str() {
        "pdf" => "application/pdf",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}
