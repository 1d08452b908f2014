use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::web::{
    AppState,
    admin_utils::{catalog_error_redirect, error_redirect, status_redirect},
    auth::current_access,
    templates::encode_segment,
};

/// Anonymous callers get a bare 403 rather than the login redirect.
pub async fn delete_file(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path((subject, filename)): Path<(String, String)>,
) -> Response {
    let access = current_access(&state, &jar).await;
    if !access.is_admin() {
        return StatusCode::FORBIDDEN.into_response();
    }

    let subject_path = format!("/subject/{}", encode_segment(&subject));
    match state
        .catalog()
        .delete_file(access, &subject, &filename)
        .await
    {
        Ok(true) => status_redirect(&subject_path, "file_deleted").into_response(),
        Ok(false) => error_redirect(&subject_path, "file_not_found").into_response(),
        Err(err) => catalog_error_redirect(&subject_path, &err).into_response(),
    }
}
