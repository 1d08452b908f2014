use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, admin, auth, files, landing};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes();

    Router::new()
        .route("/", get(landing::landing_page))
        .route("/subject/:name", get(landing::subject_page))
        .route("/uploads/:subject/:filename", get(files::view_file))
        .route("/download/:subject/:filename", get(files::download_file))
        .route("/healthz", get(healthz))
        .route(
            "/admin/login",
            get(auth::login_page).post(auth::process_login),
        )
        .route("/admin/logout", get(auth::logout))
        .route("/admin", get(admin::dashboard))
        .route(
            "/admin/add_subject",
            get(admin::add_subject_page).post(admin::add_subject),
        )
        .route("/admin/delete_subject/:name", post(admin::delete_subject))
        .route(
            "/admin/rename_subject/:old_name",
            get(admin::rename_subject_page).post(admin::rename_subject),
        )
        .route(
            "/admin/upload",
            get(admin::upload_page).post(admin::process_upload),
        )
        .route(
            "/admin/delete_file/:subject/:filename",
            post(admin::delete_file),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::{
        body::{Body, Bytes, to_bytes},
        extract::FromRef,
        http::{Request, header},
        response::Response,
    };
    use axum_extra::extract::cookie::{Cookie, Key, SignedCookieJar};
    use futures::stream;
    use tempfile::{TempDir, tempdir};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        catalog::{AccessState, Catalog},
        config::AppConfig,
        web::auth::{SESSION_COOKIE, current_access, end_session},
    };

    const ADMIN: AccessState = AccessState::Authenticated;
    const BOUNDARY: &str = "class-notes-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
                Part::File(file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(cookie: &str, body: Vec<u8>) -> Request<Body> {
        Request::post("/admin/upload")
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    fn form_request(uri: &str, cookie: &str, body: &'static str) -> Request<Body> {
        Request::post(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request")
    }

    fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    async fn app() -> (TempDir, AppState) {
        let dir = tempdir().expect("temp dir");
        let config = AppConfig {
            session_secret: "test-secret".into(),
            admin_username: "admin".into(),
            admin_password: "hunter2".into(),
            port: 0,
            data_dir: dir.path().join("data"),
            upload_dir: dir.path().join("uploads"),
            max_upload_mb: 1,
        };
        let catalog = Catalog::new(config.registry_path(), config.upload_dir.clone());
        catalog.bootstrap().await.expect("bootstrap");
        let state = AppState::with_catalog(catalog, &config).expect("state");
        (dir, state)
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        build_router(state.clone())
            .oneshot(request)
            .await
            .expect("router response")
    }

    fn login_request(password: &str) -> Request<Body> {
        Request::post("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username=admin&password={password}")))
            .expect("request")
    }

    async fn session_cookie(state: &AppState) -> String {
        let response = send(state, login_request("hunter2")).await;
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("session cookie");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn landing_page_lists_subjects() {
        let (_dir, state) = app().await;
        state.catalog().registry().add("Physics").await.expect("add");

        let response = send(&state, Request::get("/").body(Body::empty()).expect("request")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert!(String::from_utf8_lossy(&body).contains("Physics"));
    }

    #[tokio::test]
    async fn healthz_answers_ok() {
        let (_dir, state) = app().await;
        let response = send(&state, Request::get("/healthz").body(Body::empty()).expect("request")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn anonymous_admin_is_sent_to_login() {
        let (_dir, state) = app().await;
        let response = send(&state, Request::get("/admin").body(Body::empty()).expect("request")).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/admin/login");
    }

    #[tokio::test]
    async fn anonymous_file_delete_is_forbidden() {
        let (_dir, state) = app().await;
        let request = Request::post("/admin/delete_file/Math/notes.pdf")
            .body(Body::empty())
            .expect("request");
        let response = send(&state, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (_dir, state) = app().await;
        let response = send(&state, login_request("wrong")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn login_grants_dashboard_and_subject_creation() {
        let (dir, state) = app().await;
        let response = send(&state, login_request("hunter2")).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/admin");

        let cookie = session_cookie(&state).await;
        let dashboard = Request::get("/admin")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request");
        assert_eq!(send(&state, dashboard).await.status(), StatusCode::OK);

        let add = Request::post("/admin/add_subject")
            .header(header::COOKIE, &cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("subject_name=Linear+Algebra"))
            .expect("request");
        let response = send(&state, add).await;
        assert_eq!(location(&response), "/admin?status=subject_added");

        let subjects = state.catalog().subjects().await.expect("subjects");
        assert_eq!(subjects, vec!["Linear Algebra".to_string()]);
        let folder: PathBuf = dir.path().join("uploads").join("Linear_Algebra");
        assert!(folder.is_dir());
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let (_dir, state) = app().await;
        let cookie = session_cookie(&state).await;

        let logout = Request::get("/admin/logout")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request");
        let response = send(&state, logout).await;
        assert_eq!(location(&response), "/admin/login?status=logged_out");

        let dashboard = Request::get("/admin")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request");
        let response = send(&state, dashboard).await;
        assert_eq!(location(&response), "/admin/login");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let (_dir, state) = app().await;
        let request = Request::get("/uploads/Math/missing.pdf")
            .body(Body::empty())
            .expect("request");
        assert_eq!(send(&state, request).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stored_files_are_served_inline_and_as_attachment() {
        let (_dir, state) = app().await;
        state.catalog().create_subject(ADMIN, "Math").await.expect("create");
        let chunks = stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(b"%PDF-1.4"))]);
        state
            .catalog()
            .upload_file(ADMIN, "Math", "notes.pdf", chunks)
            .await
            .expect("upload");

        let view = send(&state, Request::get("/uploads/Math/notes.pdf").body(Body::empty()).expect("request")).await;
        assert_eq!(view.status(), StatusCode::OK);
        assert_eq!(
            header_str(&view, header::CONTENT_DISPOSITION),
            r#"inline; filename="notes.pdf""#
        );
        assert_eq!(header_str(&view, header::CONTENT_TYPE), "application/pdf");

        let download = send(&state, Request::get("/download/Math/notes.pdf").body(Body::empty()).expect("request")).await;
        assert_eq!(download.status(), StatusCode::OK);
        assert_eq!(
            header_str(&download, header::CONTENT_DISPOSITION),
            r#"attachment; filename="notes.pdf""#
        );
        let body = to_bytes(download.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&body[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn upload_form_stores_file_under_registered_subject() {
        let (_dir, state) = app().await;
        state.catalog().create_subject(ADMIN, "Math").await.expect("create");
        let cookie = session_cookie(&state).await;

        let body = multipart_body(&[
            Part::Text("subject", "Math"),
            Part::File("my notes.PDF", b"%PDF-1.4 notes"),
        ]);
        let response = send(&state, upload_request(&cookie, body)).await;
        assert_eq!(location(&response), "/admin?status=file_uploaded");

        let files = state.catalog().files("Math").await.expect("files");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "my_notes.PDF");
        assert_eq!(files[0].extension, "pdf");

        let download = Request::get(files[0].download_url.as_str())
            .body(Body::empty())
            .expect("request");
        let response = send(&state, download).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&body[..], b"%PDF-1.4 notes");
    }

    #[tokio::test]
    async fn upload_to_unknown_subject_asks_for_a_subject() {
        let (_dir, state) = app().await;
        let cookie = session_cookie(&state).await;

        let body = multipart_body(&[
            Part::Text("subject", "Ghost"),
            Part::File("notes.pdf", b"%PDF"),
        ]);
        let response = send(&state, upload_request(&cookie, body)).await;
        assert_eq!(location(&response), "/admin/upload?error=choose_subject");
    }

    #[tokio::test]
    async fn file_field_ahead_of_subject_asks_for_a_subject() {
        let (_dir, state) = app().await;
        state.catalog().create_subject(ADMIN, "Math").await.expect("create");
        let cookie = session_cookie(&state).await;

        let body = multipart_body(&[
            Part::File("notes.pdf", b"%PDF"),
            Part::Text("subject", "Math"),
        ]);
        let response = send(&state, upload_request(&cookie, body)).await;
        assert_eq!(location(&response), "/admin/upload?error=choose_subject");
        assert!(state.catalog().files("Math").await.expect("files").is_empty());
    }

    #[tokio::test]
    async fn upload_without_file_name_is_rejected() {
        let (_dir, state) = app().await;
        state.catalog().create_subject(ADMIN, "Math").await.expect("create");
        let cookie = session_cookie(&state).await;

        let body = multipart_body(&[Part::Text("subject", "Math"), Part::File("", b"")]);
        let response = send(&state, upload_request(&cookie, body)).await;
        assert_eq!(location(&response), "/admin/upload?error=empty_filename");
    }

    #[tokio::test]
    async fn upload_over_body_limit_is_payload_too_large() {
        let (_dir, state) = app().await;
        state.catalog().create_subject(ADMIN, "Math").await.expect("create");
        let cookie = session_cookie(&state).await;

        let oversized = vec![b'x'; state.max_upload_bytes() + 64 * 1024];
        let body = multipart_body(&[
            Part::Text("subject", "Math"),
            Part::File("big.pdf", &oversized),
        ]);
        let response = send(&state, upload_request(&cookie, body)).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(state.catalog().files("Math").await.expect("files").is_empty());
    }

    #[tokio::test]
    async fn rename_route_updates_registry_and_folder() {
        let (dir, state) = app().await;
        state.catalog().create_subject(ADMIN, "Math").await.expect("create");
        let cookie = session_cookie(&state).await;

        let request = form_request("/admin/rename_subject/Math", &cookie, "new_name=Linear+Algebra");
        let response = send(&state, request).await;
        assert_eq!(location(&response), "/admin?status=subject_renamed");
        assert_eq!(
            state.catalog().subjects().await.expect("subjects"),
            vec!["Linear Algebra".to_string()]
        );
        assert!(dir.path().join("uploads").join("Linear_Algebra").is_dir());
        assert!(!dir.path().join("uploads").join("Math").exists());
    }

    #[tokio::test]
    async fn delete_route_removes_subject_and_folder() {
        let (dir, state) = app().await;
        state.catalog().create_subject(ADMIN, "Math").await.expect("create");
        let cookie = session_cookie(&state).await;

        let request = Request::post("/admin/delete_subject/Math")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request");
        let response = send(&state, request).await;
        assert_eq!(location(&response), "/admin?status=subject_deleted");
        assert!(state.catalog().subjects().await.expect("subjects").is_empty());
        assert!(!dir.path().join("uploads").join("Math").exists());
    }

    #[tokio::test]
    async fn authenticated_login_page_redirects_to_dashboard() {
        let (_dir, state) = app().await;
        let cookie = session_cookie(&state).await;

        let request = Request::get("/admin/login")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .expect("request");
        let response = send(&state, request).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/admin");
    }

    #[tokio::test]
    async fn ending_a_session_leaves_the_caller_anonymous() {
        let (_dir, state) = app().await;
        let token = state.open_session().await;
        let jar = SignedCookieJar::new(Key::from_ref(&state))
            .add(Cookie::new(SESSION_COOKIE, token.to_string()));

        assert!(current_access(&state, &jar).await.is_admin());
        assert_eq!(end_session(&state, &jar).await, AccessState::Anonymous);
        assert!(!state.session_is_live(token).await);
        assert_eq!(current_access(&state, &jar).await, AccessState::Anonymous);
    }
}
