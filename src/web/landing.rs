use std::borrow::Cow;

use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::error;

use crate::{
    catalog::{AccessState, FileEntry},
    web::{
        AppState,
        admin::FlashQuery,
        admin_utils::compose_flash_message,
        auth::current_access,
        templates::{
            NavLink, PageLayout, SITE_NAME, encode_segment, escape_html, escape_js_attr,
            render_page,
        },
    },
};

pub async fn landing_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<FlashQuery>,
) -> Html<String> {
    let access = current_access(&state, &jar).await;
    let mut flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());

    let subjects = match state.catalog().subjects().await {
        Ok(subjects) => subjects,
        Err(err) => {
            error!(?err, "failed to load subjects for landing page");
            flash = compose_flash_message(None, Some(err.status_code()));
            Vec::new()
        }
    };

    Html(render_index_page(&subjects, access, &flash))
}

pub async fn subject_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(subject): Path<String>,
    Query(params): Query<FlashQuery>,
) -> Html<String> {
    let access = current_access(&state, &jar).await;
    let mut flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());

    let files = match state.catalog().files(&subject).await {
        Ok(files) => files,
        Err(err) => {
            error!(?err, subject = %subject, "failed to list subject files");
            flash = compose_flash_message(None, Some(err.status_code()));
            Vec::new()
        }
    };

    Html(render_subject_page(&subject, &files, access, &flash))
}

fn nav_for(access: AccessState) -> NavLink<'static> {
    if access.is_admin() {
        NavLink {
            href: "/admin",
            label: "Dashboard",
        }
    } else {
        NavLink {
            href: "/admin/login",
            label: "Admin",
        }
    }
}

fn render_index_page(subjects: &[String], access: AccessState, flash: &str) -> String {
    let body = if subjects.is_empty() {
        r#"        <section class="panel"><p class="note">No subjects have been added yet.</p></section>"#
            .to_string()
    } else {
        let cards = subjects
            .iter()
            .map(|subject| {
                format!(
                    r#"<a class="subject-card" href="/subject/{href}">{name}</a>"#,
                    href = encode_segment(subject),
                    name = escape_html(subject),
                )
            })
            .collect::<String>();
        format!(r#"        <div class="subject-grid">{cards}</div>"#)
    };

    render_page(PageLayout {
        meta_title: SITE_NAME,
        page_heading: SITE_NAME,
        nav_links: vec![nav_for(access)],
        flash_html: Cow::Borrowed(flash),
        body_html: Cow::Owned(body),
    })
}

fn render_subject_page(
    subject: &str,
    files: &[FileEntry],
    access: AccessState,
    flash: &str,
) -> String {
    let encoded_subject = encode_segment(subject);

    let rows = if files.is_empty() {
        let colspan = if access.is_admin() { 3 } else { 2 };
        format!(r#"<tr><td colspan="{colspan}">No files uploaded yet.</td></tr>"#)
    } else {
        files
            .iter()
            .map(|file| {
                let delete_control = if access.is_admin() {
                    format!(
                        r#"<td><form method="post" action="/admin/delete_file/{subject}/{file}" onsubmit="return confirmDelete('{label}');"><button type="submit" class="danger">Delete</button></form></td>"#,
                        subject = encoded_subject,
                        file = encode_segment(&file.name),
                        label = escape_js_attr(&file.name),
                    )
                } else {
                    String::new()
                };
                format!(
                    r#"<tr><td><span class="file-badge">{ext}</span> {name}</td><td class="actions"><a href="{view}" target="_blank" rel="noopener">View</a><a href="{download}">Download</a></td>{delete_control}</tr>"#,
                    ext = escape_html(&file.extension),
                    name = escape_html(&file.name),
                    view = escape_html(&file.view_url),
                    download = escape_html(&file.download_url),
                )
            })
            .collect::<String>()
    };

    let delete_header = if access.is_admin() { "<th></th>" } else { "" };
    let body = format!(
        r#"        <section class="panel">
            <table>
                <thead><tr><th>File</th><th>Open</th>{delete_header}</tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#
    );

    render_page(PageLayout {
        meta_title: subject,
        page_heading: subject,
        nav_links: vec![
            NavLink {
                href: "/",
                label: "← All subjects",
            },
            nav_for(access),
        ],
        flash_html: Cow::Borrowed(flash),
        body_html: Cow::Owned(body),
    })
}
