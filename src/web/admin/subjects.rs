use std::borrow::Cow;

use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::web::{
    AppState,
    admin_utils::{catalog_error_redirect, compose_flash_message, status_redirect},
    templates::{
        ADMIN_SITE_NAME, NavLink, PageLayout, encode_segment, escape_html, render_page,
    },
};

use super::{
    auth::require_admin,
    types::{AddSubjectForm, FlashQuery, RenameSubjectForm},
};

const DASHBOARD_PATH: &str = "/admin";
const ADD_SUBJECT_PATH: &str = "/admin/add_subject";

pub async fn add_subject_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    require_admin(&state, &jar).await?;

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    let body = r#"        <section class="panel">
            <h2>New subject</h2>
            <form method="post" action="/admin/add_subject">
                <label for="subject_name">Subject name</label>
                <input id="subject_name" type="text" name="subject_name" required>
                <button type="submit">Add subject</button>
            </form>
        </section>"#;

    Ok(Html(render_admin_form(
        "Add subject",
        &flash,
        Cow::Borrowed(body),
    )))
}

pub async fn add_subject(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<AddSubjectForm>,
) -> Result<Redirect, Redirect> {
    let access = require_admin(&state, &jar).await?;

    match state
        .catalog()
        .create_subject(access, &form.subject_name)
        .await
    {
        Ok(_) => Ok(status_redirect(DASHBOARD_PATH, "subject_added")),
        Err(err) => Ok(catalog_error_redirect(ADD_SUBJECT_PATH, &err)),
    }
}

pub async fn rename_subject_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(old_name): Path<String>,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    require_admin(&state, &jar).await?;

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    let body = format!(
        r#"        <section class="panel">
            <h2>Rename “{name}”</h2>
            <form method="post" action="/admin/rename_subject/{encoded}">
                <label for="new_name">New name</label>
                <input id="new_name" type="text" name="new_name" value="{name}" required>
                <button type="submit">Rename</button>
            </form>
        </section>"#,
        name = escape_html(&old_name),
        encoded = encode_segment(&old_name),
    );

    Ok(Html(render_admin_form(
        "Rename subject",
        &flash,
        Cow::Owned(body),
    )))
}

pub async fn rename_subject(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(old_name): Path<String>,
    Form(form): Form<RenameSubjectForm>,
) -> Result<Redirect, Redirect> {
    let access = require_admin(&state, &jar).await?;

    match state
        .catalog()
        .rename_subject(access, &old_name, &form.new_name)
        .await
    {
        Ok(_) => Ok(status_redirect(DASHBOARD_PATH, "subject_renamed")),
        Err(err) => Ok(catalog_error_redirect(DASHBOARD_PATH, &err)),
    }
}

pub async fn delete_subject(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(name): Path<String>,
) -> Result<Redirect, Redirect> {
    let access = require_admin(&state, &jar).await?;

    match state.catalog().delete_subject(access, &name).await {
        Ok(true) => Ok(status_redirect(DASHBOARD_PATH, "subject_deleted")),
        Ok(false) => Ok(Redirect::to(DASHBOARD_PATH)),
        Err(err) => Ok(catalog_error_redirect(DASHBOARD_PATH, &err)),
    }
}

pub(super) fn render_admin_form(heading: &str, flash: &str, body: Cow<'_, str>) -> String {
    render_page(PageLayout {
        meta_title: ADMIN_SITE_NAME,
        page_heading: heading,
        nav_links: vec![NavLink {
            href: DASHBOARD_PATH,
            label: "← Dashboard",
        }],
        flash_html: Cow::Borrowed(flash),
        body_html: body,
    })
}
