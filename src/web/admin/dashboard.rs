use std::borrow::Cow;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::error;

use crate::web::{
    AppState,
    admin_utils::compose_flash_message,
    templates::{
        ADMIN_SITE_NAME, NavLink, PageLayout, encode_segment, escape_html, escape_js_attr,
        render_page,
    },
};

use super::{auth::require_admin, types::FlashQuery};

pub async fn dashboard(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    require_admin(&state, &jar).await?;

    let mut flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    let subjects = match state.catalog().subjects().await {
        Ok(subjects) => subjects,
        Err(err) => {
            error!(?err, "failed to load subjects for dashboard");
            flash = compose_flash_message(None, Some(err.status_code()));
            Vec::new()
        }
    };

    Ok(Html(render_dashboard(&subjects, &flash)))
}

fn render_dashboard(subjects: &[String], flash: &str) -> String {
    let rows = if subjects.is_empty() {
        r#"<tr><td colspan="2">No subjects yet. Add one to start uploading.</td></tr>"#.to_string()
    } else {
        subjects
            .iter()
            .map(|subject| {
                let encoded = encode_segment(subject);
                format!(
                    r#"<tr><td><a href="/subject/{encoded}">{name}</a></td><td class="actions"><a href="/admin/rename_subject/{encoded}">Rename</a><form method="post" action="/admin/delete_subject/{encoded}" onsubmit="return confirmDelete('{label}');"><button type="submit" class="danger">Delete</button></form></td></tr>"#,
                    encoded = encoded,
                    name = escape_html(subject),
                    label = escape_js_attr(subject),
                )
            })
            .collect::<String>()
    };

    let body = format!(
        r#"        <section class="panel">
            <h2>Subjects</h2>
            <table>
                <thead><tr><th>Name</th><th>Actions</th></tr></thead>
                <tbody>{rows}</tbody>
            </table>
        </section>"#
    );

    render_page(PageLayout {
        meta_title: ADMIN_SITE_NAME,
        page_heading: "Admin dashboard",
        nav_links: vec![
            NavLink {
                href: "/admin/add_subject",
                label: "+ Add subject",
            },
            NavLink {
                href: "/admin/upload",
                label: "Upload file",
            },
            NavLink {
                href: "/",
                label: "Public site",
            },
            NavLink {
                href: "/admin/logout",
                label: "Log out",
            },
        ],
        flash_html: Cow::Borrowed(flash),
        body_html: Cow::Owned(body),
    })
}
