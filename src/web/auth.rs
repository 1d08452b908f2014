use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    catalog::AccessState,
    web::{AppState, admin::FlashQuery, admin_utils::compose_flash_message, render_login_page},
};

pub const SESSION_COOKIE: &str = "admin_session";
pub const SESSION_TTL_HOURS: i64 = 12;

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<FlashQuery>,
) -> Result<Html<String>, Redirect> {
    if current_access(&state, &jar).await.is_admin() {
        return Err(Redirect::to("/admin"));
    }

    let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    Ok(Html(render_login_page(&flash)))
}

pub async fn process_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(SignedCookieJar, Redirect), (StatusCode, Html<String>)> {
    if let Err(err) = state.credentials().login(&form.username, &form.password) {
        warn!(username = %form.username, "rejected admin login");
        let flash = compose_flash_message(None, Some(err.status_code()));
        return Err((StatusCode::UNAUTHORIZED, Html(render_login_page(&flash))));
    }

    let token = state.open_session().await;
    info!(username = %form.username, "admin logged in");

    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::hours(SESSION_TTL_HOURS));

    Ok((jar.add(cookie), Redirect::to("/admin")))
}

pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    end_session(&state, &jar).await;

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));

    (jar.remove(removal), Redirect::to("/admin/login?status=logged_out"))
}

/// Drops the session behind the cookie and returns the resulting access state.
pub async fn end_session(state: &AppState, jar: &SignedCookieJar) -> AccessState {
    let access = current_access(state, jar).await;
    if let Some(token) = session_token(jar) {
        state.close_session(token).await;
    }
    if access.is_admin() {
        info!(username = %state.credentials().username(), "admin logged out");
    }
    access.logout()
}

/// Access state carried by the request's session cookie.
pub async fn current_access(state: &AppState, jar: &SignedCookieJar) -> AccessState {
    match session_token(jar) {
        Some(token) if state.session_is_live(token).await => AccessState::Authenticated,
        _ => AccessState::Anonymous,
    }
}

fn session_token(jar: &SignedCookieJar) -> Option<Uuid> {
    let cookie = jar.get(SESSION_COOKIE)?;
    Uuid::parse_str(cookie.value()).ok()
}
