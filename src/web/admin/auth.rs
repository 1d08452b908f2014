use axum::response::Redirect;
use axum_extra::extract::cookie::SignedCookieJar;

use crate::{
    catalog::AccessState,
    web::{AppState, auth::current_access},
};

pub const LOGIN_PATH: &str = "/admin/login";

/// Admin pages send anonymous visitors to the login form.
pub async fn require_admin(state: &AppState, jar: &SignedCookieJar) -> Result<AccessState, Redirect> {
    let access = current_access(state, jar).await;
    match access.require_admin() {
        Ok(()) => Ok(access),
        Err(_) => Err(Redirect::to(LOGIN_PATH)),
    }
}
