use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result, anyhow};
use argon2::Argon2;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    catalog::{AdminCredentials, Catalog},
    config::AppConfig,
};

use super::auth::SESSION_TTL_HOURS;

const SESSION_KEY_SALT: &[u8] = b"class-notes/session-cookie";

#[derive(Clone)]
pub struct AppState {
    catalog: Catalog,
    credentials: Arc<AdminCredentials>,
    sessions: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
    cookie_key: Key,
    max_upload_bytes: usize,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let catalog = Catalog::new(config.registry_path(), &config.upload_dir);
        catalog
            .bootstrap()
            .await
            .context("failed to prepare data and upload directories")?;

        Self::with_catalog(catalog, config)
    }

    pub fn with_catalog(catalog: Catalog, config: &AppConfig) -> Result<Self> {
        let credentials = AdminCredentials::new(&config.admin_username, &config.admin_password)
            .map_err(|err| anyhow!("failed to hash admin password: {err}"))?;
        let cookie_key = derive_cookie_key(&config.session_secret)?;

        Ok(Self {
            catalog,
            credentials: Arc::new(credentials),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            cookie_key,
            max_upload_bytes: config.max_upload_bytes(),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn credentials(&self) -> &AdminCredentials {
        &self.credentials
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Registers a new admin session and returns its token.
    pub async fn open_session(&self) -> Uuid {
        let token = Uuid::new_v4();
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(token, now + ChronoDuration::hours(SESSION_TTL_HOURS));
        token
    }

    pub async fn session_is_live(&self, token: Uuid) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(&token)
            .is_some_and(|expires_at| *expires_at > Utc::now())
    }

    pub async fn close_session(&self, token: Uuid) {
        self.sessions.write().await.remove(&token);
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Stretches the configured secret into the 64 bytes a cookie key needs.
fn derive_cookie_key(secret: &str) -> Result<Key> {
    let mut material = [0u8; 64];
    Argon2::default()
        .hash_password_into(secret.as_bytes(), SESSION_KEY_SALT, &mut material)
        .map_err(|err| anyhow!("failed to derive session key: {err}"))?;
    Key::try_from(material.as_slice()).map_err(|err| anyhow!("invalid session key material: {err}"))
}
