use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use tracing::{info, warn};

const DEFAULT_SESSION_SECRET: &str = "default_secret";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "change-me";
const DEFAULT_PORT: &str = "10000";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_MB: &str = "64";

pub const REGISTRY_FILE_NAME: &str = "subjects.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub session_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_mb: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set, signing sessions with the built-in default");
            DEFAULT_SESSION_SECRET.to_string()
        });

        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            warn!("ADMIN_PASSWORD not set, using the default admin password");
            DEFAULT_ADMIN_PASSWORD.to_string()
        });

        Ok(Self {
            session_secret,
            admin_username: load_string("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            admin_password,
            port: try_load("PORT", DEFAULT_PORT)?,
            data_dir: PathBuf::from(load_string("DATA_DIR", DEFAULT_DATA_DIR)),
            upload_dir: PathBuf::from(load_string("UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            max_upload_mb: try_load("MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?,
        })
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(REGISTRY_FILE_NAME)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn load_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = load_string(key, default);
    raw.trim()
        .parse()
        .map_err(|err| anyhow::anyhow!("{err}"))
        .with_context(|| format!("invalid {key} value `{raw}`"))
}
