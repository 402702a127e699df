use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::info;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = "data";

/// Where the bearer token is kept between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStorage {
    /// Persisted to a TOML file in the data directory.
    File,
    /// Lost on restart.
    Memory,
}

pub struct FrontendConfig {
    /// Base URL of the URL-shortening backend API
    pub api_url: String,
    /// Base URL that short codes are appended to when shown to the user
    pub public_url: String,
    /// Address the dashboard listens on
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub session_storage: SessionStorage,
}

impl FrontendConfig {
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        load_dotenv(manifest_dir);

        let api_url = var_or("SHORTENER_API_URL", DEFAULT_API_URL);
        let public_url = env::var("SHORTENER_PUBLIC_URL").unwrap_or_else(|_| api_url.clone());
        let session_storage = match var_or("DASHBOARD_SESSION_STORE", "file").as_str() {
            "file" => SessionStorage::File,
            "memory" => SessionStorage::Memory,
            other => bail!("DASHBOARD_SESSION_STORE must be `file` or `memory`, got `{other}`"),
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_owned(),
            public_url: public_url.trim_end_matches('/').to_owned(),
            bind_addr: var_or("DASHBOARD_BIND", DEFAULT_BIND),
            data_dir: PathBuf::from(var_or("DASHBOARD_DATA_DIR", DEFAULT_DATA_DIR)),
            session_storage,
        })
    }
}

#[cfg(debug_assertions)]
fn load_dotenv(manifest_dir: &Path) {
    if dotenvy::from_path(manifest_dir.join(".env")).is_ok() {
        info!("Loaded .env from {}", manifest_dir.display());
    }
}

#[cfg(not(debug_assertions))]
fn load_dotenv(_manifest_dir: &Path) {}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    })
}

/// Load frontend config using the calling crate's manifest directory.
#[macro_export]
macro_rules! load_frontend_config {
    () => {
        $crate::config::FrontendConfig::load(std::path::Path::new(env!("CARGO_MANIFEST_DIR")))
    };
}
