use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiError;
use crate::paths::SESSION_FILE;

/// Backing storage for the single bearer token.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

/// Keeps the token in `session.toml` under the data directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    /// A missing file means signed out. An unreadable one is logged and
    /// treated the same way.
    fn load(&self) -> Option<String> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("failed to read session file {}: {e}", self.path.display());
                return None;
            }
        };
        match toml::from_str::<SessionFile>(&content) {
            Ok(file) => Some(file.token),
            Err(e) => {
                warn!("ignoring malformed session file {}: {e}", self.path.display());
                None
            }
        }
    }

    fn store(&self, token: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string(&SessionFile {
            token: token.to_owned(),
        })
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_private(&self.path, content.as_bytes())
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Writes `content` readable by the owner only.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> io::Result<()> {
    fs::write(path, content)
}

/// The signed-in state shared by every page.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
}

impl Session {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::default()))
    }

    pub fn token(&self) -> Option<String> {
        self.store.load().filter(|token| !token.is_empty())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    /// Token for an authenticated backend call.
    pub fn require_token(&self) -> Result<String, ApiError> {
        self.token().ok_or(ApiError::AuthRequired)
    }

    pub fn sign_in(&self, token: &str) -> io::Result<()> {
        self.store.store(token)?;
        info!("Session token saved");
        Ok(())
    }

    pub fn sign_out(&self) -> io::Result<()> {
        self.store.clear()?;
        info!("Session token erased");
        Ok(())
    }
}
