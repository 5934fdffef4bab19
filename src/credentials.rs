// API key persistence. The key lives in a single file under the user's
// config directory; `YTRSS_API_KEY` takes precedence when set.

use crate::error::CredentialError;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "YTRSS_API_KEY";

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/ytrss/api_key`, or `~/.ytrss/api_key` when the
    /// platform has no config dir.
    pub fn default_location() -> Result<Self, CredentialError> {
        let dir = crate::config::app_config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".ytrss")))
            .ok_or(CredentialError::NoConfigDir)?;
        Ok(Self::new(dir.join("api_key")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Environment key first, then the stored file. `Ok(None)` when neither
    /// holds a non-empty key.
    pub fn load_from(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<String>, CredentialError> {
        match env_key(env) {
            Some(key) => Ok(Some(key)),
            None => self.load_stored(),
        }
    }

    /// Like [`load_from`](Self::load_from), but an unreadable key file counts
    /// as no key so `ytrss auth` can still replace it.
    pub fn load_or_warn(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.load_from(env).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring stored API key");
            None
        })
    }

    pub fn load_stored(&self) -> Result<Option<String>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => {
                let key = data.trim();
                Ok((!key.is_empty()).then(|| key.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CredentialError::Io {
                operation: "Failed to read API key",
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Persist the key, returning the trimmed value actually stored.
    pub fn save(&self, key: &str) -> Result<String, CredentialError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| CredentialError::Io {
                operation: "Failed to create config directory",
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, key).map_err(|source| CredentialError::Io {
            operation: "Failed to write API key",
            path: self.path.clone(),
            source,
        })?;
        restrict_permissions(&self.path)?;
        tracing::info!(path = %self.path.display(), "API key saved");
        Ok(key.to_string())
    }
}

/// Non-empty, trimmed `YTRSS_API_KEY`.
pub fn env_key(env: impl Fn(&str) -> Option<String>) -> Option<String> {
    env(API_KEY_ENV)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|source| {
        CredentialError::Io {
            operation: "Failed to restrict API key permissions",
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CredentialError> {
    Ok(())
}
