//! Persistent storage for the Music user token
//!
//! One token per installation, stored as a flat secret file under the
//! platform config directory. Writes go through a temp file + rename so
//! the polling reader in the auth flow sees either the previous token
//! or the new one, never a partial write.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Application subdirectory under the platform config dir.
const APP_DIR: &str = "apple-music-cli";
/// Token file name within the application subdirectory.
const TOKEN_FILE: &str = "music_user_token";

/// File-backed store holding at most one Music user token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store backed by an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the platform-default token path: the roaming app-data
    /// directory on Windows, elsewhere the XDG config directory
    /// (honoring `XDG_CONFIG_HOME`).
    pub fn from_platform_dirs() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            Error::StorageUnreadable("no user configuration directory on this platform".into())
        })?;
        Ok(Self {
            path: base.join(APP_DIR).join(TOKEN_FILE),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token, trimmed of surrounding whitespace.
    ///
    /// Returns `None` when the file does not exist or holds only
    /// whitespace.
    pub async fn read(&self) -> Result<Option<String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::StorageUnreadable(format!(
                    "{}: {e}",
                    self.path.display()
                )));
            }
        };
        let token = raw.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_owned()))
        }
    }

    /// Replace the stored token with the exact given string.
    ///
    /// Creates parent directories as needed. The write is atomic (temp
    /// file + rename) and the file is 0600 on unix since it holds a
    /// bearer credential.
    pub async fn write(&self, token: &str) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            Error::StorageUnwritable("token path has no parent directory".into())
        })?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::StorageUnwritable(format!("creating {}: {e}", dir.display())))?;

        let tmp = dir.join(format!(".{TOKEN_FILE}.tmp.{}", std::process::id()));
        tokio::fs::write(&tmp, token.as_bytes())
            .await
            .map_err(|e| Error::StorageUnwritable(format!("writing {}: {e}", tmp.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp, perms)
                .await
                .map_err(|e| Error::StorageUnwritable(format!("setting permissions: {e}")))?;
        }

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::StorageUnwritable(format!("renaming into place: {e}")))?;

        debug!(path = %self.path.display(), "persisted user token");
        Ok(())
    }
}
