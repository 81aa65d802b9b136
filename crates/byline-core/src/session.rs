//! Persisted session storage.
//!
//! Stores the authenticated-user record in `<base>/session.json` with
//! restricted permissions (0600) — the record contains the API token, which
//! is never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::api::User;
use crate::config::paths;

/// Durable storage of a single authenticated-user record.
///
/// All access is synchronous; consumers hold an in-memory mirror and only
/// come back here on state transitions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Opens the store at the default location under `BYLINE_HOME`.
    pub fn open_default() -> Self {
        Self {
            path: paths::session_path(),
        }
    }

    /// Opens the store at an explicit path (used by tests).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads the stored user record.
    ///
    /// Returns `None` if the file doesn't exist. An unparseable file is
    /// treated as absent (with a warning) rather than failing startup.
    pub fn get(&self) -> Option<User> {
        if !self.path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read session file");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "discarding unparseable session file");
                None
            }
        }
    }

    /// Persists the user record with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn set(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(user).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Removes the stored record, if any.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn test_user() -> User {
        User {
            email: "alice@example.test".to_string(),
            token: "jwt-token".to_string(),
            username: "alice".to_string(),
            bio: Some("writes about rust".to_string()),
            image: None,
        }
    }

    #[test]
    fn test_get_missing_file_returns_none() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_set_then_get_roundtrips() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));

        store.set(&test_user()).unwrap();
        assert_eq!(store.get(), Some(test_user()));
    }

    #[test]
    fn test_remove_clears_record() {
        let dir = tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));

        store.set(&test_user()).unwrap();
        store.remove().unwrap();
        assert_eq!(store.get(), None);

        // Removing again is not an error.
        store.remove().unwrap();
    }

    #[test]
    fn test_corrupt_file_treated_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::at(path);
        assert_eq!(store.get(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::at(path.clone());
        store.set(&test_user()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "session.json should have 0600 permissions");
    }
}
