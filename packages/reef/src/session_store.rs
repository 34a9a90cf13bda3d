//! Persisted login session — the piece that survives a restart.
//!
//! One JSON file under the data dir holds the bearer token and the profile
//! it belongs to. The store is handed to whoever needs the credential (HTTP
//! calls, the chat channel); nothing reads ambient global state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use reef_api::UserProfile;

/// A logged-in session: the opaque bearer token plus who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// File-backed session storage at `<data_dir>/session.json`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("session.json"),
        }
    }

    /// Read the persisted session. A missing or unreadable file means
    /// logged-out; a corrupt file is logged and treated the same way.
    pub fn load(&self) -> Option<Session> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Session>(&content) {
            Ok(session) => {
                debug!(username = %session.user.username, "loaded persisted session");
                Some(session)
            }
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "ignoring corrupt session file");
                None
            }
        }
    }

    /// Persist via write-to-temp + rename so a crash mid-write never leaves
    /// a half-written session behind.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {parent:?}"))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write session file: {tmp_path:?}"))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to move session file into place: {:?}", self.path))?;
        Ok(())
    }

    /// Forget the session. Called on logout and whenever a service answers
    /// 401 for the stored token.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove session file: {:?}", self.path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session {
            token: "tok123".into(),
            user: UserProfile {
                id: 7,
                username: "alice".into(),
            },
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        assert!(store.load().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), Some(sample()));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&sample()).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path());

        std::fs::write(dir.path().join("session.json"), "{half a json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deeper");
        let store = SessionStore::new(&nested);

        store.save(&sample()).unwrap();
        assert_eq!(store.load(), Some(sample()));
    }
}
