//! Session persistence with file locking.
//!
//! The session (bearer token plus cached profile) lives in a single JSON
//! document. Reads take a shared lock. Updates hold an exclusive lock on a
//! sidecar `.lock` file for the whole read-modify-write and finish with a
//! temp file renamed over the original, so token and profile always change
//! together.

use crate::{Error, Result, UserProfile};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persisted client session
///
/// `token.is_some()` is the only definition of "logged in".
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub profile: Option<UserProfile>,

    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,

    /// Most recent first
    #[serde(default)]
    pub recent_uploads: Vec<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// File-backed session provider
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
    upload_history_limit: usize,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, upload_history_limit: usize) -> Self {
        Self {
            path: path.into(),
            upload_history_limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Load the session with a shared lock
    ///
    /// Returns an empty session if the file doesn't exist.
    /// If the file is unreadable or corrupted, logs a warning and returns an
    /// empty session: a broken session file means "logged out".
    pub fn load(&self) -> Session {
        let path = self.path.as_path();
        if !path.exists() {
            tracing::debug!("No session file at {:?}", path);
            return Session::default();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open session file {:?}: {}", path, e);
                return Session::default();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock session file {:?}: {}", path, e);
            return Session::default();
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        if let Err(e) = read {
            tracing::warn!("Failed to read session file {:?}: {}", path, e);
            return Session::default();
        }

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse session file {:?}: {}. Treating as logged out.",
                    path,
                    e
                );
                Session::default()
            }
        }
    }

    /// Current bearer token, if logged in. Never fails.
    pub fn get_token(&self) -> Option<String> {
        self.load().token
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.load().profile
    }

    pub fn user_id(&self) -> Option<String> {
        self.load().user_id
    }

    pub fn recent_uploads(&self) -> Vec<String> {
        self.load().recent_uploads
    }

    /// Whether the cached profile is missing or older than `max_age`
    ///
    /// A session saved without a timestamp counts as stale.
    pub fn profile_is_stale(&self, max_age: chrono::Duration) -> bool {
        let session = self.load();
        match (session.profile, session.saved_at) {
            (Some(_), Some(saved_at)) => Utc::now() - saved_at > max_age,
            _ => true,
        }
    }

    /// Persist a fresh login
    ///
    /// Token, user id and profile are written in one atomic replace; if it
    /// fails the previous session is left untouched.
    pub fn save_session(&self, token: &str, profile: &UserProfile) -> Result<()> {
        if token.is_empty() {
            return Err(Error::Session("refusing to save an empty token".into()));
        }

        let _lock = self.lock_for_update()?;
        let mut session = self.load();
        session.token = Some(token.to_string());
        session.user_id = Some(profile.user_id.clone());
        session.profile = Some(profile.clone());
        session.saved_at = Some(Utc::now());
        self.write(&session)?;

        tracing::info!("Saved session for user {}", profile.user_id);
        Ok(())
    }

    /// Forget token and profile. Idempotent; upload history is kept.
    pub fn clear_session(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let _lock = self.lock_for_update()?;
        let mut session = self.load();
        session.token = None;
        session.user_id = None;
        session.profile = None;
        session.saved_at = None;
        self.write(&session)?;

        tracing::info!("Cleared session");
        Ok(())
    }

    /// Remember an uploaded file URL, newest first
    pub fn record_upload(&self, url: &str) -> Result<()> {
        let _lock = self.lock_for_update()?;
        let mut session = self.load();
        session.recent_uploads.retain(|u| u != url);
        session.recent_uploads.insert(0, url.to_string());
        session.recent_uploads.truncate(self.upload_history_limit);
        self.write(&session)
    }

    fn parent_dir(&self) -> Result<&Path> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Session("session path missing parent".into()))?;
        std::fs::create_dir_all(parent)?;
        Ok(parent)
    }

    /// Exclusive lock held until the returned file is dropped
    fn lock_for_update(&self) -> Result<File> {
        self.parent_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    /// Atomically replace the session file; callers hold the update lock
    fn write(&self, session: &Session) -> Result<()> {
        let parent = self.parent_dir()?;

        // Unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(session)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote session file {:?}", self.path);
        Ok(())
    }
}
