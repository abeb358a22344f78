/*!
 * File-backed persistence of the editing session.
 *
 * The session is written as pretty JSON through a temporary file in the same
 * directory and renamed into place, so an interrupted save never leaves a
 * truncated session behind.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::models::ScriptSession;
use crate::errors::StorageError;
use crate::file_utils::FileManager;

/// Loads and saves the current session file
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Path of the session JSON file
    path: PathBuf,
}

impl SessionStore {
    /// Create a store for the given session file
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Session file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session, `None` when no session file exists
    pub fn load(&self) -> Result<Option<ScriptSession>> {
        if !self.path.exists() {
            debug!("No session file at {:?}", self.path);
            return Ok(None);
        }

        let json = FileManager::read_to_string(&self.path)?;
        let session = serde_json::from_str(&json).map_err(|e| StorageError::CorruptSession {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(session))
    }

    /// Load the saved session or fail with [`StorageError::NoSession`]
    pub fn load_required(&self) -> Result<ScriptSession> {
        self.load()?
            .ok_or_else(|| StorageError::NoSession(self.path.display().to_string()).into())
    }

    /// Save the session, replacing any previous file
    pub fn save(&self, session: &ScriptSession) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        FileManager::ensure_dir(&dir)?;

        let json = serde_json::to_string_pretty(session)
            .context("Failed to serialize session")?;

        let mut temp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary session file in {:?}", dir))?;
        temp.write_all(json.as_bytes())
            .context("Failed to write session data")?;
        temp.persist(&self.path)
            .with_context(|| format!("Failed to save session to {:?}", self.path))?;

        debug!("Saved session with {} scenes to {:?}", session.scenes.len(), self.path);
        Ok(())
    }

    /// Delete the session file if present
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session file {:?}", self.path))?;
            info!("Cleared session {:?}", self.path);
        }
        Ok(())
    }
}
