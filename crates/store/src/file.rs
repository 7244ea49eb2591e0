//! JSON-file backend: `<data_dir>/<user>.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use wishtrack_core::{LedgerSnapshot, UserId};

use crate::error::StoreError;
use crate::SnapshotStore;

/// Directory name under the home directory, shared with earlier releases.
pub const DEFAULT_DATA_DIR_NAME: &str = ".genshin_wish_data";

/// `$HOME/.genshin_wish_data`, or `None` when no home directory is known.
pub fn default_data_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(DEFAULT_DATA_DIR_NAME))
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// The directory is created lazily on the first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn user_file(&self, user: &UserId) -> PathBuf {
        self.data_dir.join(format!("{user}.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, user: &UserId) -> Result<Option<LedgerSnapshot>, StoreError> {
        let path = self.user_file(user);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(user = %user, path = %path.display(), "No saved wish data");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::io(path, e)),
        };

        let snapshot = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Corrupt { path: path.clone(), source })?;
        tracing::debug!(user = %user, path = %path.display(), "Loaded wish data");
        Ok(Some(snapshot))
    }

    fn save(&self, user: &UserId, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::io(&self.data_dir, e))?;

        let path = self.user_file(user);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|source| StoreError::Corrupt { path: path.clone(), source })?;

        // Write beside the target and rename so a crash never truncates it.
        fs::write(&tmp, &bytes).map_err(|e| StoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(StoreError::io(&path, e));
        }

        tracing::debug!(user = %user, path = %path.display(), bytes = bytes.len(), "Saved wish data");
        Ok(())
    }
}
