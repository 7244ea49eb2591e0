use std::path::PathBuf;

use wishtrack_core::pool::DEFAULT_BULK_PULLS;
use wishtrack_core::{CoreError, UserId};
use wishtrack_store::file::default_data_dir;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("WISHTRACK_USER: {0}")]
    User(#[from] CoreError),

    #[error("WISHTRACK_BULK_SIZE must be a positive integer, got '{0}'")]
    BulkSize(String),

    #[error("No home directory found; set WISHTRACK_DATA_DIR")]
    NoDataDir,
}

/// Front-end configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Whose ledger to open (default: `default_user`).
    pub user: UserId,
    /// Directory holding one `<user>.json` per user.
    pub data_dir: PathBuf,
    /// Pulls applied by the `ten` command (default: `10`).
    pub bulk_size: u32,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                    |
    /// |-----------------------|----------------------------|
    /// | `WISHTRACK_USER`      | `default_user`             |
    /// | `WISHTRACK_DATA_DIR`  | `$HOME/.genshin_wish_data` |
    /// | `WISHTRACK_BULK_SIZE` | `10`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let user = match lookup("WISHTRACK_USER") {
            Some(raw) => UserId::new(raw.trim())?,
            None => UserId::default(),
        };

        let data_dir = match lookup("WISHTRACK_DATA_DIR") {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir().ok_or(ConfigError::NoDataDir)?,
        };

        let bulk_size = match lookup("WISHTRACK_BULK_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::BulkSize(raw)),
            },
            None => DEFAULT_BULK_PULLS,
        };

        Ok(Self {
            user,
            data_dir,
            bulk_size,
        })
    }
}
