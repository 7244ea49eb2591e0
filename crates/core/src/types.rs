//! Shared identity types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identity used when none is configured.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Longest accepted user identifier.
pub const MAX_USER_ID_LEN: usize = 64;

/// Opaque user identity that keys one persisted ledger.
///
/// Restricted to `[A-Za-z0-9_.-]` without a leading dot so it is always
/// safe to use as a file stem inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        validate_user_id(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self(DEFAULT_USER_ID.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

fn validate_user_id(raw: &str) -> Result<(), CoreError> {
    if raw.is_empty() {
        return Err(CoreError::InvalidUserId("must not be empty".to_string()));
    }
    if raw.len() > MAX_USER_ID_LEN {
        return Err(CoreError::InvalidUserId(format!(
            "'{raw}' exceeds {MAX_USER_ID_LEN} characters"
        )));
    }
    if raw.starts_with('.') {
        return Err(CoreError::InvalidUserId(format!(
            "'{raw}' must not start with '.'"
        )));
    }
    if let Some(bad) = raw
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(CoreError::InvalidUserId(format!(
            "'{raw}' contains disallowed character '{bad}'"
        )));
    }
    Ok(())
}
