//! The three reward pools and their pity thresholds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Pity threshold of the limited-time character pool.
pub const LIMITED_THRESHOLD: u32 = 90;

/// Pity threshold of the weapon pool.
pub const WEAPON_THRESHOLD: u32 = 80;

/// Pity threshold of the standard pool.
pub const STANDARD_THRESHOLD: u32 = 90;

/// Fate points are capped at this value.
pub const MAX_FATE_POINTS: u8 = 2;

/// Pulls applied by a multi-pull when no size is configured.
pub const DEFAULT_BULK_PULLS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    Limited,
    Weapon,
    Standard,
}

impl PoolKind {
    pub const ALL: [PoolKind; 3] = [PoolKind::Limited, PoolKind::Weapon, PoolKind::Standard];

    pub fn threshold(self) -> u32 {
        match self {
            PoolKind::Limited => LIMITED_THRESHOLD,
            PoolKind::Weapon => WEAPON_THRESHOLD,
            PoolKind::Standard => STANDARD_THRESHOLD,
        }
    }

    /// Name used in persisted snapshots and on screen.
    pub fn as_str(self) -> &'static str {
        match self {
            PoolKind::Limited => "Limited",
            PoolKind::Weapon => "Weapon",
            PoolKind::Standard => "Standard",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "limited" | "character" | "event" => Ok(PoolKind::Limited),
            "weapon" => Ok(PoolKind::Weapon),
            "standard" => Ok(PoolKind::Standard),
            _ => Err(CoreError::InvalidPoolKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(PoolKind::Limited.threshold(), 90);
        assert_eq!(PoolKind::Weapon.threshold(), 80);
        assert_eq!(PoolKind::Standard.threshold(), 90);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Limited".parse::<PoolKind>().unwrap(), PoolKind::Limited);
        assert_eq!(" WEAPON ".parse::<PoolKind>().unwrap(), PoolKind::Weapon);
        assert_eq!("standard".parse::<PoolKind>().unwrap(), PoolKind::Standard);
        assert_eq!("character".parse::<PoolKind>().unwrap(), PoolKind::Limited);
    }

    #[test]
    fn unknown_pool_is_rejected() {
        let err = "chronicled".parse::<PoolKind>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidPoolKind(ref name) if name == "chronicled"));
    }

    #[test]
    fn display_matches_snapshot_keys() {
        for pool in PoolKind::ALL {
            assert_eq!(pool.to_string(), pool.as_str());
        }
    }
}
