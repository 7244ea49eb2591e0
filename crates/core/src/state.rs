//! Per-pool pity state and the persisted ledger snapshot.
//!
//! Field names are part of the on-disk format and stay fixed across
//! versions so files written by earlier releases keep loading. Every field
//! defaults when absent and unknown fields are ignored.

use serde::{Deserialize, Serialize};

use crate::pool::{PoolKind, MAX_FATE_POINTS};

// ---------------------------------------------------------------------------
// Pool states
// ---------------------------------------------------------------------------

/// Limited-time pool: pity plus the 50/50 guarantee flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitedState {
    /// Pulls since the last 5★.
    #[serde(rename = "5star_pity")]
    pub pity: u32,
    /// Outcome of the most recent trigger.
    #[serde(rename = "won_5050")]
    pub won_tiebreak: bool,
    /// Next trigger skips the 50/50 and counts as a win.
    pub guaranteed: bool,
}

/// Weapon pool: pity plus accumulated fate points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponState {
    #[serde(rename = "5star_pity")]
    pub pity: u32,
    /// Capped at [`MAX_FATE_POINTS`].
    pub fate_points: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardState {
    #[serde(rename = "5star_pity")]
    pub pity: u32,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything persisted for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    #[serde(rename = "Limited")]
    pub limited: LimitedState,
    #[serde(rename = "Weapon")]
    pub weapon: WeaponState,
    #[serde(rename = "Standard")]
    pub standard: StandardState,
}

impl LedgerSnapshot {
    pub fn pity(&self, pool: PoolKind) -> u32 {
        match pool {
            PoolKind::Limited => self.limited.pity,
            PoolKind::Weapon => self.weapon.pity,
            PoolKind::Standard => self.standard.pity,
        }
    }

    pub(crate) fn pity_mut(&mut self, pool: PoolKind) -> &mut u32 {
        match pool {
            PoolKind::Limited => &mut self.limited.pity,
            PoolKind::Weapon => &mut self.weapon.pity,
            PoolKind::Standard => &mut self.standard.pity,
        }
    }

    /// Clamp a loaded snapshot back into the ledger invariants.
    ///
    /// A pity at or past its threshold is reset to 0 (the trigger already
    /// happened) and fate points are capped. Returns the repaired snapshot
    /// and whether anything changed.
    pub fn normalized(mut self) -> (Self, bool) {
        let mut changed = false;
        for pool in PoolKind::ALL {
            let pity = self.pity_mut(pool);
            if *pity >= pool.threshold() {
                *pity = 0;
                changed = true;
            }
        }
        if self.weapon.fate_points > MAX_FATE_POINTS {
            self.weapon.fate_points = MAX_FATE_POINTS;
            changed = true;
        }
        (self, changed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
