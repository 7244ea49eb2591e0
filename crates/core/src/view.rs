//! Renderable per-pool state for front-ends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pool::{PoolKind, MAX_FATE_POINTS};
use crate::state::LedgerSnapshot;

/// Pool-specific part of a [`PoolView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolDetail {
    Limited { guaranteed: bool, won_tiebreak: bool },
    Weapon { fate_points: u8, max_fate_points: u8 },
    Standard,
}

/// Everything a front-end needs to draw one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolView {
    pub pool: PoolKind,
    pub pity: u32,
    pub threshold: u32,
    /// Pulls left until the threshold.
    pub pulls_to_next: u32,
    pub detail: PoolDetail,
}

impl PoolView {
    pub fn of(snapshot: &LedgerSnapshot, pool: PoolKind) -> Self {
        let pity = snapshot.pity(pool);
        let threshold = pool.threshold();
        let detail = match pool {
            PoolKind::Limited => PoolDetail::Limited {
                guaranteed: snapshot.limited.guaranteed,
                won_tiebreak: snapshot.limited.won_tiebreak,
            },
            PoolKind::Weapon => PoolDetail::Weapon {
                fate_points: snapshot.weapon.fate_points,
                max_fate_points: MAX_FATE_POINTS,
            },
            PoolKind::Standard => PoolDetail::Standard,
        };
        Self {
            pool,
            pity,
            threshold,
            pulls_to_next: threshold.saturating_sub(pity),
            detail,
        }
    }

    /// Pity line, e.g. `12 / 90 (Pulls to next: 78)`.
    pub fn pity_line(&self) -> String {
        format!(
            "{} / {} (Pulls to next: {})",
            self.pity, self.threshold, self.pulls_to_next
        )
    }

    /// Secondary status line, absent for the standard pool.
    pub fn status_line(&self) -> Option<String> {
        match self.detail {
            PoolDetail::Limited {
                guaranteed,
                won_tiebreak,
            } => Some(format!(
                "Guaranteed: {} | Won 50/50: {}",
                yes_no(guaranteed),
                yes_no(won_tiebreak)
            )),
            PoolDetail::Weapon {
                fate_points,
                max_fate_points,
            } => Some(format!("Fate Points: {fate_points} / {max_fate_points}")),
            PoolDetail::Standard => None,
        }
    }
}

impl fmt::Display for PoolView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 5★ Pity: {}", self.pool, self.pity_line())?;
        if let Some(status) = self.status_line() {
            write!(f, "\n  {status}")?;
        }
        Ok(())
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
