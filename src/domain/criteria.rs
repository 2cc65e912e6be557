//! Alert Criteria
//!
//! Thresholds a graduate has to clear before it is alerted. Checks run in two
//! stages: the cheap market check on DexScreener numbers, then the on-chain
//! holder check, which costs RPC calls and only runs for tokens that passed
//! the first stage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-chain holder distribution for a mint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HolderStats {
    /// Total supply in UI units
    pub supply: f64,
    /// Number of holders
    pub holders: u64,
    /// Share of supply held by the ten largest accounts (0-100)
    pub top10_pct: f64,
}

/// Why a watched token did not (yet) qualify
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("FDV ${fdv:.0} outside [{min:.0}, {max:.0}]")]
    FdvOutOfRange { fdv: f64, min: f64, max: f64 },
    #[error("24h volume ${volume:.0} below {min:.0}")]
    VolumeTooLow { volume: f64, min: f64 },
    #[error("{holders} holders below {min}")]
    TooFewHolders { holders: u64, min: u64 },
    #[error("top 10 hold {pct:.2}% (max {max:.2}%)")]
    TooConcentrated { pct: f64, max: f64 },
}

/// Alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertCriteria {
    pub min_fdv: f64,
    pub max_fdv: f64,
    pub min_volume_24h: f64,
    pub max_top10_pct: f64,
    pub min_holders: u64,
    /// Tokens older than this are neither added nor kept
    pub max_watch_minutes: f64,
}

impl Default for AlertCriteria {
    fn default() -> Self {
        Self {
            min_fdv: 80_000.0,
            max_fdv: 300_000.0,
            min_volume_24h: 200_000.0,
            max_top10_pct: 25.0,
            min_holders: 250,
            max_watch_minutes: 60.0,
        }
    }
}

impl AlertCriteria {
    /// Stage 1: FDV band (inclusive) and minimum 24h volume
    pub fn check_market(&self, fdv: f64, volume_24h: f64) -> Result<(), Rejection> {
        if !(self.min_fdv <= fdv && fdv <= self.max_fdv) {
            return Err(Rejection::FdvOutOfRange {
                fdv,
                min: self.min_fdv,
                max: self.max_fdv,
            });
        }
        if volume_24h < self.min_volume_24h {
            return Err(Rejection::VolumeTooLow {
                volume: volume_24h,
                min: self.min_volume_24h,
            });
        }
        Ok(())
    }

    /// Stage 2: holder count and top-10 concentration
    pub fn check_holders(&self, stats: &HolderStats) -> Result<(), Rejection> {
        if stats.holders < self.min_holders {
            return Err(Rejection::TooFewHolders {
                holders: stats.holders,
                min: self.min_holders,
            });
        }
        if stats.top10_pct > self.max_top10_pct {
            return Err(Rejection::TooConcentrated {
                pct: stats.top10_pct,
                max: self.max_top10_pct,
            });
        }
        Ok(())
    }

    pub fn is_expired(&self, age_minutes: f64) -> bool {
        age_minutes > self.max_watch_minutes
    }
}
