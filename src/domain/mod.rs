//! Domain Layer - Core watcher logic
//!
//! Pure types and rules with no I/O. External lookups happen through the
//! ports layer.
//!
//! - `pair`: DexScreener pair model and pump.fun graduate detection
//! - `criteria`: Alert thresholds and holder statistics
//! - `watchlist`: Watched tokens and permanent alert suppression
//! - `alert`: Telegram alert rendering

pub mod pair;
pub mod criteria;
pub mod watchlist;
pub mod alert;

pub use pair::{DexPair, PairsResponse, BaseToken, PairInfo};
pub use criteria::{AlertCriteria, HolderStats, Rejection};
pub use watchlist::{Watchlist, WatchEntry, WatchSummary};
pub use alert::{GraduateAlert, group_thousands};
