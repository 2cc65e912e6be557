//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - DEX pair discovery (DexScreener)
//! - On-chain holder statistics (Solana RPC)
//! - Alert delivery (Telegram)

pub mod market_data;
pub mod holders;
pub mod notifier;
pub mod mocks;

pub use market_data::{PairSource, MarketDataError, best_by_volume};
pub use holders::{HolderSource, HolderError};
pub use notifier::{Notifier, NotifyError};
