//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: pair discovery REST client
//! - Solana: holder statistics over RPC with endpoint rotation
//! - Telegram: alert delivery, with a log fallback
//! - HTTP: keepalive server and status endpoints
//! - CLI: Command-line interface definitions

pub mod dexscreener;
pub mod solana;
pub mod telegram;
pub mod http;
pub mod cli;

pub use dexscreener::{DexScreenerClient, DexScreenerConfig};
pub use solana::SolanaHolderClient;
pub use telegram::{AlertNotifier, LogNotifier, TelegramNotifier};
pub use cli::CliApp;
