//! Graduate Watcher Library
//!
//! Watches freshly graduated pump.fun tokens on DexScreener and alerts the
//! ones that reach the FDV, volume and holder thresholds.
//!
//! # Modules
//!
//! - `domain`: Pair model, alert criteria, watchlist, alert text
//! - `ports`: Trait abstractions (PairSource, HolderSource, Notifier)
//! - `adapters`: External implementations (DexScreener, Solana RPC, Telegram, HTTP, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: The graduate monitor

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
