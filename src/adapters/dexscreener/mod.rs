//! DexScreener Adapter
//!
//! REST client for pair discovery, implementing `PairSource`.

pub mod client;
pub mod rate_limit;

pub use client::{DexScreenerClient, DexScreenerConfig};
pub use rate_limit::RateLimiter;
