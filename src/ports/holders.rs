use async_trait::async_trait;
use thiserror::Error;

use crate::domain::HolderStats;

#[derive(Debug, Error)]
pub enum HolderError {
    #[error("Invalid mint address: {0}")]
    InvalidMint(String),

    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("All {0} RPC endpoints failed")]
    AllEndpointsFailed(usize),
}

/// On-chain holder distribution lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HolderSource: Send + Sync {
    async fn holder_stats(&self, mint: &str) -> Result<HolderStats, HolderError>;
}
