use async_trait::async_trait;
use thiserror::Error;

use crate::domain::DexPair;

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Empty response body")]
    EmptyBody,

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
}

/// Source of DEX pair listings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairSource: Send + Sync {
    /// Latest Solana pairs from the discovery feed
    async fn search_pairs(&self) -> Result<Vec<DexPair>, MarketDataError>;

    /// Highest 24h-volume pair for a token, if it has any
    async fn token_best_pair(&self, mint: &str) -> Result<Option<DexPair>, MarketDataError>;
}

/// Pick the pair with the largest 24h volume
pub fn best_by_volume(pairs: Vec<DexPair>) -> Option<DexPair> {
    pairs
        .into_iter()
        .max_by(|a, b| a.volume_24h().total_cmp(&b.volume_24h()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pair::Volume;

    fn with_volume(dex: &str, h24: Option<f64>) -> DexPair {
        DexPair {
            dex_id: Some(dex.into()),
            volume: Some(Volume { h24 }),
            ..Default::default()
        }
    }

    #[test]
    fn test_best_by_volume() {
        let pairs = vec![
            with_volume("a", Some(10.0)),
            with_volume("b", Some(500.0)),
            with_volume("c", None),
        ];
        let best = best_by_volume(pairs).unwrap();
        assert_eq!(best.dex_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_best_by_volume_empty() {
        assert!(best_by_volume(Vec::new()).is_none());
    }

    #[test]
    fn test_error_display() {
        let err = MarketDataError::Status { status: 503, message: "down".into() };
        assert_eq!(err.to_string(), "Unexpected status 503: down");
        assert!(MarketDataError::RateLimited { attempts: 3 }.to_string().contains("3 attempts"));
    }
}
