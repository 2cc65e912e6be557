//! DexScreener Client
//!
//! Polls the Solana search feed and the per-token pairs endpoint.
//!
//! Features:
//! - Rate limiting (DexScreener allows roughly 60 RPM on public endpoints)
//! - Retry with exponential backoff and jitter on 429 / 5xx
//! - Per-endpoint request timeouts

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;

use super::rate_limit::RateLimiter;
use crate::config::loader::DexScreenerSection;
use crate::domain::{DexPair, PairsResponse};
use crate::ports::{best_by_volume, MarketDataError, PairSource};

/// Client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    pub search_url: String,
    /// Prefix, the mint is appended
    pub token_url: String,
    pub search_timeout: Duration,
    pub token_timeout: Duration,
    pub rate_limit_rpm: u32,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self::from(&DexScreenerSection::default())
    }
}

impl From<&DexScreenerSection> for DexScreenerConfig {
    fn from(section: &DexScreenerSection) -> Self {
        Self {
            search_url: section.search_url.clone(),
            token_url: section.token_url.clone(),
            search_timeout: Duration::from_secs(section.search_timeout_secs),
            token_timeout: Duration::from_secs(section.token_timeout_secs),
            rate_limit_rpm: section.rate_limit_rpm,
            max_retries: section.max_retries.max(1),
            retry_base_delay_ms: section.retry_base_delay_ms,
        }
    }
}

/// DexScreener REST client
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl DexScreenerClient {
    pub fn new(config: DexScreenerConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .user_agent(concat!("graduate-watcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketDataError::Http(e.to_string()))?;

        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(config.rate_limit_rpm)));

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    /// All pairs from the Solana search feed
    pub async fn fetch_search(&self) -> Result<Vec<DexPair>, MarketDataError> {
        let response = self
            .get_pairs(&self.config.search_url, self.config.search_timeout)
            .await?;
        tracing::debug!("DexScreener search returned {} pairs", response.pairs.len());
        Ok(response.pairs)
    }

    /// All pairs trading a given token
    pub async fn fetch_token_pairs(&self, mint: &str) -> Result<Vec<DexPair>, MarketDataError> {
        let url = format!("{}{}", self.config.token_url, mint);
        let response = self.get_pairs(&url, self.config.token_timeout).await?;
        Ok(response.pairs)
    }

    /// GET a pairs envelope with rate limiting and retries
    async fn get_pairs(&self, url: &str, timeout: Duration) -> Result<PairsResponse, MarketDataError> {
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 0..max_retries {
            self.rate_limiter.lock().await.wait_if_needed().await;

            let response = match self.http.get(url).timeout(timeout).send().await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(
                        "DexScreener request failed: {} (attempt {}/{})",
                        e,
                        attempt + 1,
                        max_retries
                    );
                    last_error = Some(MarketDataError::Http(e.to_string()));
                    self.backoff(attempt).await;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!(
                    "DexScreener rate limited (429), backing off (attempt {}/{})",
                    attempt + 1,
                    max_retries
                );
                last_error = Some(MarketDataError::RateLimited { attempts: attempt + 1 });
                self.backoff(attempt).await;
                continue;
            }

            if status.is_server_error() {
                last_error = Some(MarketDataError::Status {
                    status: status.as_u16(),
                    message: "server error".to_string(),
                });
                self.backoff(attempt).await;
                continue;
            }

            if status != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                return Err(MarketDataError::Status {
                    status: status.as_u16(),
                    message: truncate(&body, 200),
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| MarketDataError::Http(e.to_string()))?;

            if body.trim().is_empty() {
                return Err(MarketDataError::EmptyBody);
            }

            return serde_json::from_str::<PairsResponse>(&body)
                .map_err(|e| MarketDataError::Parse(e.to_string()));
        }

        Err(last_error.unwrap_or(MarketDataError::RateLimited { attempts: max_retries }))
    }

    /// Sleep `base * 2^attempt` plus up to half of `base` in jitter.
    /// No sleep after the last attempt.
    async fn backoff(&self, attempt: u32) {
        if attempt + 1 >= self.config.max_retries {
            return;
        }
        let base = self.config.retry_base_delay_ms;
        let jitter = if base > 1 {
            rand::thread_rng().gen_range(0..=base / 2)
        } else {
            0
        };
        let delay = base.saturating_mul(2u64.saturating_pow(attempt)) + jitter;
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

#[async_trait]
impl PairSource for DexScreenerClient {
    async fn search_pairs(&self) -> Result<Vec<DexPair>, MarketDataError> {
        self.fetch_search().await
    }

    async fn token_best_pair(&self, mint: &str) -> Result<Option<DexPair>, MarketDataError> {
        let pairs = self.fetch_token_pairs(mint).await?;
        Ok(best_by_volume(pairs))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...[truncated]", head)
    } else {
        s.to_string()
    }
}
