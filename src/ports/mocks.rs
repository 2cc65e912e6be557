//! In-memory port implementations with controlled responses and call
//! recording. Used by integration tests and dry runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{DexPair, HolderStats};
use super::holders::{HolderError, HolderSource};
use super::market_data::{MarketDataError, PairSource};
use super::notifier::{NotifyError, Notifier};

/// Pair source serving a replaceable search feed and per-token pairs
#[derive(Debug, Clone, Default)]
pub struct StubPairSource {
    search: Arc<Mutex<Option<Vec<DexPair>>>>,
    tokens: Arc<Mutex<HashMap<String, DexPair>>>,
    token_calls: Arc<Mutex<Vec<String>>>,
}

impl StubPairSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the search feed
    pub fn with_search(self, pairs: Vec<DexPair>) -> Self {
        self.set_search(pairs);
        self
    }

    /// Builder method to set the token endpoint result for a mint
    pub fn with_token_pair(self, mint: &str, pair: DexPair) -> Self {
        self.tokens.lock().unwrap().insert(mint.to_string(), pair);
        self
    }

    pub fn set_search(&self, pairs: Vec<DexPair>) {
        *self.search.lock().unwrap() = Some(pairs);
    }

    /// Make the next searches fail
    pub fn fail_search(&self) {
        *self.search.lock().unwrap() = None;
    }

    /// Mints looked up through the token endpoint
    pub fn token_calls(&self) -> Vec<String> {
        self.token_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PairSource for StubPairSource {
    async fn search_pairs(&self) -> Result<Vec<DexPair>, MarketDataError> {
        self.search
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MarketDataError::Http("search unavailable".into()))
    }

    async fn token_best_pair(&self, mint: &str) -> Result<Option<DexPair>, MarketDataError> {
        self.token_calls.lock().unwrap().push(mint.to_string());
        Ok(self.tokens.lock().unwrap().get(mint).cloned())
    }
}

/// Holder source with fixed stats per mint. Unknown mints fail.
#[derive(Debug, Clone, Default)]
pub struct StubHolderSource {
    stats: Arc<Mutex<HashMap<String, HolderStats>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubHolderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats(self, mint: &str, stats: HolderStats) -> Self {
        self.set_stats(mint, stats);
        self
    }

    pub fn set_stats(&self, mint: &str, stats: HolderStats) {
        self.stats.lock().unwrap().insert(mint.to_string(), stats);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HolderSource for StubHolderSource {
    async fn holder_stats(&self, mint: &str) -> Result<HolderStats, HolderError> {
        self.calls.lock().unwrap().push(mint.to_string());
        self.stats
            .lock()
            .unwrap()
            .get(mint)
            .copied()
            .ok_or(HolderError::AllEndpointsFailed(1))
    }
}

/// Notifier that records every message. Can be switched to failing mode.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if *self.failing.lock().unwrap() {
            return Err(NotifyError::Rejected {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
