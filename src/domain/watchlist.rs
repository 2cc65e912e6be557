//! Watchlist
//!
//! Tracks recently graduated tokens until they either qualify for an alert or
//! age out. Alerted contract addresses are suppressed for the life of the
//! process, so a token is alerted at most once.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::pair::DexPair;

/// A token under observation
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEntry {
    /// Pair creation time (ms), used as the age anchor
    pub first_seen_ms: i64,
    pub alert_sent: bool,
    pub symbol: String,
    /// Latest pair data from the search feed
    pub pair_snapshot: Option<DexPair>,
}

impl WatchEntry {
    pub fn age_minutes(&self, now_ms: i64) -> f64 {
        (now_ms - self.first_seen_ms) as f64 / 60_000.0
    }
}

/// Lightweight view of an entry for status endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchSummary {
    pub ca: String,
    pub symbol: String,
    pub age_minutes: f64,
}

#[derive(Debug, Default)]
pub struct Watchlist {
    entries: HashMap<String, WatchEntry>,
    seen_forever: HashSet<String>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry or refresh the snapshot of an existing one.
    /// Returns `true` when a new entry was created. Suppressed CAs are ignored.
    pub fn observe(&mut self, ca: &str, pair: DexPair, created_ms: i64) -> bool {
        if self.is_suppressed(ca) {
            return false;
        }

        match self.entries.get_mut(ca) {
            Some(entry) => {
                if entry.symbol.is_empty() {
                    entry.symbol = pair.symbol().unwrap_or_default().to_string();
                }
                entry.pair_snapshot = Some(pair);
                false
            }
            None => {
                let symbol = pair.symbol().unwrap_or_default().to_string();
                self.entries.insert(
                    ca.to_string(),
                    WatchEntry {
                        first_seen_ms: created_ms,
                        alert_sent: false,
                        symbol,
                        pair_snapshot: Some(pair),
                    },
                );
                true
            }
        }
    }

    /// Watch a mint that has not shown up in the search feed. Without a
    /// snapshot, its pair data is looked up by mint on evaluation.
    pub fn watch_manual(&mut self, ca: &str, now_ms: i64) -> bool {
        if self.is_suppressed(ca) || self.entries.contains_key(ca) {
            return false;
        }
        self.entries.insert(
            ca.to_string(),
            WatchEntry {
                first_seen_ms: now_ms,
                alert_sent: false,
                symbol: String::new(),
                pair_snapshot: None,
            },
        );
        true
    }

    pub fn is_suppressed(&self, ca: &str) -> bool {
        self.seen_forever.contains(ca)
    }

    /// Record a delivered alert: flag the entry and suppress the CA forever
    pub fn mark_alerted(&mut self, ca: &str) {
        if let Some(entry) = self.entries.get_mut(ca) {
            entry.alert_sent = true;
        }
        self.seen_forever.insert(ca.to_string());
    }

    pub fn remove(&mut self, ca: &str) -> Option<WatchEntry> {
        self.entries.remove(ca)
    }

    /// Drop entries older than `max_minutes`. Returns the removed CAs.
    pub fn expire(&mut self, now_ms: i64, max_minutes: f64) -> Vec<String> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.age_minutes(now_ms) > max_minutes)
            .map(|(ca, _)| ca.clone())
            .collect();

        for ca in &expired {
            self.entries.remove(ca);
        }
        expired
    }

    pub fn get(&self, ca: &str) -> Option<&WatchEntry> {
        self.entries.get(ca)
    }

    /// Snapshot of all entries, safe to iterate while the list is mutated
    pub fn entries(&self) -> Vec<(String, WatchEntry)> {
        self.entries
            .iter()
            .map(|(ca, e)| (ca.clone(), e.clone()))
            .collect()
    }

    pub fn summaries(&self, now_ms: i64) -> Vec<WatchSummary> {
        let mut out: Vec<WatchSummary> = self
            .entries
            .iter()
            .map(|(ca, e)| WatchSummary {
                ca: ca.clone(),
                symbol: e.symbol.clone(),
                age_minutes: e.age_minutes(now_ms),
            })
            .collect();
        out.sort_by(|a, b| a.age_minutes.total_cmp(&b.age_minutes));
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn suppressed_count(&self) -> usize {
        self.seen_forever.len()
    }
}
