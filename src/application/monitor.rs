//! Graduate Monitor
//!
//! Coordinates DexScreener discovery, on-chain holder checks and alert
//! delivery. Each tick refreshes the watchlist from the search feed, then
//! evaluates every watched token against the alert criteria.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Notify, RwLock};

use crate::domain::{AlertCriteria, DexPair, GraduateAlert, WatchSummary, Watchlist};
use crate::ports::{HolderSource, MarketDataError, Notifier, PairSource};

/// Sent once when the loop starts, if enabled
pub const STARTUP_MESSAGE: &str = "🚀 Graduate monitor started";

/// Outcome of one search pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchReport {
    /// Pairs returned by the feed
    pub searched: usize,
    /// Pump.fun graduates among them
    pub graduates: usize,
    /// New watchlist entries
    pub added: usize,
}

/// Outcome of one evaluation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    pub evaluated: usize,
    pub alerted: Vec<String>,
    pub expired: usize,
    /// Token lookup, holder lookup and delivery failures
    pub failures: Vec<String>,
}

/// Outcome of a full tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub search: SearchReport,
    pub evaluation: EvaluationReport,
    pub search_error: Option<String>,
}

/// Status snapshot of the monitor
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub is_running: bool,
    pub started_at: DateTime<Utc>,
    pub ticks: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub alerts_sent: u64,
    pub watchlist_len: usize,
    pub suppressed: usize,
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct Counters {
    started_at: DateTime<Utc>,
    ticks: u64,
    last_tick_at: Option<DateTime<Utc>>,
    alerts_sent: u64,
    last_error: Option<String>,
}

/// Watches pump.fun graduates and alerts the ones that qualify
pub struct GraduateMonitor<P, H, N> {
    pairs: Arc<P>,
    holders: Arc<H>,
    notifier: Arc<N>,
    criteria: AlertCriteria,
    watchlist: Arc<RwLock<Watchlist>>,
    counters: Arc<RwLock<Counters>>,
    is_running: Arc<RwLock<bool>>,
    stop_requested: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
    poll_interval: Duration,
    startup_message: bool,
}

impl<P, H, N> GraduateMonitor<P, H, N>
where
    P: PairSource,
    H: HolderSource,
    N: Notifier,
{
    pub fn new(pairs: P, holders: H, notifier: N, criteria: AlertCriteria) -> Self {
        Self {
            pairs: Arc::new(pairs),
            holders: Arc::new(holders),
            notifier: Arc::new(notifier),
            criteria,
            watchlist: Arc::new(RwLock::new(Watchlist::new())),
            counters: Arc::new(RwLock::new(Counters {
                started_at: Utc::now(),
                ticks: 0,
                last_tick_at: None,
                alerts_sent: 0,
                last_error: None,
            })),
            is_running: Arc::new(RwLock::new(false)),
            stop_requested: Arc::new(RwLock::new(false)),
            shutdown: Arc::new(Notify::new()),
            poll_interval: Duration::from_secs(60),
            startup_message: false,
        }
    }

    /// Set custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_startup_message(mut self, enabled: bool) -> Self {
        self.startup_message = enabled;
        self
    }

    /// Run the main monitoring loop until `stop` is called.
    /// Returns at once if `stop` was already called.
    pub async fn run(&self) {
        {
            let mut running = self.is_running.write().await;
            if *self.stop_requested.read().await {
                tracing::info!("Graduate monitor stopped before start");
                return;
            }
            *running = true;
        }

        tracing::info!(
            "Starting graduate monitor - poll interval: {:?}, notifier: {}",
            self.poll_interval,
            self.notifier.name()
        );

        if self.startup_message {
            if let Err(e) = self.notifier.send(STARTUP_MESSAGE).await {
                tracing::warn!("Startup message failed: {}", e);
            }
        }

        while *self.is_running.read().await {
            let report = self.tick().await;
            tracing::debug!(?report, "Tick complete");

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.shutdown.notified() => {}
            }
        }

        tracing::info!("Graduate monitor stopped");
    }

    /// Stop the monitoring loop, interrupting any pending sleep
    pub async fn stop(&self) {
        *self.stop_requested.write().await = true;
        *self.is_running.write().await = false;
        self.shutdown.notify_one();
        tracing::info!("Stop signal sent to monitor");
    }

    /// One cycle at the current wall-clock time
    pub async fn tick(&self) -> TickReport {
        self.tick_at(Utc::now().timestamp_millis()).await
    }

    /// One cycle: refresh from search, then evaluate. Never fails; a failed
    /// search is recorded and evaluation still runs on the existing entries.
    pub async fn tick_at(&self, now_ms: i64) -> TickReport {
        let mut report = TickReport::default();

        match self.update_watchlist_from_search(now_ms).await {
            Ok(search) => report.search = search,
            Err(e) => {
                tracing::warn!("DexScreener search failed: {}", e);
                report.search_error = Some(e.to_string());
            }
        }

        report.evaluation = self.evaluate_watchlist(now_ms).await;

        let mut counters = self.counters.write().await;
        counters.ticks += 1;
        counters.last_tick_at = DateTime::from_timestamp_millis(now_ms);
        counters.alerts_sent += report.evaluation.alerted.len() as u64;
        // Cleared by a tick without failures
        counters.last_error = report
            .search_error
            .clone()
            .or_else(|| report.evaluation.failures.last().cloned());

        report
    }

    /// Scan the search feed and add or refresh pump.fun graduates
    pub async fn update_watchlist_from_search(
        &self,
        now_ms: i64,
    ) -> Result<SearchReport, MarketDataError> {
        let pairs = self.pairs.search_pairs().await?;
        let mut report = SearchReport {
            searched: pairs.len(),
            ..Default::default()
        };

        let mut watchlist = self.watchlist.write().await;
        for pair in pairs {
            if !pair.is_pumpfun_graduate() {
                continue;
            }
            let Some(ca) = pair.base_address().map(str::to_string) else {
                continue;
            };
            report.graduates += 1;

            let created_ms = pair.created_at_ms(now_ms);
            let age_minutes = (now_ms - created_ms) as f64 / 60_000.0;
            if self.criteria.is_expired(age_minutes) || watchlist.is_suppressed(&ca) {
                continue;
            }

            let symbol = pair.symbol_or(&ca);
            if watchlist.observe(&ca, pair, created_ms) {
                report.added += 1;
                tracing::info!("Watching {} ({}) - age {:.0} min", symbol, ca, age_minutes);
            }
        }

        Ok(report)
    }

    /// Evaluate every watched token; alert, expire or keep it
    pub async fn evaluate_watchlist(&self, now_ms: i64) -> EvaluationReport {
        let mut report = EvaluationReport::default();
        let entries = {
            let mut watchlist = self.watchlist.write().await;
            let expired = watchlist.expire(now_ms, self.criteria.max_watch_minutes);
            for ca in &expired {
                tracing::debug!("{} aged out", ca);
            }
            report.expired = expired.len();
            watchlist.entries()
        };
        let mut to_remove = Vec::new();

        for (ca, entry) in entries {
            let age_minutes = entry.age_minutes(now_ms);
            report.evaluated += 1;

            let pair = match self.current_pair(&ca, entry.pair_snapshot).await {
                Ok(Some(pair)) => pair,
                Ok(None) => {
                    tracing::debug!("No pairs listed yet for {}", ca);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Token lookup failed for {}: {}", ca, e);
                    report.failures.push(format!("token lookup for {}: {}", ca, e));
                    continue;
                }
            };

            if let Err(reason) = self.criteria.check_market(pair.fdv(), pair.volume_24h()) {
                tracing::debug!("{} not yet: {}", ca, reason);
                continue;
            }

            let stats = match self.holders.holder_stats(&ca).await {
                Ok(stats) => stats,
                Err(e) => {
                    tracing::warn!("Holder lookup failed for {}: {}", ca, e);
                    report.failures.push(format!("holder lookup for {}: {}", ca, e));
                    continue;
                }
            };

            if let Err(reason) = self.criteria.check_holders(&stats) {
                tracing::debug!("{} not yet: {}", ca, reason);
                continue;
            }

            if entry.alert_sent {
                continue;
            }

            let alert = GraduateAlert::from_pair(&ca, &pair, &stats, age_minutes);
            match self.notifier.send(&alert.render_markdown()).await {
                Ok(()) => {
                    tracing::info!(
                        "ALERT {} ({}) - FDV ${:.0}, holders {}, top10 {:.2}%",
                        alert.symbol,
                        ca,
                        alert.fdv,
                        alert.holders,
                        alert.top10_pct
                    );
                    self.watchlist.write().await.mark_alerted(&ca);
                    report.alerted.push(ca.clone());
                    to_remove.push(ca);
                }
                Err(e) => {
                    // Entry stays, the alert is retried next tick
                    tracing::warn!("Alert delivery via {} failed for {}: {}", self.notifier.name(), ca, e);
                    report.failures.push(format!("alert delivery for {}: {}", ca, e));
                }
            }
        }

        if !to_remove.is_empty() {
            let mut watchlist = self.watchlist.write().await;
            for ca in &to_remove {
                watchlist.remove(ca);
            }
        }

        report
    }

    /// Snapshot from the search feed, or the best pair from the token endpoint
    async fn current_pair(
        &self,
        ca: &str,
        snapshot: Option<DexPair>,
    ) -> Result<Option<DexPair>, MarketDataError> {
        match snapshot {
            Some(pair) => Ok(Some(pair)),
            None => self.pairs.token_best_pair(ca).await,
        }
    }

    /// Add a mint to the watchlist by hand
    pub async fn watch_mint(&self, ca: &str) -> bool {
        self.watch_mint_at(ca, Utc::now().timestamp_millis()).await
    }

    pub async fn watch_mint_at(&self, ca: &str, now_ms: i64) -> bool {
        self.watchlist.write().await.watch_manual(ca, now_ms)
    }

    /// Get current status snapshot
    pub async fn status(&self) -> MonitorStatus {
        let counters = self.counters.read().await;
        let watchlist = self.watchlist.read().await;

        MonitorStatus {
            is_running: *self.is_running.read().await,
            started_at: counters.started_at,
            ticks: counters.ticks,
            last_tick_at: counters.last_tick_at,
            alerts_sent: counters.alerts_sent,
            watchlist_len: watchlist.len(),
            suppressed: watchlist.suppressed_count(),
            last_error: counters.last_error.clone(),
        }
    }

    pub async fn watchlist_snapshot(&self) -> Vec<WatchSummary> {
        self.watchlist
            .read()
            .await
            .summaries(Utc::now().timestamp_millis())
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}

// Clones share all state (needed for sharing across tasks)
impl<P, H, N> Clone for GraduateMonitor<P, H, N> {
    fn clone(&self) -> Self {
        Self {
            pairs: Arc::clone(&self.pairs),
            holders: Arc::clone(&self.holders),
            notifier: Arc::clone(&self.notifier),
            criteria: self.criteria.clone(),
            watchlist: Arc::clone(&self.watchlist),
            counters: Arc::clone(&self.counters),
            is_running: Arc::clone(&self.is_running),
            stop_requested: Arc::clone(&self.stop_requested),
            shutdown: Arc::clone(&self.shutdown),
            poll_interval: self.poll_interval,
            startup_message: self.startup_message,
        }
    }
}
