//! Graduate Monitor Integration Tests
//!
//! End-to-end flows through the monitor with in-memory ports:
//! 1. Search feed -> watchlist -> holder check -> alert
//! 2. Tokens that qualify late, tokens that age out
//! 3. Delivery failure and retry, permanent suppression
//!
//! All tests are deterministic (no network calls) and use injected time.

use graduate_watcher::application::GraduateMonitor;
use graduate_watcher::domain::pair::{BaseToken, Liquidity, PairInfo, Volume};
use graduate_watcher::domain::{AlertCriteria, DexPair, HolderStats};
use graduate_watcher::ports::mocks::{RecordingNotifier, StubHolderSource, StubPairSource};

// ============================================================================
// Test Fixtures
// ============================================================================

const NOW: i64 = 1_700_000_000_000;
const MINUTE: i64 = 60_000;

type TestMonitor = GraduateMonitor<StubPairSource, StubHolderSource, RecordingNotifier>;

fn graduate(ca: &str, symbol: &str, created_ms: i64, fdv: f64, volume: f64) -> DexPair {
    DexPair {
        chain_id: Some("solana".into()),
        dex_id: Some("raydium".into()),
        url: Some(format!("https://dexscreener.com/solana/{}", ca)),
        base_token: Some(BaseToken {
            address: Some(ca.into()),
            name: Some(symbol.into()),
            symbol: Some(symbol.into()),
        }),
        fdv: Some(fdv),
        volume: Some(Volume { h24: Some(volume) }),
        liquidity: Some(Liquidity { usd: Some(25_000.0) }),
        pair_created_at: Some(created_ms),
        info: Some(PairInfo {
            header: Some("https://cdn.example/pumpfun/banner.png".into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn healthy() -> HolderStats {
    HolderStats {
        supply: 1_000_000_000.0,
        holders: 420,
        top10_pct: 18.5,
    }
}

struct Harness {
    pairs: StubPairSource,
    holders: StubHolderSource,
    notifier: RecordingNotifier,
    monitor: TestMonitor,
}

fn harness() -> Harness {
    let pairs = StubPairSource::new().with_search(Vec::new());
    let holders = StubHolderSource::new();
    let notifier = RecordingNotifier::new();
    let monitor = GraduateMonitor::new(
        pairs.clone(),
        holders.clone(),
        notifier.clone(),
        AlertCriteria::default(),
    );

    Harness {
        pairs,
        holders,
        notifier,
        monitor,
    }
}

// ============================================================================
// Flows
// ============================================================================

#[tokio::test]
async fn test_graduate_is_alerted_with_full_text() {
    let h = harness();
    h.pairs
        .set_search(vec![graduate("MintDog", "DOG", NOW - 12 * MINUTE, 123_456.0, 654_321.0)]);
    h.holders.set_stats("MintDog", healthy());

    let report = h.monitor.tick_at(NOW).await;
    assert_eq!(report.evaluation.alerted, vec!["MintDog".to_string()]);

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    let text = &sent[0];
    assert!(text.starts_with("🔥 *Pump.fun Graduate Detected* 🔥"));
    assert!(text.contains("💠 *Token:* $DOG"));
    assert!(text.contains("🧾 *CA:* `MintDog`"));
    assert!(text.contains("💰 *Market Cap (FDV):* $123,456"));
    assert!(text.contains("📈 *24h Volume:* $654,321"));
    assert!(text.contains("💧 *Liquidity:* $25,000"));
    assert!(text.contains("🏦 *Top 10 wallets:* 18.50%"));
    assert!(text.contains("👥 *Holders:* 420"));
    assert!(text.contains("🕒 *Age:* 12 min"));
    assert!(text.contains("🧩 *DEX:* raydium"));
    assert!(text.ends_with("🔗 [DexScreener](https://dexscreener.com/solana/MintDog)"));
}

#[tokio::test]
async fn test_token_qualifying_later_is_alerted_once() {
    let h = harness();
    h.holders.set_stats("MintCat", healthy());

    // Too small at first
    h.pairs
        .set_search(vec![graduate("MintCat", "CAT", NOW - 5 * MINUTE, 40_000.0, 50_000.0)]);
    let first = h.monitor.tick_at(NOW).await;
    assert!(first.evaluation.alerted.is_empty());
    assert!(h.holders.calls().is_empty());

    // Refreshed snapshot passes
    h.pairs
        .set_search(vec![graduate("MintCat", "CAT", NOW - 5 * MINUTE, 95_000.0, 210_000.0)]);
    let second = h.monitor.tick_at(NOW + 2 * MINUTE).await;
    assert_eq!(second.evaluation.alerted, vec!["MintCat".to_string()]);

    // Still in the feed, never alerted again
    for i in 3..6 {
        let report = h.monitor.tick_at(NOW + i * MINUTE).await;
        assert!(report.evaluation.alerted.is_empty());
    }
    assert_eq!(h.notifier.sent().len(), 1);

    let status = h.monitor.status().await;
    assert_eq!(status.alerts_sent, 1);
    assert_eq!(status.suppressed, 1);
    assert_eq!(status.watchlist_len, 0);
}

#[tokio::test]
async fn test_concentrated_token_ages_out() {
    let h = harness();
    h.pairs
        .set_search(vec![graduate("MintWhale", "WHL", NOW - 55 * MINUTE, 150_000.0, 400_000.0)]);
    h.holders.set_stats(
        "MintWhale",
        HolderStats {
            supply: 1_000_000_000.0,
            holders: 900,
            top10_pct: 61.0,
        },
    );

    h.monitor.tick_at(NOW).await;
    assert_eq!(h.monitor.status().await.watchlist_len, 1);

    // Past the watch window: not re-added from search, removed from the list
    let report = h.monitor.tick_at(NOW + 6 * MINUTE).await;
    assert_eq!(report.evaluation.expired, 1);
    assert_eq!(report.search.added, 0);
    assert_eq!(h.monitor.status().await.watchlist_len, 0);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_failed_delivery_retries_next_tick() {
    let h = harness();
    h.pairs
        .set_search(vec![graduate("MintRetry", "RTY", NOW - MINUTE, 150_000.0, 400_000.0)]);
    h.holders.set_stats("MintRetry", healthy());
    h.notifier.set_failing(true);

    let first = h.monitor.tick_at(NOW).await;
    assert!(first.evaluation.alerted.is_empty());
    assert_eq!(h.monitor.status().await.watchlist_len, 1);
    assert_eq!(h.monitor.status().await.suppressed, 0);

    h.notifier.set_failing(false);
    let second = h.monitor.tick_at(NOW + MINUTE).await;
    assert_eq!(second.evaluation.alerted, vec!["MintRetry".to_string()]);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_unknown_holders_do_not_alert() {
    let h = harness();
    // No stats registered: the holder source fails
    h.pairs
        .set_search(vec![graduate("MintDark", "DRK", NOW - MINUTE, 150_000.0, 400_000.0)]);

    let report = h.monitor.tick_at(NOW).await;
    assert!(report.evaluation.alerted.is_empty());
    assert_eq!(h.holders.calls(), vec!["MintDark".to_string()]);
    assert_eq!(h.monitor.status().await.watchlist_len, 1);
}

#[tokio::test]
async fn test_search_outage_keeps_watchlist() {
    let h = harness();
    h.pairs
        .set_search(vec![graduate("MintKeep", "KEP", NOW - MINUTE, 10_000.0, 0.0)]);
    h.monitor.tick_at(NOW).await;

    h.pairs.fail_search();
    let report = h.monitor.tick_at(NOW + MINUTE).await;

    assert!(report.search_error.is_some());
    assert_eq!(report.evaluation.evaluated, 1);
    assert_eq!(h.monitor.status().await.watchlist_len, 1);
    assert!(h.monitor.status().await.last_error.is_some());
}

#[tokio::test]
async fn test_manual_watch_uses_token_lookup() {
    let pairs = StubPairSource::new().with_search(Vec::new()).with_token_pair(
        "MintManual",
        graduate("MintManual", "MAN", NOW - 90 * MINUTE, 200_000.0, 800_000.0),
    );
    let holders = StubHolderSource::new().with_stats("MintManual", healthy());
    let notifier = RecordingNotifier::new();
    let monitor = GraduateMonitor::new(
        pairs.clone(),
        holders,
        notifier.clone(),
        AlertCriteria::default(),
    );

    // Age is anchored at the time it was added by hand
    assert!(monitor.watch_mint_at("MintManual", NOW).await);
    assert!(!monitor.watch_mint_at("MintManual", NOW).await);

    let report = monitor.tick_at(NOW + MINUTE).await;
    assert_eq!(report.evaluation.alerted, vec!["MintManual".to_string()]);
    assert_eq!(pairs.token_calls(), vec!["MintManual".to_string()]);
    assert!(notifier.sent()[0].contains("🕒 *Age:* 1 min"));

    // Suppressed afterwards
    assert!(!monitor.watch_mint_at("MintManual", NOW + 2 * MINUTE).await);
}
