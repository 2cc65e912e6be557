//! Graduate Watcher - pump.fun graduate alerts
//!
//! Polls DexScreener for freshly graduated pump.fun tokens and sends a
//! Telegram alert for each one that passes the market and holder checks.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing_subscriber::{fmt, EnvFilter};

use graduate_watcher::adapters::cli::{self, CheckConfigCmd, CliApp, Command, HoldersCmd, RunCmd, ScanCmd};
use graduate_watcher::adapters::http;
use graduate_watcher::adapters::{AlertNotifier, DexScreenerClient, DexScreenerConfig, SolanaHolderClient};
use graduate_watcher::application::GraduateMonitor;
use graduate_watcher::config::{resolve_config, Config};
use graduate_watcher::ports::{HolderSource, PairSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in watcher.toml)
    dotenvy::dotenv().ok();

    let app = cli::init();
    let (config, config_path) = resolve_config(app.command.config_path())
        .context("Failed to load configuration")?;
    init_logging(&app, &config)?;

    match &config_path {
        Some(path) => tracing::debug!("Configuration loaded from {}", path.display()),
        None => tracing::debug!("No config file, using defaults and environment"),
    }

    match app.command {
        Command::Run(cmd) => run_command(cmd, config).await,
        Command::Scan(cmd) => scan_command(cmd, config).await,
        Command::Holders(cmd) => holders_command(cmd, config).await,
        Command::CheckConfig(cmd) => check_config_command(cmd, config, config_path),
    }
}

/// RUST_LOG wins, then --debug / --verbose, then `logging.level`
fn init_logging(app: &CliApp, config: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if app.debug => EnvFilter::new("debug"),
        Err(_) if app.verbose => EnvFilter::new("info"),
        Err(_) => EnvFilter::try_new(&config.logging.level)
            .with_context(|| format!("Invalid log level '{}'", config.logging.level))?,
    };

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stdout);
    if app.json_logs || config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run_command(cmd: RunCmd, mut config: Config) -> Result<()> {
    if let Some(port) = cmd.port {
        config.server.port = port;
    }

    tracing::info!("Starting graduate watcher...");

    let pairs = DexScreenerClient::new(DexScreenerConfig::from(&config.dexscreener))
        .context("Failed to create DexScreener client")?;
    let holders = SolanaHolderClient::from_config(&config.solana);
    let notifier = AlertNotifier::from_config(&config.telegram)
        .context("Failed to create notifier")?;

    let monitor = GraduateMonitor::new(pairs, holders, notifier, config.thresholds.clone())
        .with_poll_interval(Duration::from_secs(config.monitor.poll_interval_secs))
        .with_startup_message(config.monitor.startup_message);

    for mint in &cmd.watch {
        if monitor.watch_mint(mint).await {
            tracing::info!("Watching {} (manual)", mint);
        }
    }

    if cmd.once {
        let report = monitor.tick().await;
        println!(
            "Searched {} pairs, {} graduates, {} new, {} evaluated, {} alerted, {} expired",
            report.search.searched,
            report.search.graduates,
            report.search.added,
            report.evaluation.evaluated,
            report.evaluation.alerted.len(),
            report.evaluation.expired
        );
        if let Some(err) = report.search_error {
            println!("Search error: {}", err);
        }
        return Ok(());
    }

    // Bind before starting anything so a taken port fails the command
    let listener = if config.server.enabled {
        let addr = config.server.bind_addr();
        Some(
            http::bind(&addr)
                .await
                .with_context(|| format!("Failed to start keepalive server on {}", addr))?,
        )
    } else {
        tracing::info!("Keepalive server disabled");
        None
    };

    // Setup Ctrl+C handler
    let stopper = monitor.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        stopper.stop().await;
    });

    match listener {
        Some(listener) => http::run_with_server(monitor, listener)
            .await
            .context("Keepalive server failed")?,
        None => monitor.run().await,
    }

    tracing::info!("Graduate watcher stopped");
    Ok(())
}

async fn scan_command(cmd: ScanCmd, config: Config) -> Result<()> {
    let client = DexScreenerClient::new(DexScreenerConfig::from(&config.dexscreener))
        .context("Failed to create DexScreener client")?;

    let pairs = client.search_pairs().await.context("DexScreener search failed")?;
    let now_ms = Utc::now().timestamp_millis();
    let criteria = &config.thresholds;

    let candidates: Vec<_> = pairs
        .iter()
        .filter(|p| p.is_pumpfun_graduate() && p.base_address().is_some())
        .collect();

    println!(
        "{} pairs searched, {} pump.fun graduates",
        pairs.len(),
        candidates.len()
    );
    println!(
        "{:<10} {:<46} {:>14} {:>14} {:>8}  {}",
        "SYMBOL", "CA", "FDV", "VOL 24H", "AGE", "MARKET"
    );

    for pair in candidates.into_iter().take(cmd.limit) {
        let ca = pair.base_address().unwrap_or_default();
        let age = pair.age_minutes(now_ms);
        let market = if criteria.is_expired(age) {
            "expired".to_string()
        } else {
            match criteria.check_market(pair.fdv(), pair.volume_24h()) {
                Ok(()) => "ok".to_string(),
                Err(reason) => reason.to_string(),
            }
        };

        println!(
            "{:<10} {:<46} {:>14.0} {:>14.0} {:>6.0}m  {}",
            pair.symbol_or(ca),
            ca,
            pair.fdv(),
            pair.volume_24h(),
            age,
            market
        );
    }

    Ok(())
}

async fn holders_command(cmd: HoldersCmd, config: Config) -> Result<()> {
    let client = SolanaHolderClient::from_config(&config.solana);

    let stats = client
        .holder_stats(&cmd.mint)
        .await
        .with_context(|| format!("Holder lookup failed for {}", cmd.mint))?;

    println!("Mint:     {}", cmd.mint);
    println!("Supply:   {:.2}", stats.supply);
    println!("Holders:  {}", stats.holders);
    println!("Top 10:   {:.2}%", stats.top10_pct);

    match config.thresholds.check_holders(&stats) {
        Ok(()) => println!("Holder check: pass"),
        Err(reason) => println!("Holder check: {}", reason),
    }

    Ok(())
}

fn check_config_command(
    _cmd: CheckConfigCmd,
    config: Config,
    path: Option<std::path::PathBuf>,
) -> Result<()> {
    match path {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# No config file, defaults plus environment"),
    }

    let rendered = toml::to_string_pretty(&config.redacted())
        .context("Failed to render configuration")?;
    println!("{}", rendered);

    if config.telegram.credentials().is_none() {
        println!("# Telegram not configured - alerts go to the log only");
    }
    println!("# Configuration OK");
    Ok(())
}
