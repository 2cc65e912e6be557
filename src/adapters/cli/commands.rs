//! CLI Commands
//!
//! Argument definitions for the graduate watcher.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Graduate Watcher - pump.fun graduate alerts from DexScreener and on-chain data
#[derive(Parser, Debug)]
#[command(
    name = "graduate-watcher",
    version = env!("CARGO_PKG_VERSION"),
    about = "Watches pump.fun graduates on DexScreener and alerts the ones that qualify",
    long_about = "Polls DexScreener for freshly graduated pump.fun tokens, checks FDV, 24h volume \
                  and on-chain holder distribution, and sends a Telegram alert once per token."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the keepalive server and the monitor loop
    Run(RunCmd),

    /// One-shot DexScreener search listing graduate candidates
    Scan(ScanCmd),

    /// Print on-chain holder stats for a mint
    Holders(HoldersCmd),

    /// Load, validate and print the effective configuration
    CheckConfig(CheckConfigCmd),
}

impl Command {
    /// The `--config` value given to whichever command was chosen
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Run(cmd) => cmd.config.as_deref(),
            Command::Scan(cmd) => cmd.config.as_deref(),
            Command::Holders(cmd) => cmd.config.as_deref(),
            Command::CheckConfig(cmd) => cmd.config.as_deref(),
        }
    }
}

/// Start the watcher
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file (default: ./watcher.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the keepalive server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Run a single tick and exit
    #[arg(long)]
    pub once: bool,

    /// Watch a mint from the start, even before it shows up in search
    #[arg(long, value_name = "MINT")]
    pub watch: Vec<String>,
}

/// Search once and list candidates
#[derive(Parser, Debug)]
pub struct ScanCmd {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of candidates to print
    #[arg(short, long, value_name = "N", default_value = "20")]
    pub limit: usize,
}

/// Holder stats lookup
#[derive(Parser, Debug)]
pub struct HoldersCmd {
    /// Token mint address
    #[arg(value_name = "MINT")]
    pub mint: String,

    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CheckConfigCmd {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
