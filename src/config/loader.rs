//! Configuration Loader
//!
//! Loads and validates configuration from a TOML file, then applies
//! environment overrides. Every section is optional; a missing file falls
//! back to built-in defaults plus the environment, which is how the watcher
//! runs on container platforms that only inject env vars.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::AlertCriteria;

/// Config file looked up when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "watcher.toml";

pub const DEFAULT_SEARCH_URL: &str = "https://api.dexscreener.io/latest/dex/search?q=solana";
pub const DEFAULT_TOKEN_URL: &str = "https://api.dexscreener.com/latest/dex/tokens/";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

pub const DEFAULT_RPC_URLS: &[&str] = &[
    "https://api.mainnet-beta.solana.com",
    "https://rpc.ankr.com/solana",
    "https://solana-api.projectserum.com",
    "https://solana.public-rpc.com",
];

/// Main configuration structure matching watcher.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub dexscreener: DexScreenerSection,
    pub solana: SolanaSection,
    pub thresholds: AlertCriteria,
    pub telegram: TelegramSection,
    pub server: ServerSection,
    pub monitor: MonitorSection,
    pub logging: LoggingSection,
}

/// DexScreener API configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DexScreenerSection {
    /// Discovery feed (Solana search)
    pub search_url: String,
    /// Token endpoint prefix, the mint is appended
    pub token_url: String,
    pub search_timeout_secs: u64,
    pub token_timeout_secs: u64,
    /// Requests per minute across both endpoints
    pub rate_limit_rpm: u32,
    /// Attempts per request on 429/5xx
    pub max_retries: u32,
    /// Base delay for exponential backoff (milliseconds)
    pub retry_base_delay_ms: u64,
}

impl Default for DexScreenerSection {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            search_timeout_secs: 15,
            token_timeout_secs: 10,
            rate_limit_rpm: 60,
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SolanaSection {
    /// Endpoints tried in order until one answers
    pub rpc_urls: Vec<String>,
    /// Pause before moving to the next endpoint
    pub rotation_delay_ms: u64,
    /// Count every non-empty token account instead of the largest-accounts page
    pub count_all_holders: bool,
    pub timeout_secs: u64,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_urls: DEFAULT_RPC_URLS.iter().map(|s| s.to_string()).collect(),
            rotation_delay_ms: 200,
            count_all_holders: true,
            timeout_secs: 30,
        }
    }
}

/// Telegram configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelegramSection {
    /// Bot token (prefer TELEGRAM_BOT_TOKEN in .env)
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_url: DEFAULT_TELEGRAM_API.to_string(),
            timeout_secs: 10,
        }
    }
}

impl TelegramSection {
    /// Token and chat id, when both are set and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.bot_token.as_deref(), self.chat_id.as_deref()) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => {
                Some((token, chat))
            }
            _ => None,
        }
    }
}

/// Keepalive HTTP server section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSection {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerSection {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Monitor loop section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorSection {
    pub poll_interval_secs: u64,
    /// Send a one-off message when the loop starts
    pub startup_message: bool,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            startup_message: false,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file, with env overrides applied
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    config.apply_env_overrides(env_lookup)?;
    config.validate()?;
    Ok(config)
}

/// Resolve the configuration for a command.
///
/// An explicit path must exist. Without one, `watcher.toml` in the working
/// directory is used when present, otherwise defaults plus environment.
pub fn resolve_config(path: Option<&Path>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    if let Some(path) = path {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
        let config = load_config(&expanded)?;
        return Ok((config, Some(expanded)));
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        let config = load_config(&default_path)?;
        return Ok((config, Some(default_path)));
    }

    Ok((Config::from_env()?, None))
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides(env_lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID, POLL_INTERVAL, PORT and
    /// SOLANA_RPC_URLS from `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat) = lookup("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(chat);
        }
        if let Some(raw) = lookup("POLL_INTERVAL") {
            self.monitor.poll_interval_secs = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("POLL_INTERVAL must be whole seconds, got '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup("PORT") {
            self.server.port = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{}'", raw))
            })?;
        }
        if let Some(raw) = lookup("SOLANA_RPC_URLS") {
            self.solana.rpc_urls = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(())
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;

        for (name, value) in [
            ("min_fdv", t.min_fdv),
            ("max_fdv", t.max_fdv),
            ("min_volume_24h", t.min_volume_24h),
            ("max_watch_minutes", t.max_watch_minutes),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }

        if t.min_fdv > t.max_fdv {
            return Err(ConfigError::ValidationError(format!(
                "min_fdv ({}) must not exceed max_fdv ({})",
                t.min_fdv, t.max_fdv
            )));
        }

        if !(0.0..=100.0).contains(&t.max_top10_pct) {
            return Err(ConfigError::ValidationError(format!(
                "max_top10_pct must be 0-100, got {}",
                t.max_top10_pct
            )));
        }

        if self.monitor.poll_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }

        if self.dexscreener.search_url.is_empty() || self.dexscreener.token_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "DexScreener URLs cannot be empty".to_string(),
            ));
        }

        if self.dexscreener.rate_limit_rpm == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit_rpm must be > 0".to_string(),
            ));
        }

        if self.dexscreener.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "max_retries must be > 0".to_string(),
            ));
        }

        if self.solana.rpc_urls.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one Solana RPC URL is required".to_string(),
            ));
        }

        if self.solana.rpc_urls.iter().any(|u| u.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "rpc_urls cannot contain empty entries".to_string(),
            ));
        }

        if self.telegram.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "telegram api_url cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Copy safe to print or serve: the bot token is masked
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        if let Some(token) = copy.telegram.bot_token.as_mut() {
            let visible: String = token.chars().take(4).collect();
            *token = format!("{}***", visible);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[dexscreener]
search_timeout_secs = 20
rate_limit_rpm = 30

[solana]
rpc_urls = ["https://rpc-a.example", "https://rpc-b.example"]
rotation_delay_ms = 100
count_all_holders = false

[thresholds]
min_fdv = 50000.0
max_fdv = 250000.0
min_volume_24h = 100000.0
max_top10_pct = 30.0
min_holders = 100
max_watch_minutes = 90.0

[telegram]
chat_id = "-100123"

[server]
port = 8080

[monitor]
poll_interval_secs = 30
startup_message = true

[logging]
level = "debug"
"#
        .to_string()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_defaults_match_watcher_constants() {
        let config = Config::default();
        assert_eq!(config.dexscreener.search_url, DEFAULT_SEARCH_URL);
        assert_eq!(config.dexscreener.search_timeout_secs, 15);
        assert_eq!(config.dexscreener.token_timeout_secs, 10);
        assert_eq!(config.solana.rpc_urls.len(), 4);
        assert_eq!(config.solana.rotation_delay_ms, 200);
        assert_eq!(config.monitor.poll_interval_secs, 60);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.thresholds, AlertCriteria::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dexscreener.search_timeout_secs, 20);
        // Unset keys keep their defaults
        assert_eq!(config.dexscreener.token_timeout_secs, 10);
        assert_eq!(config.solana.rpc_urls.len(), 2);
        assert!(!config.solana.count_all_holders);
        assert_eq!(config.thresholds.min_holders, 100);
        assert_eq!(config.thresholds.max_watch_minutes, 90.0);
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-100123"));
        assert!(config.monitor.startup_message);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = parse("");
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/watcher.toml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[thresholds\nmin_fdv = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "42"),
            ("POLL_INTERVAL", " 15 "),
            ("PORT", "10000"),
            ("SOLANA_RPC_URLS", "https://one.example, ,https://two.example"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.telegram.credentials(), Some(("123:abc", "42")));
        assert_eq!(config.monitor.poll_interval_secs, 15);
        assert_eq!(config.server.port, 10000);
        assert_eq!(
            config.solana.rpc_urls,
            vec!["https://one.example".to_string(), "https://two.example".to_string()]
        );
    }

    #[test]
    fn test_bad_env_values() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|k| {
            (k == "POLL_INTERVAL").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let mut config = Config::default();
        let result = config.apply_env_overrides(|k| (k == "PORT").then(|| "70000".to_string()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_no_env_keeps_config() {
        let mut config = parse(&create_valid_config());
        config.apply_env_overrides(no_env).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telegram.bot_token, None);
    }

    #[test]
    fn test_validation_fdv_band() {
        let mut config = Config::default();
        config.thresholds.min_fdv = 400_000.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_fdv"));
    }

    #[test]
    fn test_validation_top10_range() {
        let mut config = Config::default();
        config.thresholds.max_top10_pct = 120.0;
        assert!(config.validate().is_err());

        config.thresholds.max_top10_pct = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_poll_interval_and_rpc() {
        let mut config = Config::default();
        config.monitor.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.solana.rpc_urls.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.thresholds.min_volume_24h = -5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_require_both() {
        let mut telegram = TelegramSection::default();
        assert!(telegram.credentials().is_none());

        telegram.bot_token = Some("token".into());
        assert!(telegram.credentials().is_none());

        telegram.chat_id = Some(String::new());
        assert!(telegram.credentials().is_none());

        telegram.chat_id = Some("7".into());
        assert_eq!(telegram.credentials(), Some(("token", "7")));
    }

    #[test]
    fn test_redacted_masks_token() {
        let mut config = Config::default();
        config.telegram.bot_token = Some("123456:SECRET".into());
        let redacted = config.redacted();
        assert_eq!(redacted.telegram.bot_token.as_deref(), Some("1234***"));
        // Original untouched
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123456:SECRET"));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_config().as_bytes()).unwrap();

        let (config, used) = resolve_config(Some(file.path())).unwrap();
        assert_eq!(used.as_deref(), Some(file.path()));
        assert_eq!(config.thresholds.min_holders, 100);

        assert!(resolve_config(Some(Path::new("/nonexistent/x.toml"))).is_err());
    }
}
