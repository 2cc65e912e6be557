//! Graduate Alert
//!
//! Renders the Telegram message for a token that cleared every threshold.

use super::criteria::HolderStats;
use super::pair::DexPair;

/// Everything that goes into one alert message
#[derive(Debug, Clone, PartialEq)]
pub struct GraduateAlert {
    pub symbol: String,
    pub ca: String,
    pub fdv: f64,
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub top10_pct: f64,
    pub holders: u64,
    pub age_minutes: f64,
    pub dex: String,
    pub url: String,
}

impl GraduateAlert {
    pub fn from_pair(ca: &str, pair: &DexPair, stats: &HolderStats, age_minutes: f64) -> Self {
        Self {
            symbol: pair.symbol_or(ca),
            ca: ca.to_string(),
            fdv: pair.fdv(),
            volume_24h: pair.volume_24h(),
            liquidity_usd: pair.liquidity_usd(),
            top10_pct: stats.top10_pct,
            holders: stats.holders,
            age_minutes,
            dex: pair.dex_id_or_unknown().to_string(),
            url: pair.url_or_empty().to_string(),
        }
    }

    /// Telegram (legacy) Markdown body
    pub fn render_markdown(&self) -> String {
        format!(
            "🔥 *Pump.fun Graduate Detected* 🔥\n\n\
             💠 *Token:* ${}\n\
             🧾 *CA:* `{}`\n\
             💰 *Market Cap (FDV):* ${}\n\
             📈 *24h Volume:* ${}\n\
             💧 *Liquidity:* ${}\n\
             🏦 *Top 10 wallets:* {:.2}%\n\
             👥 *Holders:* {}\n\
             🕒 *Age:* {:.0} min\n\
             🧩 *DEX:* {}\n\n\
             🔗 [DexScreener]({})",
            self.symbol,
            self.ca,
            group_thousands(self.fdv),
            group_thousands(self.volume_24h),
            group_thousands(self.liquidity_usd),
            self.top10_pct,
            self.holders,
            self.age_minutes,
            self.dex,
            self.url,
        )
    }
}

/// Round to a whole number and insert `,` between thousands groups
pub fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0.0 && rounded != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pair::{BaseToken, Liquidity, Volume};

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(1_000.0), "1,000");
        assert_eq!(group_thousands(123_456.7), "123,457");
        assert_eq!(group_thousands(1_234_567.0), "1,234,567");
        assert_eq!(group_thousands(-45_000.0), "-45,000");
        assert_eq!(group_thousands(-0.2), "0");
    }

    #[test]
    fn test_render_markdown() {
        let alert = GraduateAlert {
            symbol: "DOG".into(),
            ca: "Mint111".into(),
            fdv: 150_000.0,
            volume_24h: 1_250_000.4,
            liquidity_usd: 38_000.0,
            top10_pct: 18.456,
            holders: 512,
            age_minutes: 12.6,
            dex: "raydium".into(),
            url: "https://dexscreener.com/solana/pair".into(),
        };

        let text = alert.render_markdown();
        assert!(text.starts_with("🔥 *Pump.fun Graduate Detected* 🔥\n\n"));
        assert!(text.contains("💠 *Token:* $DOG\n"));
        assert!(text.contains("🧾 *CA:* `Mint111`\n"));
        assert!(text.contains("💰 *Market Cap (FDV):* $150,000\n"));
        assert!(text.contains("📈 *24h Volume:* $1,250,000\n"));
        assert!(text.contains("💧 *Liquidity:* $38,000\n"));
        assert!(text.contains("🏦 *Top 10 wallets:* 18.46%\n"));
        assert!(text.contains("👥 *Holders:* 512\n"));
        assert!(text.contains("🕒 *Age:* 13 min\n"));
        assert!(text.contains("🧩 *DEX:* raydium\n\n"));
        assert!(text.ends_with("🔗 [DexScreener](https://dexscreener.com/solana/pair)"));
    }

    #[test]
    fn test_from_pair_defaults() {
        let pair = DexPair {
            base_token: Some(BaseToken::default()),
            volume: Some(Volume { h24: Some(10.0) }),
            liquidity: Some(Liquidity { usd: None }),
            ..Default::default()
        };
        let stats = HolderStats { supply: 1.0, holders: 300, top10_pct: 10.0 };

        let alert = GraduateAlert::from_pair("So1anaMintAddr", &pair, &stats, 3.0);
        assert_eq!(alert.symbol, "So1ana");
        assert_eq!(alert.dex, "unknown");
        assert_eq!(alert.url, "");
        assert_eq!(alert.volume_24h, 10.0);
        assert_eq!(alert.liquidity_usd, 0.0);
        assert_eq!(alert.holders, 300);
    }
}
