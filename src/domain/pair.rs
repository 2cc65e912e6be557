//! DexScreener Pair Model
//!
//! The subset of the DexScreener pair object the watcher reads. DexScreener
//! omits fields freely and sometimes sends numbers as strings, so every field
//! is optional and numeric getters fall back to zero.

use serde::{Deserialize, Deserializer, Serialize};

/// Marker DexScreener uses for tokens that migrated off the pump.fun curve
const PUMPFUN_MARKER: &str = "pumpfun";

/// Base token of a pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseToken {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Rolling volume windows (USD)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub h24: Option<f64>,
}

/// Pool liquidity (USD)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usd: Option<f64>,
}

/// Listing metadata attached by DexScreener
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairInfo {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
}

/// A single DexScreener trading pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub dex_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pair_address: Option<String>,
    #[serde(default)]
    pub base_token: Option<BaseToken>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fdv: Option<f64>,
    #[serde(default)]
    pub volume: Option<Volume>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    /// Pair creation time, milliseconds since epoch
    #[serde(default, deserialize_with = "lenient_i64")]
    pub pair_created_at: Option<i64>,
    /// Pair age in seconds (older payloads only)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub age: Option<f64>,
    #[serde(default)]
    pub info: Option<PairInfo>,
}

impl DexPair {
    /// Fully diluted valuation in USD
    pub fn fdv(&self) -> f64 {
        self.fdv.unwrap_or(0.0)
    }

    /// 24h volume in USD
    pub fn volume_24h(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }

    /// Liquidity in USD
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    /// Base token mint (contract address)
    pub fn base_address(&self) -> Option<&str> {
        self.base_token
            .as_ref()
            .and_then(|t| t.address.as_deref())
            .filter(|a| !a.is_empty())
    }

    pub fn symbol(&self) -> Option<&str> {
        self.base_token.as_ref().and_then(|t| t.symbol.as_deref())
    }

    /// Symbol, or the first six characters of the contract address
    pub fn symbol_or(&self, ca: &str) -> String {
        match self.symbol() {
            Some(s) => s.to_string(),
            None => ca.chars().take(6).collect(),
        }
    }

    pub fn dex_id_or_unknown(&self) -> &str {
        self.dex_id.as_deref().unwrap_or("unknown")
    }

    pub fn url_or_empty(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// Whether DexScreener tagged this pair as a pump.fun graduate
    pub fn is_pumpfun_graduate(&self) -> bool {
        let Some(info) = self.info.as_ref() else {
            return false;
        };

        if info.source_id.as_deref() == Some(PUMPFUN_MARKER) {
            return true;
        }

        let mentions = |field: &Option<String>| {
            field.as_deref().map_or(false, |s| s.contains(PUMPFUN_MARKER))
        };
        mentions(&info.header) || mentions(&info.image_url)
    }

    /// Creation time in ms. Prefers `pairCreatedAt`, falls back to `now - age`.
    pub fn created_at_ms(&self, now_ms: i64) -> i64 {
        match self.pair_created_at {
            Some(created) if created != 0 => created,
            _ => {
                let age_secs = self.age.unwrap_or(0.0);
                now_ms - (age_secs * 1000.0) as i64
            }
        }
    }

    /// Pair age in minutes as of `now_ms`
    pub fn age_minutes(&self, now_ms: i64) -> f64 {
        (now_ms - self.created_at_ms(now_ms)) as f64 / 60_000.0
    }
}

/// Envelope returned by both the search and the token endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pairs: Vec<DexPair>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<DexPair>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<DexPair>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Float(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Float(v)) => Some(v),
        Some(NumberOrString::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.map(|v| v as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pair_with_info(info: PairInfo) -> DexPair {
        DexPair {
            info: Some(info),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_full_pair() {
        let json = r#"{
            "chainId": "solana",
            "dexId": "raydium",
            "url": "https://dexscreener.com/solana/pairaddr",
            "pairAddress": "pairaddr",
            "baseToken": {"address": "Mint111", "name": "Dog", "symbol": "DOG"},
            "fdv": 120000,
            "volume": {"h24": 250000.5, "h6": 10},
            "liquidity": {"usd": "42000.25"},
            "pairCreatedAt": 1700000000000,
            "info": {"imageUrl": "https://cdn/pumpfun/x.png", "header": null}
        }"#;

        let pair: DexPair = serde_json::from_str(json).unwrap();
        assert_eq!(pair.base_address(), Some("Mint111"));
        assert_eq!(pair.symbol(), Some("DOG"));
        assert_relative_eq!(pair.fdv(), 120_000.0);
        assert_relative_eq!(pair.volume_24h(), 250_000.5);
        assert_relative_eq!(pair.liquidity_usd(), 42_000.25);
        assert_eq!(pair.pair_created_at, Some(1_700_000_000_000));
        assert!(pair.is_pumpfun_graduate());
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let pair: DexPair = serde_json::from_str("{}").unwrap();
        assert_eq!(pair.fdv(), 0.0);
        assert_eq!(pair.volume_24h(), 0.0);
        assert_eq!(pair.liquidity_usd(), 0.0);
        assert_eq!(pair.base_address(), None);
        assert_eq!(pair.dex_id_or_unknown(), "unknown");
        assert_eq!(pair.url_or_empty(), "");
        assert!(!pair.is_pumpfun_graduate());
    }

    #[test]
    fn test_null_numbers_are_zero() {
        let pair: DexPair =
            serde_json::from_str(r#"{"fdv": null, "volume": {"h24": null}}"#).unwrap();
        assert_eq!(pair.fdv(), 0.0);
        assert_eq!(pair.volume_24h(), 0.0);
    }

    #[test]
    fn test_pumpfun_detection() {
        let by_source = pair_with_info(PairInfo {
            source_id: Some("pumpfun".into()),
            ..Default::default()
        });
        assert!(by_source.is_pumpfun_graduate());

        let by_header = pair_with_info(PairInfo {
            header: Some("https://dd.dexscreener.com/pumpfun/header.png".into()),
            ..Default::default()
        });
        assert!(by_header.is_pumpfun_graduate());

        let other = pair_with_info(PairInfo {
            source_id: Some("moonshot".into()),
            image_url: Some("https://cdn/other.png".into()),
            ..Default::default()
        });
        assert!(!other.is_pumpfun_graduate());
    }

    #[test]
    fn test_symbol_falls_back_to_ca_prefix() {
        let pair = DexPair::default();
        assert_eq!(pair.symbol_or("ABCDEFGHIJ"), "ABCDEF");
        assert_eq!(pair.symbol_or("XY"), "XY");
    }

    #[test]
    fn test_created_at_prefers_pair_created_at() {
        let now = 10_000_000;
        let pair = DexPair {
            pair_created_at: Some(now - 120_000),
            age: Some(9_999.0),
            ..Default::default()
        };
        assert_eq!(pair.created_at_ms(now), now - 120_000);
        assert_relative_eq!(pair.age_minutes(now), 2.0);
    }

    #[test]
    fn test_created_at_falls_back_to_age() {
        let now = 10_000_000;
        let pair = DexPair {
            pair_created_at: Some(0),
            age: Some(300.0),
            ..Default::default()
        };
        assert_eq!(pair.created_at_ms(now), now - 300_000);
        assert_relative_eq!(pair.age_minutes(now), 5.0);

        let fresh = DexPair::default();
        assert_eq!(fresh.age_minutes(now), 0.0);
    }

    #[test]
    fn test_pairs_response_null_pairs() {
        let resp: PairsResponse = serde_json::from_str(r#"{"pairs": null}"#).unwrap();
        assert!(resp.pairs.is_empty());

        let resp: PairsResponse = serde_json::from_str(r#"{"schemaVersion": "1.0.0"}"#).unwrap();
        assert!(resp.pairs.is_empty());
    }
}
