use solana_account_decoder::{UiAccountEncoding, UiDataSliceConfig};
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::loader::SolanaSection;
use crate::domain::HolderStats;
use crate::ports::{HolderError, HolderSource};

/// SPL Token program
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
/// Token-2022 program
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
/// Size of an SPL token account
const TOKEN_ACCOUNT_LEN: u64 = 165;
/// Offset of the mint pubkey inside a token account
const TOKEN_MINT_OFFSET: usize = 0;
/// Offset of the u64 amount inside a token account
const TOKEN_AMOUNT_OFFSET: usize = 64;

/// Program owning a mint, which decides where its token accounts live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenProgram {
    Spl,
    /// Accounts may carry extensions, so their size is not fixed
    Token2022,
}

impl TokenProgram {
    pub fn from_owner(owner: &Pubkey) -> Option<Self> {
        let owner = owner.to_string();
        if owner == TOKEN_PROGRAM_ID {
            Some(TokenProgram::Spl)
        } else if owner == TOKEN_2022_PROGRAM_ID {
            Some(TokenProgram::Token2022)
        } else {
            None
        }
    }

    pub fn program_id(&self) -> &'static str {
        match self {
            TokenProgram::Spl => TOKEN_PROGRAM_ID,
            TokenProgram::Token2022 => TOKEN_2022_PROGRAM_ID,
        }
    }

    /// `getProgramAccounts` filters selecting the token accounts of `mint`
    pub fn account_filters(&self, mint: &Pubkey) -> Vec<RpcFilterType> {
        let by_mint = RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
            TOKEN_MINT_OFFSET,
            mint.as_ref(),
        ));
        match self {
            TokenProgram::Spl => vec![RpcFilterType::DataSize(TOKEN_ACCOUNT_LEN), by_mint],
            TokenProgram::Token2022 => vec![by_mint],
        }
    }
}

/// Pick the holder count to report.
///
/// A full scan is trusted unless it finds fewer funded accounts than the
/// largest-accounts page already shows; then the page length is used.
pub fn resolve_holder_count(scanned: Option<u64>, funded_largest: u64, largest_len: u64) -> u64 {
    match scanned {
        Some(count) if count >= funded_largest => count,
        _ => largest_len,
    }
}

struct Endpoint {
    url: String,
    client: Arc<RpcClient>,
}

/// Holder statistics over a rotating list of RPC endpoints
#[derive(Clone)]
pub struct SolanaHolderClient {
    endpoints: Arc<Vec<Endpoint>>,
    rotation_delay: Duration,
    count_all_holders: bool,
}

impl SolanaHolderClient {
    /// Create a client that tries `rpc_urls` in order
    pub fn new(rpc_urls: &[String], timeout: Duration) -> Self {
        let endpoints = rpc_urls
            .iter()
            .map(|url| Endpoint {
                url: url.clone(),
                client: Arc::new(RpcClient::new_with_timeout_and_commitment(
                    url.clone(),
                    timeout,
                    CommitmentConfig::confirmed(),
                )),
            })
            .collect();

        Self {
            endpoints: Arc::new(endpoints),
            rotation_delay: Duration::from_millis(200),
            count_all_holders: true,
        }
    }

    pub fn from_config(section: &SolanaSection) -> Self {
        Self::new(&section.rpc_urls, Duration::from_secs(section.timeout_secs))
            .with_rotation_delay(Duration::from_millis(section.rotation_delay_ms))
            .with_count_all_holders(section.count_all_holders)
    }

    /// Pause before falling through to the next endpoint
    pub fn with_rotation_delay(mut self, delay: Duration) -> Self {
        self.rotation_delay = delay;
        self
    }

    /// Count every funded token account instead of the largest-accounts page
    pub fn with_count_all_holders(mut self, enabled: bool) -> Self {
        self.count_all_holders = enabled;
        self
    }

    pub fn endpoint_urls(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.url.clone()).collect()
    }

    /// Query a single endpoint (blocking)
    fn query_endpoint(
        client: &RpcClient,
        mint: &Pubkey,
        count_all: bool,
    ) -> Result<HolderStats, HolderError> {
        let supply = client
            .get_token_supply(mint)
            .map_err(|e| HolderError::Rpc(e.to_string()))?;
        let supply_ui = supply.ui_amount.unwrap_or(0.0);

        let largest = client
            .get_token_largest_accounts(mint)
            .map_err(|e| HolderError::Rpc(e.to_string()))?;

        let top10_sum: f64 = largest
            .iter()
            .take(10)
            .map(|a| a.amount.ui_amount.unwrap_or(0.0))
            .sum();

        // The largest-accounts page caps at 20, so it is only a floor
        let funded_largest = largest
            .iter()
            .filter(|a| a.amount.amount.parse::<u64>().map_or(false, |v| v > 0))
            .count() as u64;

        let scanned = if count_all {
            match Self::count_funded_accounts(client, mint) {
                Ok(count) => Some(count),
                Err(e) => {
                    tracing::debug!("Full holder scan unavailable for {}: {}", mint, e);
                    None
                }
            }
        } else {
            None
        };

        let holders = resolve_holder_count(scanned, funded_largest, largest.len() as u64);
        if let Some(count) = scanned.filter(|&c| c != holders) {
            tracing::debug!(
                "Holder scan for {} found {} accounts, below the {} funded largest accounts; using {}",
                mint,
                count,
                funded_largest,
                holders
            );
        }

        Ok(HolderStats {
            supply: supply_ui,
            holders,
            top10_pct: top10_percent(top10_sum, supply_ui),
        })
    }

    /// Count token accounts of `mint` with a non-zero balance.
    /// Only the 8-byte amount field is fetched per account.
    fn count_funded_accounts(client: &RpcClient, mint: &Pubkey) -> Result<u64, HolderError> {
        let owner = client
            .get_account(mint)
            .map_err(|e| HolderError::Rpc(e.to_string()))?
            .owner;
        let token_program = TokenProgram::from_owner(&owner).ok_or_else(|| {
            HolderError::Rpc(format!("{} is owned by {}, not a token program", mint, owner))
        })?;
        let program = Pubkey::from_str(token_program.program_id())
            .map_err(|e| HolderError::Rpc(format!("Bad token program id: {}", e)))?;

        let config = RpcProgramAccountsConfig {
            filters: Some(token_program.account_filters(mint)),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                data_slice: Some(UiDataSliceConfig {
                    offset: TOKEN_AMOUNT_OFFSET,
                    length: 8,
                }),
                ..Default::default()
            },
            ..Default::default()
        };

        let accounts = client
            .get_program_accounts_with_config(&program, config)
            .map_err(|e| HolderError::Rpc(e.to_string()))?;

        Ok(accounts
            .iter()
            .filter(|(_, account)| amount_from_slice(&account.data) > 0)
            .count() as u64)
    }
}

#[async_trait]
impl HolderSource for SolanaHolderClient {
    async fn holder_stats(&self, mint: &str) -> Result<HolderStats, HolderError> {
        let mint = Pubkey::from_str(mint)
            .map_err(|e| HolderError::InvalidMint(format!("{}: {}", mint, e)))?;

        for endpoint in self.endpoints.iter() {
            // Spawn blocking to make sync RPC call async-compatible
            let client = Arc::clone(&endpoint.client);
            let count_all = self.count_all_holders;
            let result = tokio::task::spawn_blocking(move || {
                Self::query_endpoint(&client, &mint, count_all)
            })
            .await
            .map_err(|e| HolderError::Rpc(format!("Task join error: {}", e)))
            .and_then(|r| r);

            match result {
                Ok(stats) => return Ok(stats),
                Err(e) => {
                    tracing::warn!("RPC {} failed for {}: {}", endpoint.url, mint, e);
                    tokio::time::sleep(self.rotation_delay).await;
                }
            }
        }

        Err(HolderError::AllEndpointsFailed(self.endpoints.len()))
    }
}

/// Share of supply held by the top accounts, 0 when supply is unknown
pub fn top10_percent(top10_sum: f64, supply: f64) -> f64 {
    if supply > 0.0 {
        top10_sum / supply * 100.0
    } else {
        0.0
    }
}

/// Little-endian u64 token amount from a sliced account
fn amount_from_slice(data: &[u8]) -> u64 {
    data.get(..8)
        .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
        .map(u64::from_le_bytes)
        .unwrap_or(0)
}
