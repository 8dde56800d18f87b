//! Data sources for token accounts and address history.
//!
//! The pipeline only sees the [`AccountSource`] and [`HistorySource`] traits.
//! [`RpcDataSources`] implements both against a Solana JSON-RPC endpoint with
//! retries, a shared rate limiter for history lookups and a decimals cache.

use crate::holders::types::PipelineConfig;
use crate::types::{RawTokenAccount, SignatureEntry};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey as SolanaPubkey;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, Retry};
use tracing::{debug, instrument, warn};

/// SPL Token program that owns classic token accounts.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

const TOKEN_ACCOUNT_LEN: u64 = 165;
const MINT_DECIMALS_OFFSET: usize = 44;

/// Lists the token accounts bound to a mint.
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn fetch_token_accounts(&self, mint: &str) -> Result<Vec<RawTokenAccount>>;
}

/// Lists the most recent signatures of an address, newest first.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_signatures(&self, address: &str, limit: usize) -> Result<Vec<SignatureEntry>>;
}

/// Solana RPC backed implementation of both sources.
pub struct RpcDataSources {
    rpc: RpcClient,
    decimals_cache: Cache<String, u8>,
    history_limiter: DefaultDirectRateLimiter,
    account_retry_attempts: usize,
    account_timeout: Duration,
}

impl RpcDataSources {
    /// Create the data sources for the configured endpoint.
    pub fn new(config: &PipelineConfig) -> Self {
        let rpc = RpcClient::new_with_timeout_and_commitment(
            config.rpc_url.clone(),
            config.rpc_timeout(),
            CommitmentConfig::confirmed(),
        );

        let decimals_cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(config.decimals_cache_ttl_seconds))
            .build();

        let per_second = NonZeroU32::new(config.history_requests_per_second).unwrap_or(NonZeroU32::MIN);
        let history_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Self {
            rpc,
            decimals_cache,
            history_limiter,
            account_retry_attempts: config.account_retry_attempts.max(1),
            // getProgramAccounts is the slowest call by far
            account_timeout: config.rpc_timeout() * 2,
        }
    }

    /// Endpoint this instance talks to.
    pub fn url(&self) -> String {
        self.rpc.url()
    }

    /// Token decimals for a mint, cached.
    #[instrument(skip_all, fields(mint = %mint))]
    async fn fetch_mint_decimals(&self, mint: &SolanaPubkey) -> Result<u8> {
        let key = mint.to_string();
        if let Some(decimals) = self.decimals_cache.get(&key).await {
            return Ok(decimals);
        }

        let mint_account = self
            .rpc
            .get_account(mint)
            .await
            .context("Failed to fetch mint account")?;
        let decimals = parse_mint_decimals(&mint_account.data)?;

        debug!("Mint {} has {} decimals", key, decimals);
        self.decimals_cache.insert(key, decimals).await;
        Ok(decimals)
    }

    /// One attempt at listing the token accounts of a mint.
    #[instrument(skip_all, fields(mint = %mint))]
    async fn list_token_accounts(&self, mint: &SolanaPubkey) -> Result<Vec<RawTokenAccount>> {
        let token_program_id =
            SolanaPubkey::from_str(TOKEN_PROGRAM_ID).context("Failed to parse token program ID")?;

        let decimals = self.fetch_mint_decimals(mint).await?;

        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::DataSize(TOKEN_ACCOUNT_LEN),
                RpcFilterType::Memcmp(Memcmp::new_raw_bytes(0, mint.to_bytes().to_vec())),
            ]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(CommitmentConfig::confirmed()),
                ..Default::default()
            },
            ..Default::default()
        };

        let accounts = match tokio::time::timeout(
            self.account_timeout,
            self.rpc.get_program_accounts_with_config(&token_program_id, config),
        )
        .await
        {
            Ok(Ok(accounts)) => accounts,
            Ok(Err(e)) => {
                warn!("Failed to fetch token accounts: {}", e);
                return Err(anyhow!("Failed to fetch token accounts: {}", e));
            }
            Err(_) => {
                warn!("Timeout fetching token accounts");
                return Err(anyhow!(
                    "Token accounts fetch timed out after {}s",
                    self.account_timeout.as_secs()
                ));
            }
        };

        debug!("Found {} token accounts", accounts.len());

        let entries: Vec<RawTokenAccount> = accounts
            .iter()
            .filter_map(|(pubkey, account)| {
                let parsed = parse_token_account(&account.data, decimals);
                if parsed.is_none() {
                    debug!("Skipping malformed token account {}", pubkey);
                }
                parsed
            })
            .collect();

        Ok(entries)
    }
}

#[async_trait]
impl AccountSource for RpcDataSources {
    #[instrument(skip_all, fields(mint = %mint))]
    async fn fetch_token_accounts(&self, mint: &str) -> Result<Vec<RawTokenAccount>> {
        let mint_pubkey = SolanaPubkey::from_str(mint).context("Failed to parse mint address")?;

        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(self.account_retry_attempts - 1);

        Retry::spawn(retry_strategy, || self.list_token_accounts(&mint_pubkey)).await
    }
}

#[async_trait]
impl HistorySource for RpcDataSources {
    #[instrument(skip_all, fields(address = %address))]
    async fn fetch_signatures(&self, address: &str, limit: usize) -> Result<Vec<SignatureEntry>> {
        let pubkey = SolanaPubkey::from_str(address).context("Failed to parse holder address")?;

        self.history_limiter.until_ready().await;

        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
        };

        let signatures = self
            .rpc
            .get_signatures_for_address_with_config(&pubkey, config)
            .await
            .context("Failed to fetch signatures")?;

        debug!("Fetched {} signatures", signatures.len());

        Ok(signatures
            .into_iter()
            .map(|s| SignatureEntry {
                signature: s.signature,
                block_time: s.block_time,
            })
            .collect())
    }
}

/// Decimals byte of an SPL mint account.
pub fn parse_mint_decimals(data: &[u8]) -> Result<u8> {
    data.get(MINT_DECIMALS_OFFSET)
        .copied()
        .ok_or_else(|| anyhow!("Invalid mint account data length: {}", data.len()))
}

/// Owner and UI balance of a raw SPL token account.
///
/// Layout: mint (0..32), owner (32..64), amount (64..72, little-endian).
pub fn parse_token_account(data: &[u8], decimals: u8) -> Option<RawTokenAccount> {
    let owner_bytes: [u8; 32] = data.get(32..64)?.try_into().ok()?;
    let amount_bytes: [u8; 8] = data.get(64..72)?.try_into().ok()?;

    let owner = SolanaPubkey::new_from_array(owner_bytes);
    let amount = u64::from_le_bytes(amount_bytes);
    let balance = amount as f64 / 10f64.powi(decimals as i32);

    Some(RawTokenAccount {
        owner: owner.to_string(),
        balance: Some(balance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_account_data(owner: &SolanaPubkey, amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; TOKEN_ACCOUNT_LEN as usize];
        data[32..64].copy_from_slice(&owner.to_bytes());
        data[64..72].copy_from_slice(&amount.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_token_account_converts_to_ui_units() {
        let owner = SolanaPubkey::new_unique();
        let data = token_account_data(&owner, 1_500_000_000);

        let parsed = parse_token_account(&data, 6).unwrap();

        assert_eq!(parsed.owner, owner.to_string());
        assert_eq!(parsed.balance, Some(1500.0));
    }

    #[test]
    fn test_parse_token_account_rejects_short_data() {
        assert!(parse_token_account(&[0u8; 60], 6).is_none());
    }

    #[test]
    fn test_parse_mint_decimals() {
        let mut data = vec![0u8; 82];
        data[MINT_DECIMALS_OFFSET] = 9;

        assert_eq!(parse_mint_decimals(&data).unwrap(), 9);
        assert!(parse_mint_decimals(&data[..10]).is_err());
    }

    #[tokio::test]
    async fn test_invalid_mint_is_an_error_before_any_request() {
        let config = PipelineConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            account_retry_attempts: 1,
            ..PipelineConfig::default()
        };
        let sources = RpcDataSources::new(&config);

        let result = sources.fetch_token_accounts("not-a-base58-key!").await;

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to parse mint address"));
    }

    #[tokio::test]
    async fn test_data_sources_creation() {
        let sources = RpcDataSources::new(&PipelineConfig::default());
        assert_eq!(sources.url(), crate::holders::types::DEFAULT_RPC_URL);
    }
}
