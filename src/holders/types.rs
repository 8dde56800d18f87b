//! Configuration and fixed limits for the holder pipeline.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Number of top-ranked holders whose history is fetched.
pub const ENRICHMENT_TOP_N: usize = 10;
/// Maximum number of holders in a report.
pub const OUTPUT_CAP: usize = 25;
/// Most recent signatures requested per holder.
pub const HISTORY_SIGNATURE_LIMIT: usize = 50;
/// Addresses this short or shorter are treated as malformed.
pub const MIN_ADDRESS_LEN: usize = 20;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Percentage cut-offs used by the heuristic classifier.
///
/// These are carried over unchanged from the dashboard and have no documented
/// derivation; they are candidates for tuning rather than established
/// constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    /// Above this share an address is assumed to be a program-owned pool
    pub liquidity_pool_percentage: f64,
    /// Above this share (and not a pool) an address is a whale
    pub whale_percentage: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            liquidity_pool_percentage: 20.0,
            whale_percentage: 4.0,
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// JSON-RPC endpoint of the ledger index
    pub rpc_url: String,
    /// Timeout of a single RPC request in seconds
    pub rpc_timeout_seconds: u64,
    /// Attempts for the account listing call (first try included)
    pub account_retry_attempts: usize,
    /// Timeout of one history lookup in seconds
    pub history_timeout_seconds: u64,
    /// Signatures requested per history lookup
    pub history_signature_limit: usize,
    /// Top holders that get enriched
    pub enrichment_top_n: usize,
    /// Holders kept in the report
    pub output_cap: usize,
    /// Concurrent history lookups
    pub max_concurrent_enrichments: usize,
    /// Rate limit for history lookups
    pub history_requests_per_second: u32,
    /// How long cached mint decimals stay valid
    pub decimals_cache_ttl_seconds: u64,
    /// Classifier cut-offs
    pub thresholds: ClassifierThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            rpc_timeout_seconds: 30,
            account_retry_attempts: 3,
            history_timeout_seconds: 10,
            history_signature_limit: HISTORY_SIGNATURE_LIMIT,
            enrichment_top_n: ENRICHMENT_TOP_N,
            output_cap: OUTPUT_CAP,
            max_concurrent_enrichments: ENRICHMENT_TOP_N,
            history_requests_per_second: 20,
            decimals_cache_ttl_seconds: 3600,
            thresholds: ClassifierThresholds::default(),
        }
    }
}

impl PipelineConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history_timeout_seconds)
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// An output cap below the enrichment count is allowed; only the holders
    /// that survive the cut are enriched.
    pub fn validate(&self) -> Result<()> {
        if self.output_cap == 0 {
            return Err(anyhow!("output_cap must be greater than zero"));
        }
        if self.history_signature_limit == 0 {
            return Err(anyhow!("history_signature_limit must be greater than zero"));
        }
        if self.max_concurrent_enrichments == 0 {
            return Err(anyhow!("max_concurrent_enrichments must be greater than zero"));
        }
        if self.history_requests_per_second == 0 {
            return Err(anyhow!("history_requests_per_second must be greater than zero"));
        }
        if self.account_retry_attempts == 0 {
            return Err(anyhow!("account_retry_attempts must be at least 1"));
        }
        if self.output_cap < self.enrichment_top_n {
            warn!(
                "output_cap ({}) is below enrichment_top_n ({}); only {} holders will be enriched",
                self.output_cap, self.enrichment_top_n, self.output_cap
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_fixed_limits() {
        let config = PipelineConfig::default();

        assert_eq!(config.enrichment_top_n, 10);
        assert_eq!(config.output_cap, 25);
        assert_eq!(config.history_signature_limit, 50);
        assert_eq!(config.thresholds.liquidity_pool_percentage, 20.0);
        assert_eq!(config.thresholds.whale_percentage, 4.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_caps() {
        let config = PipelineConfig {
            output_cap: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PipelineConfig {
            max_concurrent_enrichments: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_cap_below_top_n_is_allowed() {
        let config = PipelineConfig {
            output_cap: 5,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde_roundtrip_keeps_thresholds() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.thresholds, config.thresholds);
        assert_eq!(parsed.rpc_url, DEFAULT_RPC_URL);
    }
}
