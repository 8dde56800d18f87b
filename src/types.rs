//! Core types and data structures for the holder analytics pipeline.

use crate::holders::error::EnrichmentFailure;
use serde::{Deserialize, Serialize};

/// A simple public key representation (base58 string as received from the RPC)
pub type Pubkey = String;

/// A raw token-account entry as reported by the account source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTokenAccount {
    /// Wallet that owns the token account
    pub owner: Pubkey,
    /// Reported balance in UI units (None when the upstream omitted it)
    pub balance: Option<f64>,
}

impl RawTokenAccount {
    pub fn new(owner: impl Into<Pubkey>, balance: f64) -> Self {
        Self {
            owner: owner.into(),
            balance: Some(balance),
        }
    }

    /// Balance usable for arithmetic: missing, non-finite and negative values count as 0.
    pub fn effective_balance(&self) -> f64 {
        match self.balance {
            Some(b) if b.is_finite() && b > 0.0 => b,
            _ => 0.0,
        }
    }
}

/// One entry of an address's signature history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureEntry {
    /// Transaction signature
    pub signature: String,
    /// Block time in Unix seconds, if the node reported one
    pub block_time: Option<i64>,
}

impl SignatureEntry {
    /// Timestamp if known; absent or non-positive block times are treated as unknown.
    pub fn timestamp(&self) -> Option<u64> {
        self.block_time.filter(|t| *t > 0).map(|t| t as u64)
    }
}

/// One distinct holder of a mint within a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderRecord {
    /// Wallet address, unique within a run
    pub address: Pubkey,
    /// Balance in UI units
    pub balance: f64,
    /// Share of the reported supply (0-100)
    pub percentage: f64,
    /// Earliest retrieved transaction (Unix seconds, 0 = unresolved)
    pub first_transaction: u64,
    /// Latest retrieved transaction (Unix seconds, 0 = unresolved)
    pub last_transaction: u64,
    /// Number of retrieved signatures, capped by the history limit
    pub transaction_count: u32,
    /// Reserved; creator detection is not implemented and this is always false
    pub is_creator: bool,
    pub is_whale: bool,
    pub is_liquidity_pool: bool,
}

impl HolderRecord {
    pub fn new(address: impl Into<Pubkey>, balance: f64, percentage: f64) -> Self {
        Self {
            address: address.into(),
            balance,
            percentage,
            first_transaction: 0,
            last_transaction: 0,
            transaction_count: 0,
            is_creator: false,
            is_whale: false,
            is_liquidity_pool: false,
        }
    }

    /// Whether the enrichment fields were populated.
    pub fn is_enriched(&self) -> bool {
        self.transaction_count > 0
    }
}

/// Ranked, classified and enriched holder list for one mint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HolderReport {
    pub holders: Vec<HolderRecord>,
    /// Soft per-address enrichment failures of this run (never part of the report body)
    #[serde(skip)]
    pub enrichment_failures: Vec<EnrichmentFailure>,
}

impl HolderReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    /// Status this report maps to for an HTTP caller; an empty report is still a success.
    pub fn status_code(&self) -> u16 {
        200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_balance_ignores_bad_values() {
        assert_eq!(RawTokenAccount::new("a", 12.5).effective_balance(), 12.5);
        assert_eq!(RawTokenAccount::new("a", -3.0).effective_balance(), 0.0);
        assert_eq!(RawTokenAccount::new("a", f64::NAN).effective_balance(), 0.0);

        let missing = RawTokenAccount {
            owner: "a".to_string(),
            balance: None,
        };
        assert_eq!(missing.effective_balance(), 0.0);
    }

    #[test]
    fn test_signature_timestamp() {
        let entry = |t| SignatureEntry {
            signature: "sig".to_string(),
            block_time: t,
        };
        assert_eq!(entry(Some(1_700_000_000)).timestamp(), Some(1_700_000_000));
        assert_eq!(entry(Some(0)).timestamp(), None);
        assert_eq!(entry(None).timestamp(), None);
    }

    #[test]
    fn test_holder_record_serializes_camel_case() {
        let record = HolderRecord::new("HolderAddress1111111111111", 10.0, 1.0);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["firstTransaction"], 0);
        assert_eq!(json["transactionCount"], 0);
        assert_eq!(json["isLiquidityPool"], false);
        assert_eq!(json["isCreator"], false);
    }

    #[test]
    fn test_is_enriched_tracks_transaction_count() {
        let mut record = HolderRecord::new("HolderAddress1111111111111", 10.0, 1.0);
        assert!(!record.is_enriched());

        record.transaction_count = 3;
        assert!(record.is_enriched());
    }

    #[test]
    fn test_report_body_only_contains_holders() {
        let report = HolderReport::empty();
        let json = serde_json::to_string(&report).unwrap();

        assert_eq!(json, r#"{"holders":[]}"#);
        assert_eq!(report.status_code(), 200);
    }
}
