//! Error types for the holder pipeline.
//!
//! Only [`HolderReportError`] ever terminates a run. Per-address enrichment
//! problems are [`EnrichmentError`]s that are logged and attached to the
//! report, never returned.

use crate::types::Pubkey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that end a pipeline run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HolderReportError {
    /// The caller supplied a missing or malformed mint; no I/O was attempted
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The mandatory account listing failed
    #[error("account source unavailable: {detail}")]
    SourceUnavailable { detail: String },
}

impl HolderReportError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            HolderReportError::InvalidArgument(_) => "invalid_argument",
            HolderReportError::SourceUnavailable { .. } => "source_unavailable",
        }
    }

    /// HTTP status an API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            HolderReportError::InvalidArgument(_) => 400,
            HolderReportError::SourceUnavailable { .. } => 502,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Why a single holder could not be enriched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    #[error("history lookup timed out after {0} ms")]
    Timeout(u128),

    #[error("history lookup failed: {0}")]
    Upstream(String),

    #[error("no transaction history returned")]
    NoHistory,

    #[error("history task aborted: {0}")]
    Aborted(String),
}

/// A soft failure tied to the address it happened for.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentFailure {
    pub address: Pubkey,
    pub error: EnrichmentError,
}
