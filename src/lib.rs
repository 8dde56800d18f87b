//! holder-lens - Solana token holder analytics
//!
//! This crate turns the raw token accounts of a mint into a ranked,
//! classified and enriched holder report.

pub mod types;
pub mod holders;

// Re-export main types for convenience
pub use types::{HolderRecord, HolderReport, RawTokenAccount, SignatureEntry};
pub use holders::{HolderPipeline, HolderPipelineBuilder, HolderReportError, PipelineConfig};
