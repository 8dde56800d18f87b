//! Holders module - token holder analytics pipeline.
//!
//! Turns the raw token accounts of a mint into a ranked, classified and
//! enriched holder report. The stages live in their own modules and are
//! wired together by [`HolderPipeline`].

pub mod types;
pub mod error;
pub mod data_sources;
pub mod aggregator;
pub mod classifier;
pub mod ranker;
pub mod enricher;
pub mod pipeline;

// Re-export main public types and the pipeline
pub use pipeline::HolderPipeline;
pub use types::{ClassifierThresholds, PipelineConfig};
pub use error::{EnrichmentError, EnrichmentFailure, ErrorBody, HolderReportError};

// Re-export other key components for advanced usage
pub use data_sources::{AccountSource, HistorySource, RpcDataSources};
pub use classifier::{HeuristicClassifier, HolderClass, HolderClassifier};
pub use enricher::{HistorySummary, HolderEnricher};

use std::sync::Arc;

/// Pipeline builder for convenient construction with sensible defaults.
pub struct HolderPipelineBuilder {
    config: PipelineConfig,
    classifier: Option<Arc<dyn HolderClassifier>>,
}

impl HolderPipelineBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            classifier: None,
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            config,
            classifier: None,
        }
    }

    /// Set the RPC endpoint.
    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.rpc_url = url.into();
        self
    }

    /// Set the RPC request timeout.
    pub fn with_rpc_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.rpc_timeout_seconds = timeout_seconds;
        self
    }

    /// Set the per-holder history timeout.
    pub fn with_history_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.history_timeout_seconds = timeout_seconds;
        self
    }

    /// Set concurrent history lookups.
    pub fn with_max_concurrent_enrichments(mut self, max: usize) -> Self {
        self.config.max_concurrent_enrichments = max;
        self
    }

    /// Set the history lookup rate limit.
    pub fn with_history_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.config.history_requests_per_second = requests_per_second;
        self
    }

    /// Set account listing attempts.
    pub fn with_account_retries(mut self, attempts: usize) -> Self {
        self.config.account_retry_attempts = attempts;
        self
    }

    /// Set classifier thresholds for the default heuristic classifier.
    pub fn with_thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    /// Replace the classification strategy.
    pub fn with_classifier(mut self, classifier: Arc<dyn HolderClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Build the pipeline configuration.
    pub fn build_config(self) -> PipelineConfig {
        self.config
    }

    /// Build a pipeline over the given sources.
    pub fn build(
        self,
        accounts: Arc<dyn AccountSource>,
        history: Arc<dyn HistorySource>,
    ) -> anyhow::Result<HolderPipeline> {
        self.config.validate()?;

        let classifier: Arc<dyn HolderClassifier> = match self.classifier {
            Some(classifier) => classifier,
            None => Arc::new(HeuristicClassifier::new(self.config.thresholds.clone())),
        };

        let enricher = HolderEnricher::new(
            history,
            self.config.history_signature_limit,
            self.config.history_timeout(),
            self.config.max_concurrent_enrichments,
        );

        Ok(HolderPipeline::new(accounts, classifier, enricher, &self.config))
    }

    /// Build a pipeline backed by Solana RPC for both sources.
    pub fn build_rpc(self) -> anyhow::Result<HolderPipeline> {
        let sources = Arc::new(RpcDataSources::new(&self.config));
        self.build(sources.clone(), sources)
    }
}

impl Default for HolderPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
