//! Holder report pipeline.
//!
//! Sequences the stages for one mint: account listing, aggregation,
//! classification, ranking, enrichment of the top holders and the final cut
//! to the report size. Only an invalid mint or a failed account listing end
//! the run; everything after that degrades to default field values.

use crate::holders::aggregator::aggregate;
use crate::holders::classifier::{classify_all, HolderClassifier};
use crate::holders::data_sources::AccountSource;
use crate::holders::enricher::HolderEnricher;
use crate::holders::error::HolderReportError;
use crate::holders::ranker::{enrichment_slice, rank, truncate_output};
use crate::holders::types::PipelineConfig;
use crate::types::HolderReport;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Computes holder reports from an account source and a history source.
pub struct HolderPipeline {
    accounts: Arc<dyn AccountSource>,
    classifier: Arc<dyn HolderClassifier>,
    enricher: HolderEnricher,
    enrichment_top_n: usize,
    output_cap: usize,
}

impl HolderPipeline {
    pub fn new(
        accounts: Arc<dyn AccountSource>,
        classifier: Arc<dyn HolderClassifier>,
        enricher: HolderEnricher,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            accounts,
            classifier,
            enricher,
            enrichment_top_n: config.enrichment_top_n,
            output_cap: config.output_cap,
        }
    }

    /// Build the ranked, classified and enriched holder report for `mint_address`.
    #[instrument(skip(self), fields(mint = %mint_address))]
    pub async fn compute_holder_report(&self, mint_address: &str) -> Result<HolderReport, HolderReportError> {
        let mint = mint_address.trim();
        if mint.is_empty() {
            return Err(HolderReportError::InvalidArgument(
                "mint address is required".to_string(),
            ));
        }

        let started = Instant::now();
        info!("Computing holder report for {}", mint);

        let accounts = self.accounts.fetch_token_accounts(mint).await.map_err(|e| {
            error!("Account source failed for {}: {:#}", mint, e);
            HolderReportError::SourceUnavailable {
                detail: format!("{:#}", e),
            }
        })?;

        let aggregation = aggregate(mint, &accounts);
        let mut holders = aggregation.holders;

        if holders.is_empty() {
            info!("No qualifying holders for {} ({} accounts)", mint, accounts.len());
            return Ok(HolderReport::empty());
        }

        classify_all(self.classifier.as_ref(), &mut holders);
        rank(&mut holders);
        debug!("Ranked {} holders", holders.len());

        // never enrich records that the output cut will drop
        let top_n = self.enrichment_top_n.min(self.output_cap);
        let enrichment_failures = self.enricher.enrich(enrichment_slice(&mut holders, top_n)).await;

        truncate_output(&mut holders, self.output_cap);

        info!(
            "Holder report for {}: {} holders, {} enrichment failures, {} ms",
            mint,
            holders.len(),
            enrichment_failures.len(),
            started.elapsed().as_millis()
        );

        Ok(HolderReport {
            holders,
            enrichment_failures,
        })
    }
}
