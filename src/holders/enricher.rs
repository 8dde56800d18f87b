//! Transaction-history enrichment of the top ranked holders.
//!
//! Every holder in the slice gets its own task, gated by a semaphore and
//! bounded by a per-call timeout. Slots are fixed before the fan-out starts and
//! results are written back by slot after checking the address, so completion
//! order never affects the ranking. A failed lookup leaves the record's
//! enrichment fields at zero and is reported as an [`EnrichmentFailure`].

use crate::holders::data_sources::HistorySource;
use crate::holders::error::{EnrichmentError, EnrichmentFailure};
use crate::types::{HolderRecord, Pubkey, SignatureEntry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Folded view of one address's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySummary {
    pub first_transaction: u64,
    pub last_transaction: u64,
    pub transaction_count: u32,
}

impl HistorySummary {
    /// Fold a signature list. Entries without a block time still count but
    /// don't move the first/last timestamps.
    pub fn from_entries(entries: &[SignatureEntry]) -> Self {
        let mut timestamps: Vec<u64> = entries.iter().filter_map(SignatureEntry::timestamp).collect();
        timestamps.sort_unstable();

        Self {
            first_transaction: timestamps.first().copied().unwrap_or(0),
            last_transaction: timestamps.last().copied().unwrap_or(0),
            transaction_count: u32::try_from(entries.len()).unwrap_or(u32::MAX),
        }
    }

    pub fn apply_to(&self, record: &mut HolderRecord) {
        record.first_transaction = self.first_transaction;
        record.last_transaction = self.last_transaction;
        record.transaction_count = self.transaction_count;
    }
}

/// Fetches and folds history for a bounded set of holders.
pub struct HolderEnricher {
    history: Arc<dyn HistorySource>,
    signature_limit: usize,
    call_timeout: Duration,
    permits: Arc<Semaphore>,
}

impl HolderEnricher {
    pub fn new(
        history: Arc<dyn HistorySource>,
        signature_limit: usize,
        call_timeout: Duration,
        max_concurrency: usize,
    ) -> Self {
        Self {
            history,
            signature_limit,
            call_timeout,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Enrich `holders` in place and return the addresses that could not be
    /// enriched. Never fails as a whole. Dropping the returned future aborts
    /// the lookups still in flight.
    #[instrument(skip_all, fields(holders = holders.len()))]
    pub async fn enrich(&self, holders: &mut [HolderRecord]) -> Vec<EnrichmentFailure> {
        let started = Instant::now();

        let mut tasks = JoinSet::new();
        for (slot, holder) in holders.iter().enumerate() {
            let address = holder.address.clone();
            let history = self.history.clone();
            let permits = self.permits.clone();
            let limit = self.signature_limit;
            let call_timeout = self.call_timeout;
            tasks.spawn(async move {
                let outcome = lookup(history, permits, &address, limit, call_timeout).await;
                (slot, address, outcome)
            });
        }

        let mut outcomes: Vec<Option<(Pubkey, LookupOutcome)>> = vec![None; holders.len()];
        let mut aborted: Vec<String> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, address, outcome)) => outcomes[slot] = Some((address, outcome)),
                Err(e) => aborted.push(e.to_string()),
            }
        }

        let mut failures = Vec::new();
        let mut aborted = aborted.into_iter();

        for (slot, outcome) in outcomes.into_iter().enumerate() {
            let (address, outcome) = match outcome {
                Some(done) => done,
                None => {
                    // the task panicked before reporting its slot
                    let reason = aborted.next().unwrap_or_else(|| "task lost".to_string());
                    (holders[slot].address.clone(), Err(EnrichmentError::Aborted(reason)))
                }
            };

            let Some(record) = holders.get_mut(slot).filter(|r| r.address == address) else {
                warn!("Enrichment slot {} no longer holds {}, dropping result", slot, address);
                continue;
            };

            match outcome {
                Ok(entries) if !entries.is_empty() => {
                    let summary = HistorySummary::from_entries(&entries);
                    summary.apply_to(record);
                    debug!(
                        "Enriched {}: {} txs, first {}, last {}",
                        address, summary.transaction_count, summary.first_transaction, summary.last_transaction
                    );
                }
                Ok(_) => {
                    debug!("No history returned for {}", address);
                    failures.push(EnrichmentFailure {
                        address,
                        error: EnrichmentError::NoHistory,
                    });
                }
                Err(error) => {
                    warn!("Enrichment failed for {}: {}", address, error);
                    failures.push(EnrichmentFailure { address, error });
                }
            }
        }

        info!(
            "Enriched {}/{} holders in {} ms",
            holders.iter().filter(|h| h.is_enriched()).count(),
            holders.len(),
            started.elapsed().as_millis()
        );

        failures
    }
}

type LookupOutcome = Result<Vec<SignatureEntry>, EnrichmentError>;

async fn lookup(
    history: Arc<dyn HistorySource>,
    permits: Arc<Semaphore>,
    address: &str,
    limit: usize,
    call_timeout: Duration,
) -> LookupOutcome {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| EnrichmentError::Aborted(e.to_string()))?;

    match tokio::time::timeout(call_timeout, history.fetch_signatures(address, limit)).await {
        Ok(Ok(entries)) => Ok(entries),
        Ok(Err(e)) => Err(EnrichmentError::Upstream(format!("{:#}", e))),
        Err(_) => Err(EnrichmentError::Timeout(call_timeout.as_millis())),
    }
}
