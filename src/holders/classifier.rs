//! Holder classification.
//!
//! The shipped [`HeuristicClassifier`] is a best-effort guess, not ground
//! truth: an address is only recognised as a pool by its text or by holding a
//! large share, so both false positives and false negatives are expected.
//! Callers that need a better signal can plug in their own
//! [`HolderClassifier`].

use crate::holders::types::ClassifierThresholds;
use crate::types::HolderRecord;
use serde::{Deserialize, Serialize};

/// Class assigned to a holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolderClass {
    LiquidityPool,
    Whale,
    Holder,
}

impl HolderClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolderClass::LiquidityPool => "liquidity_pool",
            HolderClass::Whale => "whale",
            HolderClass::Holder => "holder",
        }
    }

    /// Read the class back from a record's flags.
    pub fn of(record: &HolderRecord) -> Self {
        if record.is_liquidity_pool {
            HolderClass::LiquidityPool
        } else if record.is_whale {
            HolderClass::Whale
        } else {
            HolderClass::Holder
        }
    }

    /// Write the class onto a record. Both flags are always set, so a
    /// record can't end up marked as pool and whale at once.
    pub fn apply_to(self, record: &mut HolderRecord) {
        record.is_liquidity_pool = self == HolderClass::LiquidityPool;
        record.is_whale = self == HolderClass::Whale;
        record.is_creator = false;
    }
}

/// Strategy that decides the class of a single holder.
pub trait HolderClassifier: Send + Sync {
    fn classify(&self, holder: &HolderRecord) -> HolderClass;
}

/// Address-text and share based classification, first match wins:
/// pool marker in the address or share above the pool threshold, then share
/// above the whale threshold, otherwise a plain holder.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    thresholds: ClassifierThresholds,
    pool_markers: Vec<String>,
}

impl HeuristicClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self {
            thresholds,
            pool_markers: vec!["pool".to_string(), "liquidity".to_string()],
        }
    }

    /// Replace the case-sensitive substrings that mark an address as a pool.
    pub fn with_pool_markers(mut self, markers: Vec<String>) -> Self {
        self.pool_markers = markers;
        self
    }

    fn looks_like_pool(&self, address: &str) -> bool {
        self.pool_markers.iter().any(|m| address.contains(m.as_str()))
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new(ClassifierThresholds::default())
    }
}

impl HolderClassifier for HeuristicClassifier {
    fn classify(&self, holder: &HolderRecord) -> HolderClass {
        if self.looks_like_pool(&holder.address)
            || holder.percentage > self.thresholds.liquidity_pool_percentage
        {
            HolderClass::LiquidityPool
        } else if holder.percentage > self.thresholds.whale_percentage {
            HolderClass::Whale
        } else {
            HolderClass::Holder
        }
    }
}

/// Classify every record in place.
pub fn classify_all(classifier: &dyn HolderClassifier, holders: &mut [HolderRecord]) {
    for holder in holders.iter_mut() {
        let class = classifier.classify(holder);
        class.apply_to(holder);
    }
}
