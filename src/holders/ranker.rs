//! Ranking of classified holders.

use crate::types::HolderRecord;

/// Sort holders by share, largest first. The sort is stable, so equal
/// shares keep their incoming order.
pub fn rank(holders: &mut [HolderRecord]) {
    holders.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
}

/// Head of the ranked list that gets enriched.
pub fn enrichment_slice(holders: &mut [HolderRecord], top_n: usize) -> &mut [HolderRecord] {
    let n = top_n.min(holders.len());
    &mut holders[..n]
}

/// Cut the ranked list down to the reported size.
pub fn truncate_output(holders: &mut Vec<HolderRecord>, output_cap: usize) {
    holders.truncate(output_cap);
}
