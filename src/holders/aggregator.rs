//! Supply aggregation and per-holder share computation.

use crate::holders::types::MIN_ADDRESS_LEN;
use crate::types::{HolderRecord, RawTokenAccount};
use std::collections::HashMap;
use tracing::debug;

/// Result of aggregating the raw account list of one mint.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Sum of every reported balance, before filtering
    pub total_supply: f64,
    /// Qualifying holders in first-seen order, enrichment and class fields unset
    pub holders: Vec<HolderRecord>,
    /// Entries dropped by the sanity filters
    pub filtered_out: usize,
}

/// Turns raw token accounts into holder records with their share of supply.
///
/// The supply snapshot is the sum of all entries. An entry qualifies when its
/// owner is non-empty, differs from the mint, is longer than
/// [`MIN_ADDRESS_LEN`] characters and holds a positive balance. Several
/// accounts of the same owner are merged into one record.
pub fn aggregate(mint: &str, accounts: &[RawTokenAccount]) -> Aggregation {
    let total_supply: f64 = accounts.iter().map(RawTokenAccount::effective_balance).sum();

    let mut holders: Vec<HolderRecord> = Vec::new();
    let mut index_by_owner: HashMap<&str, usize> = HashMap::new();
    let mut filtered_out = 0;

    for account in accounts {
        let balance = account.effective_balance();
        if !qualifies(mint, &account.owner, balance) {
            filtered_out += 1;
            continue;
        }

        match index_by_owner.get(account.owner.as_str()) {
            Some(&i) => holders[i].balance += balance,
            None => {
                index_by_owner.insert(account.owner.as_str(), holders.len());
                holders.push(HolderRecord::new(account.owner.clone(), balance, 0.0));
            }
        }
    }

    for holder in &mut holders {
        holder.percentage = share_of(holder.balance, total_supply);
    }

    debug!(
        "Aggregated {} accounts into {} holders (supply {}, {} filtered)",
        accounts.len(),
        holders.len(),
        total_supply,
        filtered_out
    );

    Aggregation {
        total_supply,
        holders,
        filtered_out,
    }
}

fn qualifies(mint: &str, owner: &str, balance: f64) -> bool {
    !owner.is_empty() && owner != mint && owner.chars().count() > MIN_ADDRESS_LEN && balance > 0.0
}

/// Percentage of `total` held by `balance`; 0 when the total is 0.
pub fn share_of(balance: f64, total: f64) -> f64 {
    if total > 0.0 {
        (balance / total * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}
