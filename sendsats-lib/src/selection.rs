//! Unspent-output selection.
//!
//! Greedy first-fit: cheap and predictable, at the cost of not minimizing
//! fees or input count. Candidates are taken in provider order; the selector
//! never sorts (ordering is part of the provider contract, typically
//! oldest-first).

use crate::types::UnspentOutput;

/// Outcome of a selection pass.
///
/// Invariant: `total_sats` equals the sum of `chosen` amounts. Whether the
/// total actually covers the target is for the caller to check; an exhausted
/// candidate list yields the partial accumulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Accepted inputs, in the order they were scanned.
    pub chosen: Vec<UnspentOutput>,
    /// Running total of the accepted inputs, in satoshis.
    pub total_sats: u64,
}

impl Selection {
    /// Whether the accumulated inputs cover `target_sats`.
    pub fn covers(&self, target_sats: u64) -> bool {
        self.total_sats >= target_sats
    }
}

/// Pick a subset of `candidates` sufficient to cover `target_sats`.
///
/// Candidates with fewer than `min_confirmations` confirmations are skipped.
/// Scanning halts the moment the running total reaches the target, so a
/// target of zero selects nothing.
pub fn select_utxos(
    candidates: Vec<UnspentOutput>,
    target_sats: u64,
    min_confirmations: u64,
) -> Selection {
    let mut selection = Selection::default();
    for candidate in candidates {
        if selection.covers(target_sats) {
            break;
        }
        if candidate.confirmations < min_confirmations {
            continue;
        }
        selection.total_sats += candidate.amount_sats;
        selection.chosen.push(candidate);
    }
    selection
}
