//! Match-history retention policy.
//!
//! Bounds stored history to a fixed window of the most recently recorded
//! matches. The policy only decides *which* records are excess; physically
//! purging them is a sequence of single-record deletes against the store, so
//! a partially failed purge leaves extra records behind until the next trim
//! invocation picks them up again.

use serde::Serialize;

use crate::db::models::MatchRecord;

/// Outcome of one purge pass. `purged < requested` means some deletes failed;
/// the store temporarily holds more than the window until the next pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrimReport {
    pub requested: usize,
    pub purged: usize,
}

impl TrimReport {
    pub fn is_complete(&self) -> bool {
        self.purged == self.requested
    }
}

/// Ids of records falling outside the retention window.
///
/// Input must be ordered newest first; everything past the first `window`
/// entries is excess. Re-running on the post-purge listing yields nothing,
/// which is what makes the trim safe to repeat.
pub fn excess_ids(matches_newest_first: &[MatchRecord], window: usize) -> Vec<i64> {
    matches_newest_first
        .iter()
        .skip(window)
        .map(|m| m.id)
        .collect()
}
