//! Snapshot creation policy.
//!
//! Snapshotting is an amortization device: a snapshot is only worth its
//! write cost once a full replay would scan "many" rows. The policy is a
//! pure decision over facts the caller already fetched, so it stays
//! trivially testable.

use chrono::NaiveDate;

/// Decides whether a freshly calculated balance should be materialized as
/// a daily snapshot.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotPolicy {
    threshold: u64,
}

impl SnapshotPolicy {
    /// A snapshot is created once the transaction count strictly exceeds
    /// `threshold`.
    #[must_use]
    pub const fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    /// Returns `true` iff a snapshot should be created for `target_date`.
    ///
    /// Never for future dates, never when one already exists for that
    /// exact date, and only when replaying would scan more than the
    /// threshold number of transactions.
    #[must_use]
    pub fn should_create(
        &self,
        target_date: NaiveDate,
        today: NaiveDate,
        snapshot_exists: bool,
        transaction_count: u64,
    ) -> bool {
        if target_date > today {
            return false;
        }
        if snapshot_exists {
            return false;
        }
        transaction_count > self.threshold
    }
}
