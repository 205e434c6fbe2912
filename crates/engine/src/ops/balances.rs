//! Point-in-time balance resolution.
//!
//! The resolver is a tiered read path with a strict order, first success
//! wins: cache probe, snapshot + delta replay, full replay. A full
//! replay may opportunistically materialize a new snapshot (policy
//! decided), and every resolved balance is written through to the cache.
//! Cache and snapshot-creation failures never surface: the caller always
//! gets a correct balance even when every optimization fails.

use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};

use crate::{Account, BalanceSnapshot, Money, ResultEngine};

use super::{Engine, with_tx};

/// Which tier produced a resolved balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    Cache,
    Snapshot,
    Calculated,
    /// Full replay that also persisted a new snapshot as a side effect.
    #[serde(rename = "calculated+snapshot_created")]
    CalculatedSnapshotCreated,
}

impl BalanceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Snapshot => "snapshot",
            Self::Calculated => "calculated",
            Self::CalculatedSnapshotCreated => "calculated+snapshot_created",
        }
    }
}

impl core::fmt::Display for BalanceSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved balance plus the account it belongs to and the tier that
/// produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceResolution {
    pub account_id: i32,
    pub account_number: String,
    pub account_name: String,
    pub balance: Money,
    pub date: NaiveDate,
    pub source: BalanceSource,
}

impl BalanceResolution {
    fn new(account: Account, balance: Money, date: NaiveDate, source: BalanceSource) -> Self {
        Self {
            account_id: account.id,
            account_number: account.account_number,
            account_name: account.account_name,
            balance,
            date,
            source,
        }
    }
}

impl Engine {
    /// Resolve the balance of `account_id` as of `target_date`
    /// (defaults to today).
    ///
    /// Balance lookup is allowed for inactive and blocked accounts; only
    /// ingestion enforces the active check.
    pub async fn resolve_balance(
        &self,
        account_id: i32,
        target_date: Option<NaiveDate>,
    ) -> ResultEngine<BalanceResolution> {
        let today = Utc::now().date_naive();
        let date = target_date.unwrap_or(today);

        // Account existence is checked before any cache/snapshot/store
        // probe.
        let account = Self::require_account(self.database(), account_id).await?;

        match self.cache().get(account_id, date).await {
            Ok(Some(balance)) => {
                return Ok(BalanceResolution::new(
                    account,
                    balance,
                    date,
                    BalanceSource::Cache,
                ));
            }
            Ok(None) => {}
            Err(err) => {
                // A failing cache reads as a miss.
                tracing::debug!(account_id, %date, "cache read failed: {err}");
            }
        }

        let (balance, source) = with_tx!(self, |db_tx| {
            match Self::latest_snapshot_at_or_before(&db_tx, account_id, date).await? {
                Some(snapshot) => {
                    let balance = self
                        .replay_from_snapshot(&db_tx, &snapshot, account_id, date)
                        .await?;
                    Ok::<_, crate::EngineError>((balance, BalanceSource::Snapshot))
                }
                None => {
                    let balance = self.sum_balance(&db_tx, account_id, date).await?;
                    let source = match self
                        .maybe_create_snapshot(&db_tx, account_id, date, today)
                        .await
                    {
                        Ok(true) => BalanceSource::CalculatedSnapshotCreated,
                        Ok(false) => BalanceSource::Calculated,
                        Err(err) => {
                            // Snapshot creation is opportunistic; a lost
                            // race or store hiccup must not fail the
                            // lookup.
                            tracing::debug!(
                                account_id,
                                %date,
                                "snapshot creation skipped: {err}"
                            );
                            BalanceSource::Calculated
                        }
                    };
                    Ok((balance, source))
                }
            }
        })?;

        let ttl = if date < today {
            self.config().historical_ttl_secs
        } else {
            self.config().current_ttl_secs
        };
        if let Err(err) = self.cache().set(account_id, date, &balance, ttl).await {
            tracing::debug!(account_id, %date, "cache write failed: {err}");
        }

        Ok(BalanceResolution::new(account, balance, date, source))
    }

    /// Snapshot balance plus a fold of the transactions in
    /// `(snapshot_date, date]`.
    async fn replay_from_snapshot<C: ConnectionTrait>(
        &self,
        db: &C,
        snapshot: &BalanceSnapshot,
        account_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<Money> {
        let mut balance = Money::new(snapshot.balance_amount, self.config().currency);

        if snapshot.snapshot_date < date {
            let delta = Self::list_range(
                db,
                account_id,
                snapshot.snapshot_date,
                date,
                self.config().replay_page_size,
            )
            .await?;
            for tx in &delta {
                balance = Self::apply(&balance, tx)?;
            }
        }

        Ok(balance)
    }

    /// Ask the policy and, on yes, materialize a daily snapshot for
    /// `(account_id, date)`. Returns whether one was created.
    async fn maybe_create_snapshot<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: i32,
        date: NaiveDate,
        today: NaiveDate,
    ) -> ResultEngine<bool> {
        let exists = Self::snapshot_exists(db, account_id, date).await?;
        let count = Self::count_up_to(db, account_id, date).await?;
        if !self.policy().should_create(date, today, exists, count) {
            return Ok(false);
        }

        self.create_daily_snapshot(db, account_id, date).await?;
        Ok(true)
    }
}
