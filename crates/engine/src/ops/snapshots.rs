//! Snapshot store operations.
//!
//! Snapshots bound replay cost: the resolver starts from the latest
//! snapshot at or before the target date and only folds the transactions
//! after it. Creation is guarded by an existence check, with the unique
//! index on `(account_id, snapshot_date)` as the backstop for concurrent
//! creators.

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{BalanceSnapshot, EngineError, ResultEngine, snapshots};

use super::{Engine, with_tx};

impl Engine {
    /// Materialize a daily snapshot for `(account_id, date)` from the
    /// ledger.
    ///
    /// Fails with `DuplicateSnapshot` when one already exists for that
    /// exact date and `AccountNotFound` for unknown accounts.
    pub async fn create_snapshot(
        &self,
        account_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<BalanceSnapshot> {
        with_tx!(self, |db_tx| {
            Self::require_account(&db_tx, account_id).await?;
            self.create_daily_snapshot(&db_tx, account_id, date).await
        })
    }

    /// Compute balance + transaction count as of `date` and insert the
    /// snapshot row. Caller supplies the surrounding DB transaction.
    pub(crate) async fn create_daily_snapshot<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<BalanceSnapshot> {
        if Self::snapshot_exists(db, account_id, date).await? {
            return Err(EngineError::DuplicateSnapshot(format!(
                "account {account_id} on {date}"
            )));
        }

        let balance = self.sum_balance(db, account_id, date).await?;
        let transaction_count = Self::count_up_to(db, account_id, date).await?;

        let snapshot = BalanceSnapshot::daily(
            account_id,
            date,
            &balance,
            i64::try_from(transaction_count).unwrap_or(i64::MAX),
        );
        let model = snapshots::ActiveModel::from(&snapshot).insert(db).await?;
        BalanceSnapshot::try_from(model)
    }

    /// Latest snapshot with `snapshot_date <= date`, if any.
    pub(crate) async fn latest_snapshot_at_or_before<C: ConnectionTrait>(
        db: &C,
        account_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<Option<BalanceSnapshot>> {
        let model = snapshots::Entity::find()
            .filter(snapshots::Column::AccountId.eq(account_id))
            .filter(snapshots::Column::SnapshotDate.lte(date))
            .order_by_desc(snapshots::Column::SnapshotDate)
            .one(db)
            .await?;
        model.map(BalanceSnapshot::try_from).transpose()
    }

    pub(crate) async fn snapshot_exists<C: ConnectionTrait>(
        db: &C,
        account_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<bool> {
        let existing = snapshots::Entity::find()
            .filter(snapshots::Column::AccountId.eq(account_id))
            .filter(snapshots::Column::SnapshotDate.eq(date))
            .one(db)
            .await?;
        Ok(existing.is_some())
    }
}
