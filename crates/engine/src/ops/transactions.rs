//! Transaction ingestion and ledger read primitives.
//!
//! Ingestion is all-or-nothing: either the row is durably recorded and
//! the account cache invalidated, or nothing is recorded. Persistence
//! failures propagate unmodified; only the cache invalidation is
//! best-effort.

use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};

use crate::util::ensure_ledger_currency;
use crate::{
    Account, Currency, EngineError, Money, ResultEngine, Transaction, TransactionKind,
    transactions,
};

use super::{Engine, with_tx};

/// Command for recording a new ledger transaction.
#[derive(Clone, Debug)]
pub struct RecordTransactionCmd {
    pub account_id: i32,
    /// Decimal amount as entered by the caller, e.g. `"250.50"`.
    pub amount: String,
    /// Defaults to the ledger currency when `None`.
    pub currency: Option<Currency>,
    pub kind: TransactionKind,
    pub description: String,
    /// Defaults to today when `None`.
    pub transaction_date: Option<NaiveDate>,
    pub reference_id: Option<String>,
}

/// Command for listing an account's transactions.
#[derive(Clone, Debug)]
pub struct ListTransactionsCmd {
    pub account_id: i32,
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
    /// Inclusive lower bound on `transaction_date`.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on `transaction_date`.
    pub end_date: Option<NaiveDate>,
}

/// One page of transactions, newest first, plus the unpaged total.
#[derive(Clone, Debug)]
pub struct TransactionPage {
    pub account: Account,
    pub transactions: Vec<Transaction>,
    pub total_count: u64,
}

impl Engine {
    /// Validate and append a transaction, then invalidate the account's
    /// cached balances.
    ///
    /// Fails with `AccountNotFound` for unknown accounts and
    /// `AccountNotActive` for inactive or blocked ones. Validation
    /// failures surface as `InvalidTransaction`/`InvalidAmount` before
    /// anything is written.
    pub async fn record_transaction(&self, cmd: RecordTransactionCmd) -> ResultEngine<Transaction> {
        let currency = cmd.currency.unwrap_or(self.config().currency);
        ensure_ledger_currency(self.config().currency, currency)?;
        let amount = Money::parse(&cmd.amount, currency)?;

        let transaction = with_tx!(self, |db_tx| {
            let account = Self::require_account(&db_tx, cmd.account_id).await?;
            account.ensure_can_transact()?;

            let transaction = match cmd.kind {
                TransactionKind::Credit => Transaction::credit(
                    account.id,
                    amount,
                    &cmd.description,
                    cmd.transaction_date,
                    cmd.reference_id.clone(),
                )?,
                TransactionKind::Debit => Transaction::debit(
                    account.id,
                    amount,
                    &cmd.description,
                    cmd.transaction_date,
                    cmd.reference_id.clone(),
                )?,
            };

            let model = transactions::ActiveModel::from(&transaction)
                .insert(&db_tx)
                .await?;
            Transaction::try_from(model)
        })?;

        // The write is committed; a stale cache entry is now possible for
        // any date >= transaction_date, so drop the whole account.
        if let Err(err) = self.cache().invalidate_account(transaction.account_id).await {
            tracing::warn!(
                account_id = transaction.account_id,
                "cache invalidation failed: {err}"
            );
        }

        Ok(transaction)
    }

    /// List an account's transactions, newest first, with date filters
    /// and pagination.
    pub async fn list_transactions(&self, cmd: ListTransactionsCmd) -> ResultEngine<TransactionPage> {
        if cmd.page == 0 || cmd.limit == 0 {
            return Err(EngineError::InvalidTransaction(
                "page and limit must be >= 1".to_string(),
            ));
        }
        // page and limit come straight from the query string; the offset
        // must not wrap.
        let offset = (cmd.page - 1)
            .checked_mul(cmd.limit)
            .ok_or_else(|| EngineError::InvalidTransaction("page out of range".to_string()))?;

        with_tx!(self, |db_tx| {
            let account = Self::require_account(&db_tx, cmd.account_id).await?;

            let mut query = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(cmd.account_id));
            if let Some(start) = cmd.start_date {
                query = query.filter(transactions::Column::TransactionDate.gte(start));
            }
            if let Some(end) = cmd.end_date {
                query = query.filter(transactions::Column::TransactionDate.lte(end));
            }

            let total_count = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_desc(transactions::Column::TransactionDate)
                .order_by_desc(transactions::Column::Id)
                .offset(offset)
                .limit(cmd.limit)
                .all(&db_tx)
                .await?;

            let transactions = models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(TransactionPage {
                account,
                transactions,
                total_count,
            })
        })
    }

    /// Signed sum of every transaction with `transaction_date <= date`.
    ///
    /// Folds page by page in exact decimal arithmetic; equivalent to
    /// replaying the full history up to and including `date`.
    pub(crate) async fn sum_balance<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<Money> {
        let mut balance = Money::zero(self.config().currency);
        let mut pages = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .filter(transactions::Column::TransactionDate.lte(date))
            .order_by_asc(transactions::Column::Id)
            .paginate(db, self.config().replay_page_size);

        while let Some(models) = pages.fetch_and_next().await? {
            for model in models {
                let tx = Transaction::try_from(model)?;
                balance = Self::apply(&balance, &tx)?;
            }
        }
        Ok(balance)
    }

    /// Transactions in `(from_exclusive, to_inclusive]`, capped at
    /// `max_rows` to bound replay memory when a snapshot is very stale.
    pub(crate) async fn list_range<C: ConnectionTrait>(
        db: &C,
        account_id: i32,
        from_exclusive: NaiveDate,
        to_inclusive: NaiveDate,
        max_rows: u64,
    ) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .filter(transactions::Column::TransactionDate.gt(from_exclusive))
            .filter(transactions::Column::TransactionDate.lte(to_inclusive))
            .order_by_asc(transactions::Column::TransactionDate)
            .order_by_asc(transactions::Column::Id)
            .limit(max_rows)
            .all(db)
            .await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    /// Number of transactions with `transaction_date <= date`.
    pub(crate) async fn count_up_to<C: ConnectionTrait>(
        db: &C,
        account_id: i32,
        date: NaiveDate,
    ) -> ResultEngine<u64> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .filter(transactions::Column::TransactionDate.lte(date))
            .count(db)
            .await?;
        Ok(count)
    }

    /// Fold one transaction into a running balance: credits add, debits
    /// subtract. Commutative, so replay order never changes the sum.
    pub(crate) fn apply(balance: &Money, tx: &Transaction) -> ResultEngine<Money> {
        match tx.kind {
            TransactionKind::Credit => balance.add(&tx.amount),
            TransactionKind::Debit => balance.subtract(&tx.amount),
        }
    }
}
