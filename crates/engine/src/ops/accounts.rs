//! Account operations: creation, lookup and status transitions.

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::util::normalize_required_text;
use crate::{Account, EngineError, ResultEngine, accounts};

use super::{Engine, with_tx};

impl Engine {
    /// Create a new, active account.
    ///
    /// The account number must be unique; the name is trimmed and
    /// NFC-normalized.
    pub async fn new_account(
        &self,
        account_number: &str,
        account_name: &str,
    ) -> ResultEngine<Account> {
        let account_number = normalize_required_text(account_number, "account number")?;
        let account_name = normalize_required_text(account_name, "account name")?;

        with_tx!(self, |db_tx| {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::AccountNumber.eq(account_number.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::InvalidTransaction(format!(
                    "account number {account_number} already exists"
                )));
            }

            let account = Account::new(account_number, account_name);
            let model = accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Account::try_from(model)
        })
    }

    /// Fetch an account by id.
    pub async fn account(&self, account_id: i32) -> ResultEngine<Account> {
        Self::require_account(&self.database, account_id).await
    }

    /// List every account, oldest first.
    pub async fn list_accounts(&self) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Id)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    /// Mark the account active.
    pub async fn activate_account(&self, account_id: i32) -> ResultEngine<Account> {
        self.transition_account(account_id, Account::activate).await
    }

    /// Mark the account inactive; it stops accepting transactions.
    pub async fn deactivate_account(&self, account_id: i32) -> ResultEngine<Account> {
        self.transition_account(account_id, Account::deactivate)
            .await
    }

    /// Block the account; it stops accepting transactions.
    pub async fn block_account(&self, account_id: i32) -> ResultEngine<Account> {
        self.transition_account(account_id, Account::block).await
    }

    /// Rename an account. Every other field is immutable post-creation.
    pub async fn rename_account(&self, account_id: i32, account_name: &str) -> ResultEngine<Account> {
        let account_name = normalize_required_text(account_name, "account name")?;
        with_tx!(self, |db_tx| {
            let mut account = Self::require_account(&db_tx, account_id).await?;
            account.account_name = account_name;
            account.updated_at = chrono::Utc::now();

            let model = accounts::ActiveModel {
                id: ActiveValue::Set(account.id),
                account_name: ActiveValue::Set(account.account_name.clone()),
                updated_at: ActiveValue::Set(account.updated_at),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(account)
        })
    }

    async fn transition_account(
        &self,
        account_id: i32,
        transition: fn(&mut Account),
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let mut account = Self::require_account(&db_tx, account_id).await?;
            transition(&mut account);

            let model = accounts::ActiveModel {
                id: ActiveValue::Set(account.id),
                status: ActiveValue::Set(account.status.as_str().to_string()),
                updated_at: ActiveValue::Set(account.updated_at),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(account)
        })
    }

    /// Load an account or fail with `AccountNotFound`.
    pub(crate) async fn require_account<C: ConnectionTrait>(
        db: &C,
        account_id: i32,
    ) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(format!("account {account_id}")))?;
        Account::try_from(model)
    }
}
