//! Account primitives.
//!
//! An `Account` owns a stream of ledger transactions. Only `Active`
//! accounts accept new transactions; balance lookups are allowed for any
//! status.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Blocked,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Blocked => "blocked",
        }
    }
}

impl TryFrom<&str> for AccountStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "blocked" => Ok(Self::Blocked),
            other => Err(EngineError::InvalidTransaction(format!(
                "invalid account status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub account_number: String,
    pub account_name: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Builds a new, not-yet-persisted account (`id == 0`).
    pub fn new(account_number: String, account_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            account_number,
            account_name,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Fails with `AccountNotActive` unless the account may record new
    /// transactions. Blocked and inactive accounts are rejected identically.
    pub fn ensure_can_transact(&self) -> ResultEngine<()> {
        if !self.is_active() {
            return Err(EngineError::AccountNotActive(self.account_number.clone()));
        }
        Ok(())
    }

    pub fn activate(&mut self) {
        self.set_status(AccountStatus::Active);
    }

    pub fn deactivate(&mut self) {
        self.set_status(AccountStatus::Inactive);
    }

    pub fn block(&mut self) {
        self.set_status(AccountStatus::Blocked);
    }

    fn set_status(&mut self, status: AccountStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub account_number: String,
    pub account_name: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(has_many = "super::snapshots::Entity")]
    Snapshots,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Snapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::NotSet,
            account_number: ActiveValue::Set(account.account_number.clone()),
            account_name: ActiveValue::Set(account.account_name.clone()),
            status: ActiveValue::Set(account.status.as_str().to_string()),
            created_at: ActiveValue::Set(account.created_at),
            updated_at: ActiveValue::Set(account.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            account_number: model.account_number,
            account_name: model.account_name,
            status: AccountStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_and_inactive_reject_transactions() {
        let mut account = Account::new("ACC-001".to_string(), "Checking".to_string());
        assert!(account.ensure_can_transact().is_ok());

        account.deactivate();
        assert_eq!(
            account.ensure_can_transact(),
            Err(EngineError::AccountNotActive("ACC-001".to_string()))
        );

        account.block();
        assert_eq!(
            account.ensure_can_transact(),
            Err(EngineError::AccountNotActive("ACC-001".to_string()))
        );

        account.activate();
        assert!(account.ensure_can_transact().is_ok());
    }

    #[test]
    fn status_transitions_touch_updated_at() {
        let mut account = Account::new("ACC-002".to_string(), "Savings".to_string());
        let before = account.updated_at;
        account.block();
        assert!(account.updated_at >= before);
        assert_eq!(account.status, AccountStatus::Blocked);
    }
}
