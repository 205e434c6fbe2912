//! Balance snapshot primitives.
//!
//! A `BalanceSnapshot` materializes the cumulative balance of an account
//! as of `snapshot_date` inclusive, so later lookups only replay the
//! transactions after that date. At most one snapshot exists per
//! `(account_id, snapshot_date)`; rows are never updated or deleted by
//! the engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

pub(crate) const SNAPSHOT_TYPE_DAILY: &str = "daily";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: i32,
    pub account_id: i32,
    pub snapshot_date: NaiveDate,
    pub balance_amount: Decimal,
    pub transaction_count: i64,
    pub snapshot_type: String,
    pub created_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    /// Builds a new, not-yet-persisted daily snapshot (`id == 0`).
    pub fn daily(
        account_id: i32,
        snapshot_date: NaiveDate,
        balance: &Money,
        transaction_count: i64,
    ) -> Self {
        Self {
            id: 0,
            account_id,
            snapshot_date,
            balance_amount: balance.amount(),
            transaction_count,
            snapshot_type: SNAPSHOT_TYPE_DAILY.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "balance_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account_id: i32,
    pub snapshot_date: Date,
    /// Decimal amount stored as text so precision survives the round-trip.
    pub balance_amount: String,
    pub transaction_count: i64,
    pub snapshot_type: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BalanceSnapshot> for ActiveModel {
    fn from(snapshot: &BalanceSnapshot) -> Self {
        Self {
            id: ActiveValue::NotSet,
            account_id: ActiveValue::Set(snapshot.account_id),
            snapshot_date: ActiveValue::Set(snapshot.snapshot_date),
            balance_amount: ActiveValue::Set(snapshot.balance_amount.to_string()),
            transaction_count: ActiveValue::Set(snapshot.transaction_count),
            snapshot_type: ActiveValue::Set(snapshot.snapshot_type.clone()),
            created_at: ActiveValue::Set(snapshot.created_at),
        }
    }
}

impl TryFrom<Model> for BalanceSnapshot {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let balance_amount = model.balance_amount.parse::<Decimal>().map_err(|_| {
            EngineError::InvalidAmount(format!(
                "invalid snapshot amount: {}",
                model.balance_amount
            ))
        })?;
        Ok(Self {
            id: model.id,
            account_id: model.account_id,
            snapshot_date: model.snapshot_date,
            balance_amount,
            transaction_count: model.transaction_count,
            snapshot_type: model.snapshot_type,
            created_at: model.created_at,
        })
    }
}
