//! Transaction primitives.
//!
//! A `Transaction` is an immutable, signed ledger event: a `Credit`
//! increases an account balance, a `Debit` decreases it. Rows are
//! append-only; the engine never updates or deletes them.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, Money, ResultEngine};

/// Longest description accepted, measured after trimming.
pub(crate) const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(EngineError::InvalidTransaction(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub account_id: i32,
    pub amount: Money,
    pub kind: TransactionKind,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub reference_id: Option<String>,
}

impl Transaction {
    /// Builds a credit transaction; `transaction_date` defaults to today.
    pub fn credit(
        account_id: i32,
        amount: Money,
        description: &str,
        transaction_date: Option<NaiveDate>,
        reference_id: Option<String>,
    ) -> ResultEngine<Self> {
        Self::build(
            account_id,
            amount,
            TransactionKind::Credit,
            description,
            transaction_date,
            reference_id,
        )
    }

    /// Builds a debit transaction; `transaction_date` defaults to today.
    pub fn debit(
        account_id: i32,
        amount: Money,
        description: &str,
        transaction_date: Option<NaiveDate>,
        reference_id: Option<String>,
    ) -> ResultEngine<Self> {
        Self::build(
            account_id,
            amount,
            TransactionKind::Debit,
            description,
            transaction_date,
            reference_id,
        )
    }

    pub fn is_credit(&self) -> bool {
        self.kind == TransactionKind::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.kind == TransactionKind::Debit
    }

    fn build(
        account_id: i32,
        amount: Money,
        kind: TransactionKind,
        description: &str,
        transaction_date: Option<NaiveDate>,
        reference_id: Option<String>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidTransaction(
                "transaction amount must be positive".to_string(),
            ));
        }

        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidTransaction(
                "transaction description is required".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(EngineError::InvalidTransaction(
                "transaction description too long".to_string(),
            ));
        }

        Ok(Self {
            id: 0,
            account_id,
            amount,
            kind,
            description: description.to_string(),
            transaction_date: transaction_date.unwrap_or_else(|| Utc::now().date_naive()),
            created_at: Utc::now(),
            reference_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account_id: i32,
    /// Decimal amount stored as text so precision survives the round-trip.
    pub amount: String,
    pub currency: String,
    pub kind: String,
    pub description: String,
    pub transaction_date: Date,
    pub created_at: DateTimeUtc,
    pub reference_id: Option<String>,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::NotSet,
            account_id: ActiveValue::Set(tx.account_id),
            amount: ActiveValue::Set(tx.amount.amount().to_string()),
            currency: ActiveValue::Set(tx.amount.currency().code().to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            transaction_date: ActiveValue::Set(tx.transaction_date),
            created_at: ActiveValue::Set(tx.created_at),
            reference_id: ActiveValue::Set(tx.reference_id.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let currency = Currency::try_from(model.currency.as_str())?;
        let amount = Money::parse(&model.amount, currency)?;
        Ok(Self {
            id: model.id,
            account_id: model.account_id,
            amount,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            description: model.description,
            transaction_date: model.transaction_date,
            created_at: model.created_at,
            reference_id: model.reference_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brl(raw: &str) -> Money {
        Money::parse(raw, Currency::Brl).unwrap()
    }

    #[test]
    fn credit_defaults_date_to_today() {
        let tx = Transaction::credit(1, brl("10.00"), "salary", None, None).unwrap();
        assert_eq!(tx.transaction_date, Utc::now().date_naive());
        assert_eq!(tx.id, 0);
        assert!(tx.is_credit());
    }

    #[test]
    fn rejects_non_positive_amount() {
        let err = Transaction::debit(1, brl("0"), "noop", None, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransaction(_)));
    }

    #[test]
    fn rejects_blank_description() {
        let err = Transaction::credit(1, brl("1.00"), "   ", None, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransaction(_)));
    }

    #[test]
    fn rejects_oversized_description() {
        let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
        let err = Transaction::credit(1, brl("1.00"), &long, None, None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransaction(_)));
    }

    #[test]
    fn description_is_trimmed() {
        let tx = Transaction::credit(1, brl("1.00"), "  rent  ", None, None).unwrap();
        assert_eq!(tx.description, "rent");
    }
}
