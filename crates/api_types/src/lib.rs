//! Wire types shared by the server and its clients.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Monetary value on the wire: decimal amount as a string plus its
/// 3-letter currency code. The amount is never a JSON number, so no
/// precision is lost in transit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyView {
    pub amount: String,
    pub currency: String,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub account_number: String,
        pub account_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i32,
        pub account_number: String,
        pub account_name: String,
        pub status: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        Credit,
        Debit,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: i32,
        /// Decimal amount as a string, e.g. `"250.50"`.
        pub amount: String,
        pub transaction_type: TransactionType,
        pub description: String,
        /// Defaults to today when omitted.
        pub transaction_date: Option<NaiveDate>,
        pub reference_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub account_id: i32,
        pub amount: MoneyView,
        pub transaction_type: TransactionType,
        pub description: String,
        pub transaction_date: NaiveDate,
        pub created_at: DateTime<Utc>,
        pub reference_id: Option<String>,
    }

    /// Query parameters for `GET /transactions`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub account_id: i32,
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Pagination {
        pub page: u64,
        pub limit: u64,
        pub total_count: u64,
        pub total_pages: u64,
        pub has_next: bool,
        pub has_prev: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub account_id: i32,
        pub account_number: String,
        pub transactions: Vec<TransactionView>,
        pub pagination: Pagination,
    }
}

pub mod balance {
    use super::*;

    /// Query parameters for `GET /accounts/:id/balance`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BalanceGet {
        /// Defaults to today when omitted.
        pub target_date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub account_id: i32,
        pub account_number: String,
        pub account_name: String,
        pub balance: MoneyView,
        pub date: NaiveDate,
        /// Which tier resolved the balance: `cache`, `snapshot`,
        /// `calculated` or `calculated+snapshot_created`.
        pub source: String,
    }
}
