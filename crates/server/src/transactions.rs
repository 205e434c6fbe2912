//! Transactions API endpoints.

use api_types::MoneyView;
use api_types::transaction::{
    Pagination, TransactionList, TransactionListResponse, TransactionNew, TransactionType,
    TransactionView,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{ListTransactionsCmd, RecordTransactionCmd, TransactionKind};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: TransactionType) -> TransactionKind {
    match kind {
        TransactionType::Credit => TransactionKind::Credit,
        TransactionType::Debit => TransactionKind::Debit,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        amount: MoneyView {
            amount: tx.amount.amount().to_string(),
            currency: tx.amount.currency().code().to_string(),
        },
        transaction_type: match tx.kind {
            TransactionKind::Credit => TransactionType::Credit,
            TransactionKind::Debit => TransactionType::Debit,
        },
        description: tx.description,
        transaction_date: tx.transaction_date,
        created_at: tx.created_at,
        reference_id: tx.reference_id,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let transaction = state
        .engine
        .record_transaction(RecordTransactionCmd {
            account_id: payload.account_id,
            amount: payload.amount,
            currency: None,
            kind: map_kind(payload.transaction_type),
            description: payload.description,
            transaction_date: payload.transaction_date,
            reference_id: payload.reference_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(map_transaction(transaction))))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(payload): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let page = payload.page.unwrap_or(1);
    let limit = payload.limit.unwrap_or(50).min(100);

    let result = state
        .engine
        .list_transactions(ListTransactionsCmd {
            account_id: payload.account_id,
            page,
            limit,
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await?;

    let total_pages = result.total_count.div_ceil(limit);
    let pagination = Pagination {
        page,
        limit,
        total_count: result.total_count,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    };

    Ok(Json(TransactionListResponse {
        account_id: result.account.id,
        account_number: result.account.account_number,
        transactions: result
            .transactions
            .into_iter()
            .map(map_transaction)
            .collect(),
        pagination,
    }))
}
