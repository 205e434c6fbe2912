//! Balance API endpoint.

use api_types::MoneyView;
use api_types::balance::{BalanceGet, BalanceView};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{ServerError, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
    Query(query): Query<BalanceGet>,
) -> Result<Json<BalanceView>, ServerError> {
    let resolution = state
        .engine
        .resolve_balance(account_id, query.target_date)
        .await?;

    Ok(Json(BalanceView {
        account_id: resolution.account_id,
        account_number: resolution.account_number,
        account_name: resolution.account_name,
        balance: MoneyView {
            amount: resolution.balance.amount().to_string(),
            currency: resolution.balance.currency().code().to_string(),
        },
        date: resolution.date,
        source: resolution.source.as_str().to_string(),
    }))
}
