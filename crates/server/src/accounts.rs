//! Account API endpoints.

use api_types::account::{AccountNew, AccountView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_account(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        account_number: account.account_number,
        account_name: account.account_name,
        status: account.status.as_str().to_string(),
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let account = state
        .engine
        .new_account(&payload.account_number, &payload.account_name)
        .await?;
    Ok((StatusCode::CREATED, Json(map_account(account))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(account_id).await?;
    Ok(Json(map_account(account)))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.engine.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(map_account).collect()))
}

pub async fn activate(
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.activate_account(account_id).await?;
    Ok(Json(map_account(account)))
}

pub async fn deactivate(
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.deactivate_account(account_id).await?;
    Ok(Json(map_account(account)))
}

pub async fn block(
    State(state): State<ServerState>,
    Path(account_id): Path<i32>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.block_account(account_id).await?;
    Ok(Json(map_account(account)))
}
