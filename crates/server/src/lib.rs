use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod accounts;
mod balances;
mod server;
mod transactions;

pub mod types {
    pub mod account {
        pub use api_types::account::{AccountNew, AccountView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            Pagination, TransactionList, TransactionListResponse, TransactionNew,
            TransactionType, TransactionView,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalanceGet, BalanceView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        // The original API reported "not active" as a 404 as well; kept
        // for caller compatibility.
        EngineError::AccountNotFound(_) | EngineError::AccountNotActive(_) => {
            StatusCode::NOT_FOUND
        }
        EngineError::DuplicateSnapshot(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidTransaction(_)
        | EngineError::InvalidAmount(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_account_maps_to_404() {
        let res =
            ServerError::from(EngineError::AccountNotFound("account 9".to_string()))
                .into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn inactive_account_maps_to_404_like_the_original_api() {
        let res = ServerError::from(EngineError::AccountNotActive("ACC-1".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_map_to_422() {
        for err in [
            EngineError::InvalidTransaction("x".to_string()),
            EngineError::InvalidAmount("x".to_string()),
            EngineError::CurrencyMismatch("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn duplicate_snapshot_maps_to_409() {
        let res = ServerError::from(EngineError::DuplicateSnapshot("x".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
