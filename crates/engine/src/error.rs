//! The module contains the errors the engine can throw.
//!
//! Client-input errors ([`AccountNotFound`], [`AccountNotActive`],
//! [`InvalidTransaction`], [`InvalidAmount`]) propagate to the caller
//! unmodified. [`DuplicateSnapshot`] is internal: the balance resolver
//! always suppresses it, since snapshot creation is opportunistic.
//!
//! [`AccountNotFound`]: EngineError::AccountNotFound
//! [`AccountNotActive`]: EngineError::AccountNotActive
//! [`InvalidTransaction`]: EngineError::InvalidTransaction
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`DuplicateSnapshot`]: EngineError::DuplicateSnapshot
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Account {0} is not active")]
    AccountNotActive(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Snapshot already exists: {0}")]
    DuplicateSnapshot(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::AccountNotActive(a), Self::AccountNotActive(b)) => a == b,
            (Self::InvalidTransaction(a), Self::InvalidTransaction(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::DuplicateSnapshot(a), Self::DuplicateSnapshot(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
