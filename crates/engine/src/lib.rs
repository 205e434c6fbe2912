//! Balance resolution engine for an append-only ledger.
//!
//! The engine computes point-in-time account balances through a tiered
//! read path (cache, snapshot + delta replay, full replay) and records
//! new transactions, invalidating the affected account's cache. All
//! durable state lives in the database and the cache backend; the engine
//! itself is stateless per call.

pub use accounts::{Account, AccountStatus};
pub use cache::{BalanceCache, CacheError, MemoryCache, ResultCache};
pub use cache::redis::RedisCache;
pub use config::EngineConfig;
pub use currency::Currency;
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    BalanceResolution, BalanceSource, Engine, EngineBuilder, ListTransactionsCmd,
    RecordTransactionCmd, TransactionPage,
};
pub use policy::SnapshotPolicy;
pub use snapshots::BalanceSnapshot;
pub use transactions::{Transaction, TransactionKind};

mod accounts;
pub mod cache;
mod config;
mod currency;
mod error;
mod money;
mod ops;
mod policy;
mod snapshots;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
