use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::cache::{BalanceCache, MemoryCache};
use crate::{EngineConfig, SnapshotPolicy};

mod accounts;
mod balances;
mod snapshots;
mod transactions;

pub use balances::{BalanceResolution, BalanceSource};
pub use transactions::{ListTransactionsCmd, RecordTransactionCmd, TransactionPage};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The balance engine.
///
/// Stateless per call: durable state lives in the database (ledger and
/// snapshots) and in the balance cache, both external shared resources.
/// Every operation runs inside a single DB transaction; cache traffic
/// happens outside it and is best-effort.
pub struct Engine {
    database: DatabaseConnection,
    cache: Arc<dyn BalanceCache>,
    config: EngineConfig,
    policy: SnapshotPolicy,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    pub(crate) fn cache(&self) -> &dyn BalanceCache {
        self.cache.as_ref()
    }

    pub(crate) fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    cache: Option<Arc<dyn BalanceCache>>,
    config: EngineConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            cache: None,
            config: EngineConfig::default(),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the balance cache backend; defaults to an in-process map.
    pub fn cache(mut self, cache: Arc<dyn BalanceCache>) -> EngineBuilder {
        self.cache = Some(cache);
        self
    }

    /// Override the default engine tunables.
    pub fn config(mut self, config: EngineConfig) -> EngineBuilder {
        self.config = config;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        let policy = SnapshotPolicy::new(self.config.snapshot_threshold);
        Engine {
            database: self.database,
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(MemoryCache::new())),
            config: self.config,
            policy,
        }
    }
}
