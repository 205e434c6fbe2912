//! Balance cache collaborators.
//!
//! The resolver talks to a [`BalanceCache`] trait object and treats every
//! failure as a miss: caching is an optimization, never a correctness
//! requirement. Failures are therefore explicit `Result`s at this
//! boundary and the caller downgrades them to "absent"/no-op.
//!
//! Two implementations ship with the engine: [`MemoryCache`] (in-process,
//! used by tests and as the default) and [`RedisCache`].
//!
//! [`RedisCache`]: redis::RedisCache

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::Money;

pub mod redis;

/// Failure of the underlying cache backend.
///
/// Never propagated past the engine: the resolver logs it and behaves as
/// if the entry were absent.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

pub type ResultCache<T> = Result<T, CacheError>;

/// Ephemeral `(account, date) -> balance` store with per-entry TTL.
///
/// Invalidation is whole-account only: a write on any date may change
/// every later-dated balance, since balances are derived by replay from
/// the nearest prior snapshot.
#[async_trait]
pub trait BalanceCache: Send + Sync {
    async fn get(&self, account_id: i32, date: NaiveDate) -> ResultCache<Option<Money>>;

    async fn set(
        &self,
        account_id: i32,
        date: NaiveDate,
        balance: &Money,
        ttl_seconds: u64,
    ) -> ResultCache<()>;

    async fn invalidate_account(&self, account_id: i32) -> ResultCache<()>;
}

struct MemoryEntry {
    balance: Money,
    expires_at: Instant,
}

/// In-process TTL map, the default cache backend.
///
/// Good enough for a single-process deployment and for tests; swap in
/// [`RedisCache`](redis::RedisCache) when cache state must survive
/// restarts or be shared.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(i32, NaiveDate), MemoryEntry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ResultCache<std::sync::MutexGuard<'_, HashMap<(i32, NaiveDate), MemoryEntry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("cache mutex poisoned".to_string()))
    }
}

#[async_trait]
impl BalanceCache for MemoryCache {
    async fn get(&self, account_id: i32, date: NaiveDate) -> ResultCache<Option<Money>> {
        let mut entries = self.lock()?;
        let key = (account_id, date);
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.balance.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        account_id: i32,
        date: NaiveDate,
        balance: &Money,
        ttl_seconds: u64,
    ) -> ResultCache<()> {
        let entry = MemoryEntry {
            balance: balance.clone(),
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
        };
        self.lock()?.insert((account_id, date), entry);
        Ok(())
    }

    async fn invalidate_account(&self, account_id: i32) -> ResultCache<()> {
        self.lock()?
            .retain(|(cached_account, _), _| *cached_account != account_id);
        Ok(())
    }
}
