//! Redis-backed balance cache.
//!
//! Keys follow `balance:account:{id}:date:{iso-date}` so a whole account
//! can be invalidated with one `SCAN` pattern. Values are the JSON
//! serialization of [`Money`] (`{"amount":"...","currency":"..."}`).

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::Money;

use super::{BalanceCache, CacheError, ResultCache};

pub struct RedisCache {
    connection: MultiplexedConnection,
}

fn backend(err: impl std::fmt::Display) -> CacheError {
    CacheError::Backend(err.to_string())
}

fn cache_key(account_id: i32, date: NaiveDate) -> String {
    format!("balance:account:{account_id}:date:{date}")
}

fn invalidation_pattern(account_id: i32) -> String {
    format!("balance:account:{account_id}:date:*")
}

impl RedisCache {
    /// Connects to the Redis instance at `url` (e.g. `redis://127.0.0.1/`).
    pub async fn connect(url: &str) -> ResultCache<Self> {
        let client = redis::Client::open(url).map_err(backend)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend)?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl BalanceCache for RedisCache {
    async fn get(&self, account_id: i32, date: NaiveDate) -> ResultCache<Option<Money>> {
        let mut conn = self.connection.clone();
        let payload: Option<String> = conn
            .get(cache_key(account_id, date))
            .await
            .map_err(backend)?;
        payload
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(backend)
    }

    async fn set(
        &self,
        account_id: i32,
        date: NaiveDate,
        balance: &Money,
        ttl_seconds: u64,
    ) -> ResultCache<()> {
        let payload = serde_json::to_string(balance).map_err(backend)?;
        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(cache_key(account_id, date), payload, ttl_seconds)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn invalidate_account(&self, account_id: i32) -> ResultCache<()> {
        let pattern = invalidation_pattern(account_id);
        let mut scan_conn = self.connection.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter: redis::AsyncIter<'_, String> = scan_conn
                .scan_match(pattern)
                .await
                .map_err(backend)?;
            while let Some(item) = iter.next_item().await {
                keys.push(item.map_err(backend)?);
            }
        }

        if !keys.is_empty() {
            let mut conn = self.connection.clone();
            let _: () = conn.del(keys).await.map_err(backend)?;
        }
        Ok(())
    }
}
