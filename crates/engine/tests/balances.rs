use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    BalanceCache, BalanceSource, Currency, Engine, EngineError, MemoryCache, Money,
    RecordTransactionCmd, TransactionKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, Arc<MemoryCache>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let cache = Arc::new(MemoryCache::new());
    let engine = Engine::builder()
        .database(db.clone())
        .cache(cache.clone())
        .build();
    (engine, cache, db)
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

async fn record(
    engine: &Engine,
    account_id: i32,
    kind: TransactionKind,
    amount: &str,
    on: NaiveDate,
) {
    engine
        .record_transaction(RecordTransactionCmd {
            account_id,
            amount: amount.to_string(),
            currency: None,
            kind,
            description: "test entry".to_string(),
            transaction_date: Some(on),
            reference_id: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn full_replay_then_cache_hit() {
    let (engine, _cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-001", "Checking").await.unwrap();

    record(&engine, account.id, TransactionKind::Credit, "1000.00", date("2024-01-01")).await;
    record(&engine, account.id, TransactionKind::Debit, "250.50", date("2024-01-15")).await;
    record(&engine, account.id, TransactionKind::Credit, "500.00", date("2024-01-30")).await;

    let first = engine
        .resolve_balance(account.id, Some(date("2024-01-20")))
        .await
        .unwrap();
    assert_eq!(first.balance.amount().to_string(), "749.50");
    assert_eq!(first.source, BalanceSource::Calculated);
    assert_eq!(first.account_number, "ACC-001");

    let second = engine
        .resolve_balance(account.id, Some(date("2024-01-20")))
        .await
        .unwrap();
    assert_eq!(second.balance, first.balance);
    assert_eq!(second.source, BalanceSource::Cache);
}

#[tokio::test]
async fn snapshot_plus_delta_replay() {
    let (engine, _cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-002", "Checking").await.unwrap();

    record(&engine, account.id, TransactionKind::Credit, "1000.00", date("2024-01-05")).await;
    let snapshot = engine
        .create_snapshot(account.id, date("2024-01-10"))
        .await
        .unwrap();
    assert_eq!(snapshot.balance_amount.to_string(), "1000.00");
    assert_eq!(snapshot.transaction_count, 1);

    record(&engine, account.id, TransactionKind::Credit, "200.00", date("2024-01-12")).await;

    let resolved = engine
        .resolve_balance(account.id, Some(date("2024-01-15")))
        .await
        .unwrap();
    assert_eq!(resolved.balance.amount().to_string(), "1200.00");
    assert_eq!(resolved.source, BalanceSource::Snapshot);
}

#[tokio::test]
async fn snapshot_at_target_date_needs_no_delta() {
    let (engine, _cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-003", "Checking").await.unwrap();

    record(&engine, account.id, TransactionKind::Credit, "77.25", date("2024-02-01")).await;
    engine
        .create_snapshot(account.id, date("2024-02-10"))
        .await
        .unwrap();
    // A later transaction must not leak into a lookup at the snapshot
    // date itself.
    record(&engine, account.id, TransactionKind::Credit, "10.00", date("2024-02-11")).await;

    let resolved = engine
        .resolve_balance(account.id, Some(date("2024-02-10")))
        .await
        .unwrap();
    assert_eq!(resolved.balance.amount().to_string(), "77.25");
    assert_eq!(resolved.source, BalanceSource::Snapshot);
}

#[tokio::test]
async fn snapshot_delta_equals_full_replay() {
    let (engine, cache, _db) = engine_with_db().await;
    let with_snapshot = engine.new_account("ACC-004", "Snapshotted").await.unwrap();
    let without_snapshot = engine.new_account("ACC-005", "Replayed").await.unwrap();

    let entries = [
        (TransactionKind::Credit, "1234.56", "2024-03-01"),
        (TransactionKind::Debit, "0.01", "2024-03-02"),
        (TransactionKind::Credit, "500.00", "2024-03-05"),
        (TransactionKind::Debit, "999.99", "2024-03-08"),
        (TransactionKind::Credit, "12.34", "2024-03-08"),
    ];
    for (kind, amount, day) in entries {
        record(&engine, with_snapshot.id, kind, amount, date(day)).await;
        record(&engine, without_snapshot.id, kind, amount, date(day)).await;
    }

    engine
        .create_snapshot(with_snapshot.id, date("2024-03-05"))
        .await
        .unwrap();
    // Drop write-through entries so both lookups hit the stores.
    cache.invalidate_account(with_snapshot.id).await.unwrap();
    cache.invalidate_account(without_snapshot.id).await.unwrap();

    let fast = engine
        .resolve_balance(with_snapshot.id, Some(date("2024-03-09")))
        .await
        .unwrap();
    let slow = engine
        .resolve_balance(without_snapshot.id, Some(date("2024-03-09")))
        .await
        .unwrap();

    assert_eq!(fast.source, BalanceSource::Snapshot);
    assert_eq!(slow.source, BalanceSource::Calculated);
    assert_eq!(fast.balance.amount(), slow.balance.amount());
    assert_eq!(fast.balance.amount().to_string(), "746.90");
}

#[tokio::test]
async fn write_invalidates_cached_balances() {
    let (engine, _cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-006", "Checking").await.unwrap();

    record(&engine, account.id, TransactionKind::Credit, "100.00", date("2024-04-01")).await;

    let cached = engine
        .resolve_balance(account.id, Some(date("2024-04-10")))
        .await
        .unwrap();
    assert_eq!(cached.balance.amount().to_string(), "100.00");

    // Warm the cache, then write on an earlier date.
    engine
        .resolve_balance(account.id, Some(date("2024-04-10")))
        .await
        .unwrap();
    record(&engine, account.id, TransactionKind::Credit, "50.00", date("2024-04-05")).await;

    let fresh = engine
        .resolve_balance(account.id, Some(date("2024-04-10")))
        .await
        .unwrap();
    assert_eq!(fresh.balance.amount().to_string(), "150.00");
    assert_eq!(fresh.source, BalanceSource::Calculated);
}

#[tokio::test]
async fn unknown_account_fails_before_touching_caches() {
    let (engine, cache, _db) = engine_with_db().await;

    // Plant an entry under the missing account's id; a correct resolver
    // must fail on the account check without ever reading it.
    let today = Utc::now().date_naive();
    cache
        .set(424242, today, &Money::parse("9.99", Currency::Brl).unwrap(), 3600)
        .await
        .unwrap();

    let err = engine.resolve_balance(424242, None).await.unwrap_err();
    assert!(matches!(err, EngineError::AccountNotFound(_)));
}

#[tokio::test]
async fn replay_above_threshold_materializes_a_snapshot() {
    let (engine, cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-007", "Busy").await.unwrap();

    let target = Utc::now().date_naive() - Duration::days(1);
    for _ in 0..101 {
        record(&engine, account.id, TransactionKind::Credit, "1.00", target).await;
    }

    let first = engine.resolve_balance(account.id, Some(target)).await.unwrap();
    assert_eq!(first.balance.amount().to_string(), "101.00");
    assert_eq!(first.source, BalanceSource::CalculatedSnapshotCreated);

    // Bypass the cache: the next lookup must come from the new snapshot.
    cache.invalidate_account(account.id).await.unwrap();
    let second = engine.resolve_balance(account.id, Some(target)).await.unwrap();
    assert_eq!(second.source, BalanceSource::Snapshot);
    assert_eq!(second.balance, first.balance);
}

#[tokio::test]
async fn replay_at_threshold_does_not_snapshot() {
    let (engine, _cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-008", "Quiet").await.unwrap();

    let target = Utc::now().date_naive() - Duration::days(1);
    for _ in 0..100 {
        record(&engine, account.id, TransactionKind::Credit, "1.00", target).await;
    }

    let resolved = engine.resolve_balance(account.id, Some(target)).await.unwrap();
    assert_eq!(resolved.source, BalanceSource::Calculated);
}

#[tokio::test]
async fn duplicate_snapshot_is_rejected() {
    let (engine, _cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-009", "Checking").await.unwrap();

    record(&engine, account.id, TransactionKind::Credit, "10.00", date("2024-05-01")).await;
    engine
        .create_snapshot(account.id, date("2024-05-02"))
        .await
        .unwrap();

    let err = engine
        .create_snapshot(account.id, date("2024-05-02"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateSnapshot(_)));
}

#[tokio::test]
async fn balance_lookup_is_allowed_for_blocked_accounts() {
    let (engine, _cache, _db) = engine_with_db().await;
    let account = engine.new_account("ACC-010", "Frozen").await.unwrap();

    record(&engine, account.id, TransactionKind::Credit, "42.00", date("2024-06-01")).await;
    engine.block_account(account.id).await.unwrap();

    let resolved = engine
        .resolve_balance(account.id, Some(date("2024-06-02")))
        .await
        .unwrap();
    assert_eq!(resolved.balance.amount().to_string(), "42.00");
}

#[tokio::test]
async fn mixed_currency_rows_fail_the_fold() {
    let (engine, _cache, db) = engine_with_db().await;
    let account = engine.new_account("ACC-011", "Checking").await.unwrap();

    record(&engine, account.id, TransactionKind::Credit, "10.00", date("2024-07-01")).await;

    // A single-currency ledger should never contain this row; the guard
    // still has to catch it instead of summing across currencies.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO transactions (account_id, amount, currency, kind, description, transaction_date, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        vec![
            account.id.into(),
            "5.00".into(),
            "USD".into(),
            "credit".into(),
            "rogue row".into(),
            "2024-07-02".into(),
            "2024-07-02T00:00:00+00:00".into(),
        ],
    ))
    .await
    .unwrap();

    let err = engine
        .resolve_balance(account.id, Some(date("2024-07-03")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CurrencyMismatch(_)));
}
