//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for ledgerd:
//!
//! - `accounts`: financial accounts with lifecycle status
//! - `transactions`: the append-only ledger (credits and debits)
//! - `balance_snapshots`: materialized cumulative balances per date

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    AccountNumber,
    AccountName,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    AccountId,
    Amount,
    Currency,
    Kind,
    Description,
    TransactionDate,
    CreatedAt,
    ReferenceId,
}

#[derive(Iden)]
enum BalanceSnapshots {
    Table,
    Id,
    AccountId,
    SnapshotDate,
    BalanceAmount,
    TransactionCount,
    SnapshotType,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::AccountNumber).string().not_null())
                    .col(ColumnDef::new(Accounts::AccountName).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-account_number-unique")
                    .table(Accounts::Table)
                    .col(Accounts::AccountNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Transactions (append-only ledger)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::AccountId).integer().not_null())
                    // Exact decimal kept as text; never stored as a float.
                    .col(ColumnDef::new(Transactions::Amount).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Currency)
                            .string()
                            .not_null()
                            .default("BRL"),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(ColumnDef::new(Transactions::TransactionDate).date().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ReferenceId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id-transaction_date")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Balance snapshots
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BalanceSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceSnapshots::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::AccountId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::SnapshotDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::BalanceAmount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::TransactionCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::SnapshotType)
                            .string()
                            .not_null()
                            .default("daily"),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-balance_snapshots-account_id")
                            .from(BalanceSnapshots::Table, BalanceSnapshots::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Concurrent resolvers may race to create the same snapshot; this
        // unique index is the correctness backstop.
        manager
            .create_index(
                Index::create()
                    .name("idx-balance_snapshots-account_id-snapshot_date-unique")
                    .table(BalanceSnapshots::Table)
                    .col(BalanceSnapshots::AccountId)
                    .col(BalanceSnapshots::SnapshotDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BalanceSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
