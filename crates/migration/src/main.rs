//! Standalone migrator for the ledgerd schema.
//!
//! `DATABASE_URL` selects the target database; without it a local
//! `ledgerd.db` is created next to the working directory.

use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DB_URL: &str = "sqlite:./ledgerd.db?mode=rwc";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let db_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match command.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, None).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => {
            migration::Migrator::status(&db).await?;
        }
        unknown => {
            eprintln!("unknown command: {unknown}");
            eprintln!("commands: up (default) | down | fresh | status");
            std::process::exit(2);
        }
    }

    Ok(())
}
