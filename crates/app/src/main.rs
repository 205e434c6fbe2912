use std::sync::Arc;

use engine::{BalanceCache, Currency, EngineConfig, MemoryCache, RedisCache};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerd={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::error!("no [server] section in settings; nothing to run");
        return Ok(());
    };

    let db = match parse_database(&server.database).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Ok(());
        }
    };

    let cache: Arc<dyn BalanceCache> = match &server.redis {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => {
                tracing::info!("using redis balance cache");
                Arc::new(cache)
            }
            Err(err) => {
                tracing::error!("failed to connect to redis: {err}");
                return Ok(());
            }
        },
        None => {
            tracing::info!("using in-process balance cache");
            Arc::new(MemoryCache::new())
        }
    };

    let engine_config = match engine_config(settings.engine.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("invalid engine settings: {err}");
            return Ok(());
        }
    };

    let engine = engine::Engine::builder()
        .database(db)
        .cache(cache)
        .config(engine_config)
        .build();

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return Ok(());
        }
    };

    if let Err(err) = server::run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn engine_config(
    section: Option<&settings::Engine>,
) -> Result<EngineConfig, engine::EngineError> {
    let mut config = EngineConfig::default();
    let Some(section) = section else {
        return Ok(config);
    };

    if let Some(currency) = &section.currency {
        config.currency = Currency::try_from(currency.as_str())?;
    }
    if let Some(threshold) = section.snapshot_threshold {
        config.snapshot_threshold = threshold;
    }
    if let Some(page_size) = section.replay_page_size {
        config.replay_page_size = page_size;
    }
    if let Some(ttl) = section.historical_ttl_secs {
        config.historical_ttl_secs = ttl;
    }
    if let Some(ttl) = section.current_ttl_secs {
        config.current_ttl_secs = ttl;
    }

    Ok(config)
}
