//! Database initialization
//!
//! Opens (creating when needed) the SQLite file that backs the prediction
//! history and applies the embedded migrations.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Open the connection pool described by `config` and bring the schema up to date
pub async fn init_database(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .foreign_keys(true);

    let db_path = database_path(&config.url);
    let newly_created = db_path.as_ref().is_some_and(|p| !p.exists());

    if let Some(parent) = db_path
        .as_ref()
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::Configuration(format!(
                "cannot create database directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    match &db_path {
        Some(path) if newly_created => {
            tracing::info!("Initialized new database: {}", path.display())
        }
        Some(path) => tracing::info!("Opened existing database: {}", path.display()),
        None => tracing::info!("Opened in-memory database"),
    }

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply the embedded migrations. Safe to call repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::debug!("Database migrations applied");
    Ok(())
}

/// File path named by a `sqlite:` URL, or None for an in-memory database
fn database_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
