use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::config::database::DatabaseKind;
use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::migrations::Migrator;

pub type DbConn = DatabaseConnection;

/// Create a new database connection and run migrations using config
pub async fn connect() -> Result<DbConn> {
    connect_with_url(&CONFIG.database.database_url, CONFIG.database.max_connections).await
}

/// Create a new database connection with a specific URL and run migrations
pub async fn connect_with_url(database_url: &str, max_connections: u32) -> Result<DbConn> {
    let kind = DatabaseKind::from_url(database_url);
    let pool_size = kind.pool_size(max_connections);
    tracing::info!(?kind, pool_size, "Connecting to database...");

    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(pool_size)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .sqlx_logging(false);
    // Dropping the only connection would drop an in-memory database with it
    if kind != DatabaseKind::SqliteMemory {
        opts.idle_timeout(Duration::from_secs(600));
    }

    let db = Database::connect(opts)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))?;

    if kind == DatabaseKind::SqliteFile {
        // Journal mode is stored in the file, so once is enough
        db.execute_unprepared("PRAGMA journal_mode=WAL").await?;
    }

    tracing::info!("Running database migrations...");
    Migrator::up(&db, None)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Database migrations completed");

    Ok(db)
}
