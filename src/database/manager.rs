use once_cell::sync::OnceCell;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::access::ROOT_MASTER_ID;
use crate::config::{AppConfig, DatabaseConfig, SecurityConfig};

/// Errors surfaced by the storage layer. Scoped operations report their own
/// outcome here so handlers can answer 404 vs 403 vs 409 distinctly.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database is not initialized")]
    NotInitialized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("out of scope: {0}")]
    ScopeDenied(&'static str),

    #[error("invalid parent account: {0}")]
    InvalidParent(String),

    #[error(transparent)]
    Hash(#[from] crate::auth::HashError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Process-wide connection pool for the single SQLite database.
pub struct DatabaseManager;

static POOL: OnceCell<SqlitePool> = OnceCell::new();

impl DatabaseManager {
    /// Connect, run schema migration and seed the root master. Idempotent;
    /// the first successful call wins.
    pub async fn init(config: &AppConfig) -> Result<SqlitePool, StoreError> {
        if let Some(pool) = POOL.get() {
            return Ok(pool.clone());
        }

        let pool = connect(&config.database).await?;
        migrate(&pool).await?;
        seed_master(&pool, &config.security).await?;

        let _ = POOL.set(pool.clone());
        info!("Database ready: {}", config.database.url);
        Ok(pool)
    }

    pub fn pool() -> Result<SqlitePool, StoreError> {
        POOL.get().cloned().ok_or(StoreError::NotInitialized)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), StoreError> {
        let pool = Self::pool()?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}

pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the two tables if they are missing. Cascading foreign keys carry
/// the deletion invariant: removing an account removes the accounts it
/// parents and every reservation owned by a removed account.
pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            parent_admin_id INTEGER REFERENCES accounts(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reservations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            "from" TEXT NOT NULL,
            "to" TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            createdBy INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            createdAt TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Guarantee the root master account exists. `INSERT OR IGNORE` keyed on the
/// fixed id makes repeated seeding a no-op.
pub async fn seed_master(pool: &SqlitePool, security: &SecurityConfig) -> Result<(), StoreError> {
    let password_hash = crate::auth::hash_password(&security.master_password)?;

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO accounts (id, username, password_hash, role, parent_admin_id, created_at)
        VALUES (?, ?, ?, 'master', NULL, ?)
        "#,
    )
    .bind(ROOT_MASTER_ID)
    .bind(&security.master_username)
    .bind(&password_hash)
    .bind(super::now_utc_iso())
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!("Seeded root master account '{}'", security.master_username);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_pool, test_security};

    #[tokio::test]
    async fn migrate_and_seed_are_idempotent() {
        let pool = memory_pool().await;
        let security = test_security();

        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();
        seed_master(&pool, &security).await.unwrap();
        seed_master(&pool, &security).await.unwrap();

        let masters: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE role = 'master'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(masters, 1);

        let id: i64 = sqlx::query_scalar("SELECT id FROM accounts WHERE role = 'master'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(id, ROOT_MASTER_ID);
    }
}
