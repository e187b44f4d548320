//! Shared fixtures for store-level tests: an in-memory SQLite pool with the
//! schema applied and the root master seeded.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::access::{CreationGrant, Role, ROOT_MASTER_ID};
use crate::config::SecurityConfig;
use crate::database::accounts::AccountStore;
use crate::database::manager::{migrate, seed_master};
use crate::database::models::AccountInfo;

pub fn test_security() -> SecurityConfig {
    SecurityConfig {
        jwt_secret: "unit-test-secret".to_string(),
        jwt_expiry_hours: 1,
        master_username: "master".to_string(),
        master_password: "master1234".to_string(),
    }
}

/// In-memory database limited to one connection so every query sees the same
/// memory file.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory connect options")
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("failed to open in-memory database")
}

pub async fn seeded_memory_pool() -> SqlitePool {
    let pool = memory_pool().await;
    migrate(&pool).await.expect("migrate");
    seed_master(&pool, &test_security()).await.expect("seed");
    pool
}

pub fn admin_grant() -> CreationGrant {
    CreationGrant {
        role: Role::Admin,
        parent_id: ROOT_MASTER_ID,
    }
}

pub fn user_grant(admin_id: i64) -> CreationGrant {
    CreationGrant {
        role: Role::User,
        parent_id: admin_id,
    }
}

/// One admin under the root master, one user under that admin.
pub async fn create_test_accounts(pool: &SqlitePool) -> (AccountInfo, AccountInfo) {
    let store = AccountStore::new(pool.clone());
    let admin = store
        .create("fixture-admin", "fixture-pass", &admin_grant())
        .await
        .expect("create fixture admin");
    let user = store
        .create("fixture-user", "fixture-pass", &user_grant(admin.id))
        .await
        .expect("create fixture user");
    (admin, user)
}
