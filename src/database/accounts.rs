use sqlx::error::ErrorKind;
use sqlx::SqlitePool;

use crate::access::{AccountDeleteScope, AccountListScope, CreationGrant, Role};
use crate::auth::{hash_password, verify_password};
use crate::database::manager::StoreError;
use crate::database::models::{Account, AccountInfo};
use crate::database::now_utc_iso;

/// Account provisioning and lookup over the shared pool. Every scoped
/// operation takes the predicate produced by the access engine; nothing here
/// trusts a caller-supplied filter.
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account under the grant's parent. The parent row must
    /// exist and satisfy the hierarchy (admins hang off a master, users off
    /// the admin or master that creates them). Duplicate usernames surface
    /// as [`StoreError::Conflict`] via the UNIQUE constraint.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        grant: &CreationGrant,
    ) -> Result<AccountInfo, StoreError> {
        let parent = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(grant.parent_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                StoreError::InvalidParent(format!("account {} does not exist", grant.parent_id))
            })?;

        if !grant.role.valid_parent_role(parent.role) {
            return Err(StoreError::InvalidParent(format!(
                "a {} account cannot be parented to a {}",
                grant.role, parent.role
            )));
        }

        let password_hash = hash_password(password)?;
        let created_at = now_utc_iso();

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (username, password_hash, role, parent_admin_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(grant.role)
        .bind(grant.parent_id)
        .bind(&created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(AccountInfo {
                id: done.last_insert_rowid(),
                username: username.to_string(),
                role: grant.role,
                parent_admin_id: Some(grant.parent_id),
            }),
            Err(sqlx::Error::Database(db)) if matches!(db.kind(), ErrorKind::UniqueViolation) => {
                Err(StoreError::Conflict(format!(
                    "username '{}' already exists",
                    username
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Credential check for login. Unknown usernames and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn verify_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account.filter(|a| verify_password(password, &a.password_hash)))
    }

    pub async fn list(&self, scope: &AccountListScope) -> Result<Vec<AccountInfo>, StoreError> {
        let rows = match scope {
            AccountListScope::ByRole(role) => {
                sqlx::query_as::<_, AccountInfo>(
                    r#"
                    SELECT id, username, role, parent_admin_id FROM accounts
                    WHERE role = ?
                    ORDER BY id ASC
                    "#,
                )
                .bind(role)
                .fetch_all(&self.pool)
                .await?
            }
            AccountListScope::UsersOf(admin_id) => {
                sqlx::query_as::<_, AccountInfo>(
                    r#"
                    SELECT id, username, role, parent_admin_id FROM accounts
                    WHERE role = ? AND parent_admin_id = ?
                    ORDER BY id ASC
                    "#,
                )
                .bind(Role::User)
                .bind(admin_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    /// Delete an account, cascading to the accounts it parents and every
    /// reservation owned by a removed account. The target is inspected inside
    /// the transaction so "absent" and "outside your scope" stay distinct.
    pub async fn delete(&self, id: i64, scope: &AccountDeleteScope) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let target = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("account {} does not exist", id)))?;

        let allowed = match scope {
            AccountDeleteScope::Any => true,
            AccountDeleteScope::UsersOf(admin_id) => {
                target.role == Role::User && target.parent_admin_id == Some(*admin_id)
            }
        };
        if !allowed {
            return Err(StoreError::ScopeDenied(
                "account is outside your management scope",
            ));
        }

        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
