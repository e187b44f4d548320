use serde::Serialize;
use sqlx::FromRow;

use crate::access::Role;

/// Full account row. Carries the password hash, so it never leaves the
/// store/auth layers; API responses use [`AccountInfo`].
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub parent_admin_id: Option<i64>,
    pub created_at: String,
}

/// Client-facing view of an account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccountInfo {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub parent_admin_id: Option<i64>,
}

impl From<Account> for AccountInfo {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            role: account.role,
            parent_admin_id: account.parent_admin_id,
        }
    }
}
