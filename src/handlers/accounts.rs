// Account provisioning and management: /admins/*
// Route paths match the original mobile client's expectations.

use axum::extract::{Path, Query};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use crate::access::{scope, Role};
use crate::config;
use crate::database::accounts::AccountStore;
use crate::database::manager::DatabaseManager;
use crate::database::models::AccountInfo;
use crate::error::ApiError;
use crate::handlers::require_non_empty;
use crate::middleware::{ApiResponse, ApiResult, CurrentIdentity};

pub fn routes() -> Router {
    Router::new()
        .route("/admins/create-admin", post(create_admin))
        .route("/admins/create-user", post(create_user))
        .route("/admins", get(list_accounts))
        .route("/admins/:id", delete(delete_account))
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub role: Option<String>,
}

/// POST /admins/create-admin - master provisions a new admin. The parent
/// linkage follows the configured creation policy.
pub async fn create_admin(
    Extension(current): Extension<CurrentIdentity>,
    Json(body): Json<CreateAccountRequest>,
) -> ApiResult<AccountInfo> {
    let identity = current.identity();
    let grant = scope::admin_creation_grant(identity.as_ref(), &config::config().policy)?;

    require_non_empty(&[
        ("username", body.username.as_deref()),
        ("password", body.password.as_deref()),
    ])?;

    let store = AccountStore::new(DatabaseManager::pool()?);
    let account = store
        .create(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
            &grant,
        )
        .await?;

    tracing::info!("Created admin account '{}' (id {})", account.username, account.id);
    Ok(ApiResponse::created(account))
}

/// POST /admins/create-user - master or admin provisions a user parented to
/// themselves.
pub async fn create_user(
    Extension(current): Extension<CurrentIdentity>,
    Json(body): Json<CreateAccountRequest>,
) -> ApiResult<AccountInfo> {
    let identity = current.identity();
    let grant = scope::user_creation_grant(identity.as_ref())?;

    require_non_empty(&[
        ("username", body.username.as_deref()),
        ("password", body.password.as_deref()),
    ])?;

    let store = AccountStore::new(DatabaseManager::pool()?);
    let account = store
        .create(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
            &grant,
        )
        .await?;

    tracing::info!("Created user account '{}' (id {})", account.username, account.id);
    Ok(ApiResponse::created(account))
}

/// GET /admins?role=... - list accounts. The role filter is mandatory;
/// admins may only ask for their own users.
pub async fn list_accounts(
    Extension(current): Extension<CurrentIdentity>,
    Query(query): Query<ListAccountsQuery>,
) -> ApiResult<Vec<AccountInfo>> {
    let role_filter = match query.role.as_deref() {
        None => None,
        Some(raw) => Some(raw.parse::<Role>().map_err(|e| {
            ApiError::validation_error(e.to_string(), None)
        })?),
    };

    let identity = current.identity();
    let list_scope = scope::account_list_scope(identity.as_ref(), role_filter)?;

    let store = AccountStore::new(DatabaseManager::pool()?);
    Ok(ApiResponse::success(store.list(&list_scope).await?))
}

/// DELETE /admins/:id - remove an account; children and their reservations
/// go with it.
pub async fn delete_account(
    Extension(current): Extension<CurrentIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let identity = current.identity();
    let delete_scope = scope::account_delete_scope(identity.as_ref())?;

    let store = AccountStore::new(DatabaseManager::pool()?);
    store.delete(id, &delete_scope).await?;

    tracing::info!("Deleted account {}", id);
    Ok(ApiResponse::<()>::no_content())
}
