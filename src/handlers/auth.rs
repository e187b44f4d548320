// POST /auth/login - credential check and token issuance

use axum::{routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::accounts::AccountStore;
use crate::database::manager::DatabaseManager;
use crate::database::models::AccountInfo;
use crate::error::ApiError;
use crate::handlers::require_non_empty;
use crate::middleware::{ApiResponse, ApiResult, CurrentIdentity};

pub fn routes() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/whoami", axum::routing::get(whoami))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub account: AccountInfo,
}

/// Validate credentials and hand back a signed token carrying the account's
/// (id, role) descriptor. Bad username and bad password answer identically.
pub async fn login(Json(body): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    require_non_empty(&[
        ("username", body.username.as_deref()),
        ("password", body.password.as_deref()),
    ])?;
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let store = AccountStore::new(DatabaseManager::pool()?);
    let account = store
        .verify_login(&username, &password)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid username or password"))?;

    let claims = Claims::new(account.id, account.username.clone(), account.role);
    let token = generate_jwt(&claims)?;

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: config::config().security.jwt_expiry_hours * 3600,
        account: account.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    pub id: i64,
    pub username: String,
    pub role: crate::access::Role,
}

/// Echo the verified identity behind the presented token.
pub async fn whoami(Extension(current): Extension<CurrentIdentity>) -> ApiResult<WhoamiResponse> {
    let user = current
        .0
        .ok_or_else(|| ApiError::unauthorized("authentication required"))?;

    Ok(ApiResponse::success(WhoamiResponse {
        id: user.id,
        username: user.username,
        role: user.role,
    }))
}
