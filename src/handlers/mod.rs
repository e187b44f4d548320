pub mod accounts;
pub mod auth;
pub mod reservations;

use axum::response::{IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "EMS API (Rust)",
            "version": version,
            "description": "Role-scoped shuttle reservation backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "accounts": "/admins, /admins/create-admin, /admins/create-user, /admins/:id (token required)",
                "reservations": "/reservations[/:id] (token required)",
            }
        }
    }))
}

pub async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

/// Presence check for required request fields: every missing or blank field
/// is reported at once.
pub(crate) fn require_non_empty(
    fields: &[(&'static str, Option<&str>)],
) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();
    for (name, value) in fields {
        match value {
            Some(v) if !v.trim().is_empty() => {}
            _ => {
                field_errors.insert(name.to_string(), "This field is required".to_string());
            }
        }
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(
            "Missing required fields",
            Some(field_errors),
        ))
    }
}
