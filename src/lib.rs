pub mod access;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

#[cfg(test)]
pub mod testing;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// The full application router. Identity extraction is global, like the
/// original server's auth middleware; per-route authority lives in the
/// scoping engine.
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // API routes
        .merge(handlers::auth::routes())
        .merge(handlers::accounts::routes())
        .merge(handlers::reservations::routes())
        // Global middleware
        .layer(axum::middleware::from_fn(
            middleware::auth::identity_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
