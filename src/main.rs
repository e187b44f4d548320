use tracing_subscriber::EnvFilter;

use ems_api_rust::{app, config, database::manager::DatabaseManager};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting EMS API in {:?} mode", config.environment);

    DatabaseManager::init(config)
        .await
        .unwrap_or_else(|e| panic!("failed to initialize database: {}", e));

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("EMS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(4000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("EMS API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
