//! Bandit allocation API server.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bandit_api::{AppState, build_router};
use bandit_config::AppConfig;
use bandit_storage::{create_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting bandit allocation server...");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Binding to {}", config.bind_address);

    // Create database pool
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "Database connection pool created"
    );

    // Run migrations
    run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(pool, config));
    let app = build_router(state);

    // Start server; connect info feeds the rate limiter's fallback
    // client key.
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on {}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
