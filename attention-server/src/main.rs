use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

use attention_core::AttentionSetEngine;
use attention_server::config::Config;
use attention_server::dashboard::{dashboard_router, AppState};
use attention_server::{AttentionStore, LoggingNotifier, SqliteRepository};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting attention set server");

    let config = Config::from_env().expect("Failed to load configuration from environment variables");

    if !config.attention_set_enabled {
        info!("Attention set engine is disabled; events will be accepted but ignored");
    }

    let db_path = config.state_dir.join("attention-state.db");
    info!("Using state database: {}", db_path.display());
    let repository =
        SqliteRepository::new(&db_path).expect("Failed to initialize SQLite database");

    let store = AttentionStore::new(
        AttentionSetEngine::new(config.attention_set_enabled),
        Arc::new(repository),
        Arc::new(LoggingNotifier),
    );

    let app_state = Arc::new(AppState {
        store,
        dashboard_auth_token: config.dashboard_auth_token,
    });

    let app = dashboard_router(app_state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
