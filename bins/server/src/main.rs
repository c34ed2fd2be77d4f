//! Postgate API Server
//!
//! Main entry point for the Postgate backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postgate_api::{AppState, create_router};
use postgate_core::post::PostService;
use postgate_core::storage::{MediaStore, StorageConfig};
use postgate_db::{PostRepository, connect, migrate};
use postgate_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Open the document store
    let db = connect(&config.database).await?;
    info!("Connected to database");

    if config.database.auto_migrate {
        migrate(&db).await?;
    }

    // Open the media area
    let media = MediaStore::from_config(StorageConfig::from_media_config(&config.media))?;
    info!(
        provider = media.provider_name(),
        max_file_size = config.media.max_file_size,
        "Media storage configured"
    );

    // Create application state
    let repo = PostRepository::new(db.clone());
    let posts = PostService::new(Arc::new(repo), Arc::new(media));
    let state = AppState::new(Arc::new(posts));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await?;
    info!("Database connection closed");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
