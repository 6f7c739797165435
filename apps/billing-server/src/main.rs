use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};

use billing_api::{build_router, AppState};
use billing_core::repositories::BillingRepository;
use billing_infrastructure::{create_pool, ensure_schema, MemoryBillingRepository, PgBillingRepository};
use billing_shared::config::{AppConfig, DatabaseSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    billing_shared::telemetry::init_telemetry();

    info!("Billing server starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let repo = open_repository(&config.database).await;

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));

    let state = AppState::new(repo, config);
    let app = build_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Billing server stopped");
    Ok(())
}

/// Postgres when configured and reachable, otherwise the in-memory store.
async fn open_repository(settings: &DatabaseSettings) -> Arc<dyn BillingRepository> {
    if !settings.enabled {
        info!("Database disabled, using in-memory storage");
        return Arc::new(MemoryBillingRepository::new());
    }

    info!("Connecting to database...");
    let pool = match create_pool(settings).await {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Database unavailable ({}), falling back to in-memory storage", e);
            return Arc::new(MemoryBillingRepository::new());
        }
    };

    if let Err(e) = ensure_schema(&pool).await {
        warn!("Schema setup failed ({}), falling back to in-memory storage", e);
        return Arc::new(MemoryBillingRepository::new());
    }

    info!("Database connection established.");
    Arc::new(PgBillingRepository::new(pool))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
