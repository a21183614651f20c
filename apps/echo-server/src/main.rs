use std::net::SocketAddr;

use anyhow::Context;
use echo_api::{build_router, AppState};
use echo_core::repositories::Repositories;
use echo_infrastructure::{create_pool, memory_repositories, postgres_repositories, run_migrations};
use echo_shared::config::{AppConfig, DatabaseDriver};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Keep the guard alive until shutdown so file logs are flushed
    let _log_guard = echo_shared::telemetry::init_telemetry(&config.log);

    info!(
        name = %config.app.name,
        env = %config.app.env,
        version = env!("CARGO_PKG_VERSION"),
        "Echo server starting"
    );

    let repos = repositories(&config).await?;
    let state = AppState::new(config.clone(), repos);
    let app = build_router(state);

    let host: std::net::IpAddr = config.app.host.parse().context("Invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Echo server stopped");
    Ok(())
}

async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.database.driver {
        DatabaseDriver::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Ok(memory_repositories())
        }
        DatabaseDriver::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&config.database)
                .await
                .context("Failed to connect to database")?;
            info!("Database connection established.");

            if config.database.run_migrations {
                run_migrations(&pool).await.context("Failed to run migrations")?;
            }
            Ok(postgres_repositories(pool))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
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
