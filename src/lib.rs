pub mod api;
pub mod config;
pub mod database;
pub mod entity;
pub mod logs;
pub mod metadata;

use migration::MigratorTrait;
use sea_orm::DbErr;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use api::AppState;
use config::{Config, ConfigError};
use database::connection;
use metadata::MetadataError;

pub use api::router::build_router;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("metadata client error: {0}")]
    Metadata(#[from] MetadataError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 启动服务并阻塞，直到收到关闭信号
pub async fn run() -> Result<(), StartupError> {
    logs::init_logging();

    let config = Config::load()?;

    let conn = connection::establish_connection(&config.database).await?;
    log::info!("Database connection established");

    log::info!("Running database migrations...");
    migration::Migrator::up(&conn, None).await?;
    log::info!("Database migrations complete");

    let state = AppState::new(conn.clone(), &config)?;
    if !state.igdb.is_configured() {
        log::warn!("IGDB_CLIENT_ID / IGDB_ACCESS_TOKEN not set; IGDB endpoints disabled");
    }
    if state.moby.is_demo() {
        log::warn!("MOBY_API_KEY not set; MobyGames endpoints run in demo mode");
    }

    let app = build_router(state, &config.cors_origin);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    log::info!("Server running on http://{address}, API at http://{address}/api");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match connection::close_connection(conn).await {
        Ok(()) => log::info!("Database connection closed"),
        Err(e) => log::error!("Error while closing the database connection: {}", e),
    }

    served?;
    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
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
}
