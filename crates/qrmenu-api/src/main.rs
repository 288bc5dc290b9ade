//! QR menu API server entry point.

use std::sync::{Arc, Mutex};

use qrmenu_api::config::AppConfig;
use qrmenu_api::error::AppError;
use qrmenu_api::state::AppState;
use qrmenu_api::{app, telemetry};
use qrmenu_core::artifact::ArtifactStore;
use qrmenu_core::clock::{Clock, SystemClock};
use qrmenu_core::rng::{DeterministicRng, SystemRng};
use qrmenu_menu::domain::repository::MenuRepository;
use qrmenu_store::MIGRATOR;
use qrmenu_store::fs_artifact_store::FsArtifactStore;
use qrmenu_store::pg_menu_repository::PgMenuRepository;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(env!("CARGO_PKG_NAME"), config.otlp_endpoint.as_deref())?;

    info!("Starting QR menu API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&pool).await?;

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::from_os()));
    let menu_repository: Arc<dyn MenuRepository> = Arc::new(PgMenuRepository::new(pool));
    let artifact_store: Arc<dyn ArtifactStore> =
        Arc::new(FsArtifactStore::new(config.upload_dir.clone()));
    let app_state = AppState::new(
        clock,
        rng,
        menu_repository,
        artifact_store,
        &config.public_base_url,
    );

    let addr = config.bind_addr()?;
    info!(%addr, upload_dir = %config.upload_dir.display(), "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
