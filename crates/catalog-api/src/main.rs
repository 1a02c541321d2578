//! Product catalog API server entry point.

use std::sync::Arc;

use catalog_api::config::AppConfig;
use catalog_api::error::AppError;
use catalog_api::state::AppState;
use catalog_core::clock::SystemClock;
use catalog_core::id::UuidV7Generator;
use catalog_core::repository::EventRepository;
use catalog_event_store::in_memory_event_repository::InMemoryEventRepository;
use catalog_event_store::pg_event_repository::PgEventRepository;
use catalog_products::application::projection::ProductProjector;
use catalog_products::application::worker::ProjectionWorker;
use catalog_products::read_model::InMemoryProductReadRepository;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env()?;
    info!(role = %config.role, "Starting product catalog API server");

    let event_repository: Arc<dyn EventRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            PgEventRepository::migrate(&pool).await?;
            Arc::new(PgEventRepository::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory event store");
            Arc::new(InMemoryEventRepository::new())
        }
    };
    let read_model = Arc::new(InMemoryProductReadRepository::new());

    let mut app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(UuidV7Generator),
        Arc::clone(&event_repository),
        read_model.clone(),
        config.role,
    );

    // The read model lives in this process, so rebuild it from the full log
    // before serving queries.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = if config.role.serves_queries() {
        let worker = Arc::new(ProjectionWorker::new(
            event_repository,
            ProductProjector::new(read_model),
            config.projection,
        ));
        match worker.catch_up().await {
            Ok(updated) => info!(updated, "read model rebuilt"),
            Err(err) => warn!(error = %err, "initial projection incomplete"),
        }
        app_state = app_state.with_projection_waker(worker.waker());
        Some(worker.spawn(shutdown_rx))
    } else {
        None
    };

    // TODO: Replace CorsLayer::permissive() with the storefront origins once they are configured.
    let app = catalog_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_address()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = worker {
        // A send error means the worker already exited.
        let _ = shutdown_tx.send(true);
        if let Err(err) = handle.await {
            warn!(error = %err, "projection worker ended abnormally");
        }
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
