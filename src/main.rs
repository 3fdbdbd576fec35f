use product_catalog::{
    api::{AppState, build_router},
    config::{self, database::create_connection, logging::init_tracing},
    errors::Result,
    repository::{DatabaseProductRepository, InMemoryProductRepository, ProductRepository},
};
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 2. Settings, then tracing as early as the settings allow
    let settings = config::load_settings()?;
    init_tracing(&settings);
    info!(
        app = %settings.app_name,
        version = %settings.app_version,
        "Starting application"
    );

    // 3. Storage
    let repository: Arc<dyn ProductRepository> = match settings.database_url.as_deref() {
        Some(url) => {
            let db = create_connection(url)
                .await
                .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
            info!("Using database product repository");
            Arc::new(DatabaseProductRepository::new(db))
        }
        None => {
            info!("Using in-memory product repository");
            Arc::new(InMemoryProductRepository::new())
        }
    };

    // 4. Router
    let state = AppState::new(repository, settings.app_version.clone());
    let router = build_router(state, &settings)?;

    // 5. Serve until Ctrl-C
    let address = settings.address();
    let listener = TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", address, e))?;
    info!(address = %address, prefix = %settings.api_prefix, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Application shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
