use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use ::ingest::ArchiveSource;

use super::scrape::run_ingest;
use crate::config::initialize_app_state_with_url;
use crate::router::create_router;

/// Runs the API. When `seed` is given the archive is scraped first and
/// a failed scrape aborts startup.
pub async fn serve(database_url: &str, bind_address: &str, seed: Option<&ArchiveSource>) -> Result<()> {
    trace!("Entering serve function");
    info!("Cinetrack application starting up");
    debug!("Database URL: {}", database_url);
    debug!("Bind address: {}", bind_address);

    let state = match initialize_app_state_with_url(database_url).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    if let Some(source) = seed {
        info!("Seeding events from {}", source.archive_url);
        match run_ingest(&state.db, source).await {
            Ok(count) => info!("Seeded {} events", count),
            Err(e) => {
                error!("Startup ingest failed: {:#}", e);
                return Err(e);
            }
        }
    }

    trace!("Creating application router");
    let app = create_router(state);

    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Cinetrack API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
