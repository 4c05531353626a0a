use anyhow::{Context, Result};
use ::ingest::{ArchiveSource, HttpFetcher};
use sea_orm::DatabaseConnection;
use tracing::{debug, error, info, trace};

use crate::config::initialize_app_state_with_url;

/// Scrapes the archive into `db`. Returns the number of stored events.
pub async fn run_ingest(db: &DatabaseConnection, source: &ArchiveSource) -> Result<usize> {
    trace!("Entering run_ingest function");
    debug!("Archive URL: {}", source.archive_url);
    debug!("Event location: {}", source.location);
    debug!("Offset for naive start times: {}", source.utc_offset);

    let fetcher = HttpFetcher::new().context("Failed to build HTTP client")?;
    let events = ::ingest::ingest(db, &fetcher, source)
        .await
        .with_context(|| format!("Failed to ingest events from {}", source.archive_url))?;

    Ok(events.len())
}

pub async fn ingest_events(database_url: &str, source: &ArchiveSource) -> Result<()> {
    info!("Ingesting events into {}", database_url);

    let state = initialize_app_state_with_url(database_url).await?;
    match run_ingest(&state.db, source).await {
        Ok(count) => {
            info!("Ingest finished, {} events stored", count);
            Ok(())
        }
        Err(e) => {
            error!("Ingest failed: {:#}", e);
            Err(e)
        }
    }
}
