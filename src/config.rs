use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{debug, info};

use crate::schemas::AppState;

/// Default database location; `mode=rwc` creates the file on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://cinetrack.db?mode=rwc";

/// Default address the API binds to.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

/// Connect to the store and make sure the schema exists.
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    debug!("Ensuring database schema is present");
    Migrator::up(&db, None).await?;

    Ok(AppState { db })
}
