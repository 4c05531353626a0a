use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use tracing::{debug, error, info};

use crate::config::initialize_app_state_with_url;

/// Creates or upgrades the schema. Returns how many migrations the
/// database has applied in total.
pub async fn init_database(database_url: &str) -> Result<usize> {
    info!("Initializing database at {}", database_url);

    let state = initialize_app_state_with_url(database_url)
        .await
        .inspect_err(|e| error!("Failed to prepare database '{}': {}", database_url, e))?;

    let applied = Migrator::get_applied_migrations(&state.db).await?;
    for migration in &applied {
        debug!("Applied migration {}", migration.name());
    }

    info!("Database ready, {} migrations applied", applied.len());
    Ok(applied.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::prelude::User;
    use sea_orm::{Database, EntityTrait};

    #[tokio::test]
    async fn test_init_database_applies_every_migration() {
        let applied = init_database("sqlite::memory:").await.unwrap();
        assert_eq!(applied, Migrator::migrations().len());
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        assert!(User::find().all(&db).await.unwrap().is_empty());
    }
}
