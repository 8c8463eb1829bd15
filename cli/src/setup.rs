use database::PgTaskRepository;
use scheduler_core::{Context, Result, TaskError};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// Connect the task repository described by the configuration
///
/// Failures keep their `TaskError` kind so the caller can tell a bad
/// connection string from an unreachable server.
pub async fn create_repository(ctx: &Context, config: &Config) -> Result<Arc<PgTaskRepository>> {
    info!("Creating task repository");

    let database_url = config
        .database_url()
        .map_err(|e| TaskError::Configuration(e.to_string()))?;
    info!("Using database URL: {}", config.redacted_database_url());

    let repo =
        PgTaskRepository::connect_with(ctx, database_url, config.database.pool_settings()).await?;

    info!("Task repository created successfully");
    Ok(Arc::new(repo))
}
