//! Schema migrations, embedded at compile time.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use draftmill_core::error::{AppError, ErrorKind};
use draftmill_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Bring the schema up to date. Safe to call on every startup; already
/// applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Schema migration failed: {e}"),
            e,
        )
    })?;

    info!(
        known_migrations = MIGRATOR.migrations.len(),
        "Database schema is up to date"
    );
    Ok(())
}
