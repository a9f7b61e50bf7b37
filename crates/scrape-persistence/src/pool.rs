//! Connection pool setup and migration runner.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use scrape_types::{Result, ScrapeError};

const MAX_CONNECTIONS: u32 = 10;

pub async fn connect(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to connect: {e}")))
}

/// Apply the bundled schema. Idempotent: every statement is `CREATE ... IF
/// NOT EXISTS`, so this is safe to run on every process start. Uses the
/// simple query protocol via `raw_sql` since the migration file is several
/// statements in one string, which the extended protocol can't prepare.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(include_str!("migrations/0001_init.sql"))
        .execute(pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("migration failed: {e}")))?;
    Ok(())
}
