//! Postgres pool and schema.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` opens the pool once and hands it to the template store. The
//! `templates` table is created by the embedded migrations, which run before
//! the listener is bound so no request ever sees an old schema.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect with at most `max_connections` and apply pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;
    info!(max_connections, "database pool ready; migrations applied");

    Ok(pool)
}
