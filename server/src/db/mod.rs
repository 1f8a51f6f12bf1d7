//! Database pool setup for the auth store.
//!
//! SYSTEM CONTEXT
//! ==============
//! The `users` and `sessions` tables are the only persistent state the
//! platform owns. Migrations are embedded and run before the listener
//! binds, so a schema mismatch fails startup instead of the first login.
//! Pool sizing comes from [`crate::state::AppConfig`]; this module reads
//! no environment variables itself.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Bound on how long a login/signup handler waits for a connection before
/// failing the request instead of queueing behind a saturated pool.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect, size the pool, and bring the schema up to date.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
