//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool plus the startup configuration; handlers
//! never read environment variables directly.

use std::sync::Arc;

use sqlx::PgPool;

use crate::routes::auth::env_bool;

const DEFAULT_SESSION_TTL_DAYS: i32 = 14;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Parse a positive integer setting, falling back to the default for an
/// absent, malformed, or non-positive value.
fn positive_or<T>(raw: Option<&str>, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|n| *n > T::default())
        .unwrap_or(default)
}

/// Configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// When set, login rejects accounts whose email is unconfirmed.
    pub require_email_confirmation: bool,
    /// Server-side session lifetime; the client tracks no expiry.
    pub session_ttl_days: i32,
    /// Connection pool size for the auth store.
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load from `REQUIRE_EMAIL_CONFIRMATION`, `SESSION_TTL_DAYS`, and
    /// `DB_MAX_CONNECTIONS`.
    #[must_use]
    pub fn from_env() -> Self {
        let ttl = std::env::var("SESSION_TTL_DAYS").ok();
        let pool = std::env::var("DB_MAX_CONNECTIONS").ok();
        Self {
            require_email_confirmation: env_bool("REQUIRE_EMAIL_CONFIRMATION").unwrap_or(false),
            session_ttl_days: positive_or(ttl.as_deref(), DEFAULT_SESSION_TTL_DAYS),
            db_max_connections: positive_or(pool.as_deref(), DEFAULT_DB_MAX_CONNECTIONS),
        }
    }
}

/// Shared application state. Clone is required by Axum; inner fields are
/// Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self { pool, config: Arc::new(config) }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
