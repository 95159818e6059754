//! Connection pool and migrations
//!
//! Every in-flight submission holds one pooled connection from `BEGIN` to
//! `COMMIT`, so `max_connections` caps how many members can be adjudicated
//! at once. A submission that cannot get a connection within
//! `acquire_timeout` fails with a transient storage fault.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::error::DatabaseError;

pub type DatabasePool = PgPool;

/// Pool settings for the ledger database
///
/// ```rust
/// use std::time::Duration;
/// use infra_db::DatabaseConfig;
///
/// let config = DatabaseConfig::new("postgres://localhost/claims")
///     .max_connections(20)
///     .acquire_timeout(Duration::from_secs(2));
/// assert_eq!(config.min_connections, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long a submission waits for a free connection
    pub acquire_timeout: Duration,
    /// Connections older than this are recycled; `None` keeps them forever
    pub max_lifetime: Option<Duration>,
    /// Idle connections above `min_connections` close after this
    pub idle_timeout: Option<Duration>,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 40,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
            idle_timeout: Some(Duration::from_secs(5 * 60)),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Clamped to `max_connections`
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections.min(self.max_connections))
            .acquire_timeout(self.acquire_timeout)
            .max_lifetime(self.max_lifetime)
            .idle_timeout(self.idle_timeout)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("postgres://localhost/claims")
    }
}

/// Connects a pool with the given settings
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if the first connection cannot
/// be established
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        acquire_timeout_ms = u64::try_from(config.acquire_timeout.as_millis()).unwrap_or(u64::MAX),
        "Creating database pool"
    );

    let pool = config
        .pool_options()
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Database pool created");
    Ok(pool)
}

/// Applies the schema migrations under `migrations/` at the workspace root
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::default();

        assert_eq!(config.max_connections, 40);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_builder_overrides() {
        let config = DatabaseConfig::new("postgres://test")
            .max_connections(8)
            .min_connections(1)
            .acquire_timeout(Duration::from_millis(250))
            .max_lifetime(None)
            .idle_timeout(Some(Duration::from_secs(30)));

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_millis(250));
        assert_eq!(config.max_lifetime, None);
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_min_connections_never_exceeds_max() {
        let options = DatabaseConfig::default()
            .max_connections(4)
            .min_connections(10)
            .pool_options();

        assert_eq!(options.get_min_connections(), 4);
        assert_eq!(options.get_max_connections(), 4);
    }
}
