//! API configuration

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use domain_claims::{AdjudicationConfig, FRAUD_AMOUNT_MULTIPLIER};
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field has a default, so an empty environment yields a working
/// development setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// Database URL
    pub database_url: String,
    /// Maximum pooled database connections
    pub db_max_connections: u32,
    /// Connections kept open while idle
    pub db_min_connections: u32,
    /// How long a submission waits for a pooled connection, in milliseconds
    pub db_acquire_timeout_ms: u64,
    /// Idle connection lifetime in seconds; 0 keeps idle connections open
    pub db_idle_timeout_secs: u64,
    /// Connection recycle age in seconds; 0 never recycles
    pub db_max_lifetime_secs: u64,
    /// Log level
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,
    /// Requested/average-cost ratio above which claims are flagged
    pub fraud_multiplier: Decimal,
    /// Deadline for one claim submission, in milliseconds
    pub submit_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            database_url: "postgres://localhost/claims".to_string(),
            db_max_connections: 40,
            db_min_connections: 2,
            db_acquire_timeout_ms: 30_000,
            db_idle_timeout_secs: 300,
            db_max_lifetime_secs: 1_800,
            log_level: "info".to_string(),
            log_json: false,
            fraud_multiplier: FRAUD_AMOUNT_MULTIPLIER,
            submit_timeout_ms: 10_000,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine settings derived from this configuration
    pub fn adjudication(&self) -> AdjudicationConfig {
        AdjudicationConfig::default()
            .with_fraud_multiplier(self.fraud_multiplier)
            .with_submit_timeout(Duration::from_millis(self.submit_timeout_ms))
    }

    /// Pool settings derived from this configuration
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .acquire_timeout(Duration::from_millis(self.db_acquire_timeout_ms))
            .idle_timeout(non_zero_secs(self.db_idle_timeout_secs))
            .max_lifetime(non_zero_secs(self.db_max_lifetime_secs))
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
