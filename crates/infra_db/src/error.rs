//! Database error types
//!
//! SQLx errors are classified by PostgreSQL error code so callers can tell a
//! lost race (worth retrying) from a constraint violation (not worth it).

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish or keep a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Serializable transaction could not be committed (40001)
    #[error("Serialization failure: {0}")]
    SerializationFailure(String),

    /// Transaction was chosen as a deadlock victim (40P01)
    #[error("Deadlock detected: {0}")]
    Deadlock(String),

    /// Begin, commit, or rollback failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row does not form a valid domain value
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Claim", "CLM-123");
    /// assert!(error.to_string().contains("Claim"));
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Checks if this transaction lost a race with another one
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            DatabaseError::SerializationFailure(_) | DatabaseError::Deadlock(_)
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => DatabaseError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Migrate(e) => DatabaseError::MigrationFailed(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::InvalidRow(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry(message),
                    Some("23503") => DatabaseError::ForeignKeyViolation(message),
                    Some("23514") => DatabaseError::ConstraintViolation(message),
                    Some("40001") => DatabaseError::SerializationFailure(message),
                    Some("40P01") => DatabaseError::Deadlock(message),
                    Some(code) if code.starts_with("08") => DatabaseError::ConnectionFailed(message),
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::NotFound {
                entity_type: entity,
                id,
            },
            DatabaseError::DuplicateEntry(_)
            | DatabaseError::ForeignKeyViolation(_)
            | DatabaseError::ConstraintViolation(_) => PortError::conflict(error.to_string()),
            DatabaseError::SerializationFailure(_) | DatabaseError::Deadlock(_) => {
                PortError::contention(error.to_string())
            }
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => {
                PortError::Connection {
                    message: error.to_string(),
                    source: Some(Box::new(error)),
                }
            }
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
