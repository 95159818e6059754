//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the claims ledger using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories own the SQL and
//! return row structs; [`adapters::PostgresLedger`] turns them into domain
//! types and implements the `LedgerStore` port the adjudication engine runs
//! against.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedger};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let ledger = PostgresLedger::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::{PostgresLedger, PostgresLedgerTx};
