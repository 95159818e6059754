//! Domain Adapters
//!
//! Adapter implementations connecting domain ports to PostgreSQL.
//!
//! Each adapter:
//! - Implements a domain port trait
//! - Translates between domain models and row types
//! - Uses the repository layer for SQL

pub mod ledger;

pub use ledger::{PostgresLedger, PostgresLedgerTx};
