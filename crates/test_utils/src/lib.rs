//! Test Utilities Crate
//!
//! Shared test infrastructure for the claims adjudication workspace.
//!
//! # Modules
//!
//! - `fixtures`: The canonical members and procedures used across suites
//! - `builders`: Builders for members, procedures, and submissions
//! - `database`: PostgreSQL testcontainer harness and seeding helpers
//! - `assertions`: Outcome and ledger-consistency assertions
//! - `generators`: Proptest strategies for amounts, members, and submissions

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
