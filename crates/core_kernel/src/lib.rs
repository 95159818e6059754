//! Core Kernel - Foundational types shared by the claims workspace
//!
//! This crate provides the building blocks used across the domain and
//! infrastructure crates:
//! - Strongly-typed record identifiers
//! - Port/adapter error and health-check contracts
//! - Common error types

pub mod identifiers;
pub mod ports;
pub mod error;

pub use identifiers::{MemberId, ProviderId, ProcedureId, ClaimId, SubmissionId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
