//! Repository implementations for the claims ledger
//!
//! Repositories encapsulate SQL and map rows to plain structs; conversion
//! to domain types happens in the adapters.
//!
//! Operations that must run inside the adjudication transaction take a
//! `&mut PgConnection` (a `sqlx::Transaction` derefs to one). Everything else
//! runs against the pool.

pub mod members;
pub mod procedures;
pub mod claims;

pub use members::{MemberRepository, MemberRow, NewMember};
pub use procedures::{ProcedureRepository, ProcedureRow, NewProcedure};
pub use claims::{ClaimsRepository, ClaimRow, NewClaimRow};
