//! Claims Adjudication Domain
//!
//! This crate decides health claims against a member's remaining benefit and
//! records every outcome atomically.
//!
//! # Adjudication Flow
//!
//! ```text
//! Submission -> Eligibility -> Procedure lookup -> Fraud signal -> Decision
//!            -> Ledger update -> Claim persisted -> Commit
//! ```
//!
//! Outright rejections skip straight to persisting a Rejected claim. Every
//! submission ends in exactly one committed claim or in a rolled-back fault.

pub mod member;
pub mod procedure;
pub mod claim;
pub mod adjudication;
pub mod eligibility;
pub mod fraud;
pub mod ports;
pub mod engine;
pub mod error;

pub use member::Member;
pub use procedure::Procedure;
pub use claim::{
    is_whole_cents, Claim, ClaimStatus, ClaimSubmission, NewClaim, SubmissionOutcome, AMOUNT_SCALE,
};
pub use adjudication::{decide, AdjudicationDecision, RejectionReason, PARTIAL_APPROVAL_REASON};
pub use eligibility::{Eligibility, EligibilityChecker};
pub use fraud::{FraudSignalEvaluator, FRAUD_AMOUNT_MULTIPLIER};
pub use ports::{LedgerStore, LedgerTransaction};
pub use engine::{AdjudicationConfig, AdjudicationStage, ClaimAdjudicationEngine};
pub use error::ClaimError;
