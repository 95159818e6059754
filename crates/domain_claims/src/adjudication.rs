//! Claim adjudication decisions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::claim::ClaimStatus;

/// Reason recorded on a partially approved claim
pub const PARTIAL_APPROVAL_REASON: &str =
    "Requested amount exceeds remaining benefit; approved up to remaining limit.";

/// Why a submission was rejected outright
///
/// These are expected adjudication outcomes, not faults. Each one is
/// persisted on a Rejected claim using its [`message`](Self::message).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// No member with the submitted identifier
    MemberNotFound,
    /// Member exists but is not active
    MemberInactive,
    /// Nothing left of the benefit limit
    BenefitExhausted,
    /// Procedure code is not in the reference data
    UnknownProcedure,
}

impl RejectionReason {
    /// Human-readable text stored on the claim
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::MemberNotFound => "Member not found",
            RejectionReason::MemberInactive => "Member is not active",
            RejectionReason::BenefitExhausted => "Benefit limit exhausted",
            RejectionReason::UnknownProcedure => "Invalid or unknown procedure code",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of adjudicating one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationDecision {
    pub status: ClaimStatus,
    pub approved_amount: Decimal,
    /// Rejection or partial-approval reason; `None` when fully approved
    pub reason: Option<String>,
}

impl AdjudicationDecision {
    /// Creates a full approval
    pub fn approve(amount: Decimal) -> Self {
        Self {
            status: ClaimStatus::Approved,
            approved_amount: amount,
            reason: None,
        }
    }

    /// Creates a partial approval capped at `amount`
    pub fn partial(amount: Decimal) -> Self {
        Self {
            status: ClaimStatus::Partial,
            approved_amount: amount,
            reason: Some(PARTIAL_APPROVAL_REASON.to_string()),
        }
    }

    /// Creates a rejection
    pub fn reject(reason: RejectionReason) -> Self {
        Self {
            status: ClaimStatus::Rejected,
            approved_amount: Decimal::ZERO,
            reason: Some(reason.message().to_string()),
        }
    }
}

/// Decides status and approved amount against the remaining benefit
///
/// Callers must have already rejected members with nothing remaining; this
/// never produces [`ClaimStatus::Rejected`]. A request equal to the remaining
/// benefit is a full approval.
pub fn decide(requested_amount: Decimal, remaining_benefit: Decimal) -> AdjudicationDecision {
    if requested_amount <= remaining_benefit {
        AdjudicationDecision::approve(requested_amount)
    } else {
        AdjudicationDecision::partial(remaining_benefit)
    }
}
