//! Claim record, submission form, and submission outcome

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClaimId, CoreError, MemberId, ProviderId};
use crate::adjudication::{AdjudicationDecision, RejectionReason};

/// Decimal places a stored amount can carry
pub const AMOUNT_SCALE: u32 = 2;

/// Returns true if `amount` fits the ledger's precision without rounding
///
/// Trailing zeros do not count, so `100.500` is a whole-cent amount.
pub fn is_whole_cents(amount: Decimal) -> bool {
    amount.normalize().scale() <= AMOUNT_SCALE
}

/// Final status of an adjudicated claim
///
/// Serialized and stored in lower case (`approved`, `partial`, `rejected`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Approved for the full requested amount
    Approved,
    /// Approved up to the member's remaining benefit
    Partial,
    /// Nothing approved
    Rejected,
}

impl ClaimStatus {
    /// Canonical wire and storage spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Approved => "approved",
            ClaimStatus::Partial => "partial",
            ClaimStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = CoreError;

    /// Parses a status, accepting the legacy upper-case spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approved" => Ok(ClaimStatus::Approved),
            "partial" => Ok(ClaimStatus::Partial),
            "rejected" => Ok(ClaimStatus::Rejected),
            other => Err(CoreError::validation(format!(
                "unknown claim status '{}'",
                other
            ))),
        }
    }
}

/// A claim as submitted by a provider, already validated by the request layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub member_id: MemberId,
    pub provider_id: ProviderId,
    pub procedure_code: String,
    pub diagnosis_code: String,
    /// Strictly positive
    pub requested_amount: Decimal,
}

/// A fully decided claim awaiting its one and only insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClaim {
    pub member_id: MemberId,
    pub provider_id: ProviderId,
    pub procedure_code: String,
    pub diagnosis_code: String,
    pub requested_amount: Decimal,
    pub approved_amount: Decimal,
    pub status: ClaimStatus,
    pub fraud_flag: bool,
    pub rejection_reason: Option<String>,
}

impl NewClaim {
    /// Builds the claim for an adjudication decision
    pub fn decided(
        submission: &ClaimSubmission,
        decision: &AdjudicationDecision,
        fraud_flag: bool,
    ) -> Self {
        Self {
            member_id: submission.member_id,
            provider_id: submission.provider_id,
            procedure_code: submission.procedure_code.clone(),
            diagnosis_code: submission.diagnosis_code.clone(),
            requested_amount: submission.requested_amount,
            approved_amount: decision.approved_amount,
            status: decision.status,
            fraud_flag,
            rejection_reason: decision.reason.clone(),
        }
    }

    /// Builds a rejected claim
    pub fn rejected(
        submission: &ClaimSubmission,
        reason: RejectionReason,
        fraud_flag: bool,
    ) -> Self {
        Self::decided(submission, &AdjudicationDecision::reject(reason), fraud_flag)
    }
}

/// A persisted claim
///
/// Immutable once committed: adjudication never updates or deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub member_id: MemberId,
    pub provider_id: ProviderId,
    pub procedure_code: String,
    pub diagnosis_code: String,
    pub requested_amount: Decimal,
    pub approved_amount: Decimal,
    pub status: ClaimStatus,
    pub fraud_flag: bool,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Materializes a new claim under its store-assigned identity
    pub fn from_new(id: ClaimId, claim: NewClaim, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            member_id: claim.member_id,
            provider_id: claim.provider_id,
            procedure_code: claim.procedure_code,
            diagnosis_code: claim.diagnosis_code,
            requested_amount: claim.requested_amount,
            approved_amount: claim.approved_amount,
            status: claim.status,
            fraud_flag: claim.fraud_flag,
            rejection_reason: claim.rejection_reason,
            created_at: recorded_at,
            updated_at: recorded_at,
        }
    }
}

/// Summary returned to the caller of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub claim_id: ClaimId,
    pub status: ClaimStatus,
    pub approved_amount: Decimal,
    pub fraud_flag: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl SubmissionOutcome {
    pub fn from_claim(claim_id: ClaimId, claim: &NewClaim) -> Self {
        Self {
            claim_id,
            status: claim.status,
            approved_amount: claim.approved_amount,
            fraud_flag: claim.fraud_flag,
            rejection_reason: claim.rejection_reason.clone(),
        }
    }
}
