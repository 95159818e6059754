//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{MemberId, ProviderId};
use domain_claims::{
    is_whole_cents, Claim, ClaimStatus, ClaimSubmission, SubmissionOutcome, AMOUNT_SCALE,
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmitClaimRequest {
    #[validate(range(min = 1))]
    pub member_id: i64,
    #[validate(range(min = 1))]
    pub provider_id: i64,
    #[validate(length(min = 1, max = 64))]
    pub procedure_code: String,
    #[validate(length(min = 1, max = 64))]
    pub diagnosis_code: String,
    #[validate(custom(function = "validate_requested_amount"))]
    pub requested_amount: Decimal,
}

fn validate_requested_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        let mut err = ValidationError::new("positive_amount");
        err.message = Some("requested amount must be greater than zero".into());
        return Err(err);
    }
    if !is_whole_cents(*amount) {
        let mut err = ValidationError::new("amount_precision");
        err.message = Some(format!("requested amount must have at most {} decimal places", AMOUNT_SCALE).into());
        return Err(err);
    }
    Ok(())
}

impl SubmitClaimRequest {
    pub fn into_submission(self) -> ClaimSubmission {
        ClaimSubmission {
            member_id: MemberId::new(self.member_id),
            provider_id: ProviderId::new(self.provider_id),
            procedure_code: self.procedure_code.trim().to_string(),
            diagnosis_code: self.diagnosis_code.trim().to_string(),
            requested_amount: self.requested_amount,
        }
    }
}

/// Summary of a submission, as returned by `POST /claims`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimSubmissionResponse {
    pub claim_id: i64,
    pub status: ClaimStatus,
    pub approved_amount: Decimal,
    pub fraud_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl From<SubmissionOutcome> for ClaimSubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            claim_id: outcome.claim_id.value(),
            status: outcome.status,
            approved_amount: outcome.approved_amount,
            fraud_flag: outcome.fraud_flag,
            rejection_reason: outcome.rejection_reason,
        }
    }
}

/// A stored claim, as returned by `GET /claims/:id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: i64,
    pub member_id: i64,
    pub provider_id: i64,
    pub procedure_code: String,
    pub diagnosis_code: String,
    pub requested_amount: Decimal,
    pub approved_amount: Decimal,
    pub status: ClaimStatus,
    pub fraud_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id.value(),
            member_id: claim.member_id.value(),
            provider_id: claim.provider_id.value(),
            procedure_code: claim.procedure_code,
            diagnosis_code: claim.diagnosis_code,
            requested_amount: claim.requested_amount,
            approved_amount: claim.approved_amount,
            status: claim.status,
            fraud_flag: claim.fraud_flag,
            rejection_reason: claim.rejection_reason,
            created_at: claim.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal) -> SubmitClaimRequest {
        SubmitClaimRequest {
            member_id: 1,
            provider_id: 2,
            procedure_code: "CONS-001".to_string(),
            diagnosis_code: "J06.9".to_string(),
            requested_amount: amount,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request(dec!(0.01)).validate().is_ok());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(request(dec!(0)).validate().is_err());
        assert!(request(dec!(-5)).validate().is_err());
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        assert!(request(dec!(0.004)).validate().is_err());
        assert!(request(dec!(100.005)).validate().is_err());
        assert!(request(dec!(100.500)).validate().is_ok());
    }

    #[test]
    fn test_blank_codes_and_ids_rejected() {
        let mut req = request(dec!(10));
        req.procedure_code = String::new();
        assert!(req.validate().is_err());

        let mut req = request(dec!(10));
        req.member_id = 0;
        assert!(req.validate().is_err());
    }
}
