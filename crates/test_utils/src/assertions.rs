//! Custom Test Assertions
//!
//! Assertion helpers for adjudication outcomes and member ledgers that
//! print the full context on failure.

use rust_decimal::Decimal;

use domain_claims::{Claim, ClaimStatus, Member, RejectionReason, SubmissionOutcome};

/// Asserts an outcome's status and approved amount
pub fn assert_outcome(outcome: &SubmissionOutcome, status: ClaimStatus, approved: Decimal) {
    assert_eq!(
        (outcome.status, outcome.approved_amount),
        (status, approved),
        "Unexpected outcome for {}: {:?}",
        outcome.claim_id,
        outcome
    );
}

/// Asserts a rejection with the given reason and nothing approved
pub fn assert_rejected(outcome: &SubmissionOutcome, reason: RejectionReason) {
    assert_outcome(outcome, ClaimStatus::Rejected, Decimal::ZERO);
    assert_eq!(
        outcome.rejection_reason.as_deref(),
        Some(reason.message()),
        "Wrong rejection reason for {}",
        outcome.claim_id
    );
}

/// Asserts that a member's used amount equals what their claims approved
///
/// Also checks the limit itself, so a lost update and an overspend fail
/// with different messages.
pub fn assert_ledger_consistent(member: &Member, claims: &[Claim]) {
    let approved: Decimal = claims
        .iter()
        .filter(|c| c.member_id == member.id)
        .map(|c| c.approved_amount)
        .sum();

    assert!(
        member.used_amount <= member.benefit_limit,
        "Member {} overspent: used {} of {}",
        member.id,
        member.used_amount,
        member.benefit_limit
    );
    assert_eq!(
        member.used_amount, approved,
        "Member {} ledger drifted: used_amount {} but claims approved {}",
        member.id, member.used_amount, approved
    );
}

/// Asserts that at most one claim in a burst was partially approved
pub fn assert_single_partial(claims: &[Claim]) {
    let partials = claims.iter().filter(|c| c.status == ClaimStatus::Partial).count();
    assert!(partials <= 1, "Expected at most one partial claim, got {}", partials);
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
}
