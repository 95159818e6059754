//! Tests for the pure adjudication rules in domain_claims

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::MemberId;

use domain_claims::adjudication::{decide, RejectionReason, PARTIAL_APPROVAL_REASON};
use domain_claims::claim::ClaimStatus;
use domain_claims::eligibility::Eligibility;
use domain_claims::engine::AdjudicationStage;
use domain_claims::error::ClaimError;
use domain_claims::fraud::FraudSignalEvaluator;
use domain_claims::member::Member;

/// Amounts with two decimal places, from 0.01 to 100,000.00
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

// ============================================================================
// Decision Tests
// ============================================================================

mod decision_tests {
    use super::*;

    #[test]
    fn test_scenario_partial_reason() {
        let decision = decide(dec!(500), dec!(200));
        assert_eq!(decision.status, ClaimStatus::Partial);
        assert_eq!(decision.approved_amount, dec!(200));
        assert_eq!(decision.reason.as_deref(), Some(PARTIAL_APPROVAL_REASON));
    }

    proptest! {
        #[test]
        fn prop_within_remaining_is_approved(remaining in amount(), requested in amount()) {
            prop_assume!(requested <= remaining);
            let decision = decide(requested, remaining);
            prop_assert_eq!(decision.status, ClaimStatus::Approved);
            prop_assert_eq!(decision.approved_amount, requested);
        }

        #[test]
        fn prop_over_remaining_is_partial(remaining in amount(), extra in amount()) {
            let decision = decide(remaining + extra, remaining);
            prop_assert_eq!(decision.status, ClaimStatus::Partial);
            prop_assert_eq!(decision.approved_amount, remaining);
        }

        #[test]
        fn prop_approved_never_exceeds_requested_or_remaining(remaining in amount(), requested in amount()) {
            let decision = decide(requested, remaining);
            prop_assert!(decision.approved_amount <= requested);
            prop_assert!(decision.approved_amount <= remaining);
            prop_assert!(decision.approved_amount > Decimal::ZERO);
        }

        #[test]
        fn prop_decision_is_deterministic(remaining in amount(), requested in amount()) {
            prop_assert_eq!(decide(requested, remaining), decide(requested, remaining));
        }
    }
}

// ============================================================================
// Fraud Signal Tests
// ============================================================================

mod fraud_tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_flag_matches_threshold(requested in amount(), average_cost in amount()) {
            let fraud = FraudSignalEvaluator::default();
            prop_assert_eq!(
                fraud.evaluate(requested, average_cost),
                requested > average_cost * dec!(2)
            );
        }

        #[test]
        fn prop_positive_request_against_free_procedure_is_flagged(requested in amount()) {
            prop_assert!(FraudSignalEvaluator::default().evaluate(requested, Decimal::ZERO));
        }
    }
}

// ============================================================================
// Eligibility Tests
// ============================================================================

mod eligibility_tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_exhausted_member_is_never_eligible(limit in amount()) {
            let member = Member::new(MemberId::new(1), "Test", limit)
                .unwrap()
                .with_used_amount(limit)
                .unwrap();
            let eligibility = Eligibility::assess(Some(member));
            prop_assert!(!eligibility.eligible);
            prop_assert_eq!(eligibility.reason, Some(RejectionReason::BenefitExhausted));
        }

        #[test]
        fn prop_remaining_is_limit_minus_used(limit in amount(), used_cents in 0i64..10_000_000i64) {
            let used = Decimal::new(used_cents, 2);
            prop_assume!(used < limit);
            let member = Member::new(MemberId::new(1), "Test", limit)
                .unwrap()
                .with_used_amount(used)
                .unwrap();
            let eligibility = Eligibility::assess(Some(member));
            prop_assert!(eligibility.eligible);
            prop_assert_eq!(eligibility.remaining, limit - used);
        }
    }
}

// ============================================================================
// Error Tests
// ============================================================================

mod error_tests {
    use super::*;
    use core_kernel::{CoreError, PortError};

    #[test]
    fn test_storage_fault_retryability_follows_source() {
        let transient = ClaimError::storage(
            AdjudicationStage::LedgerUpdated,
            PortError::contention("deadlock detected"),
        );
        assert!(transient.is_retryable());
        assert!(transient.to_string().contains("ledger_updated"));

        let permanent = ClaimError::storage(
            AdjudicationStage::Persisted,
            PortError::conflict("check constraint violated"),
        );
        assert!(!permanent.is_retryable());
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = ClaimError::Timeout { deadline_ms: 10_000 };
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn test_invariant_from_core_error() {
        let err: ClaimError = CoreError::invariant("over limit").into();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("over limit"));
    }
}
