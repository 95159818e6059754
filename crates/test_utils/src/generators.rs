//! Property-Based Test Generators
//!
//! Proptest strategies that only produce values the domain accepts.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{MemberId, ProviderId};
use domain_claims::{ClaimSubmission, Member};

use crate::fixtures::PROCEDURE_CATALOGUE;

/// Positive amounts with two decimal places, 0.01 to 100 000.00
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Non-negative benefit limits, 0.00 to 1 000 000.00
pub fn benefit_limit_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Active members whose used amount never exceeds their limit
pub fn member_strategy() -> impl Strategy<Value = Member> {
    (1i64..10_000i64, 0i64..=100_000_000i64)
        .prop_flat_map(|(id, limit)| (Just(id), Just(limit), 0i64..=limit))
        .prop_map(|(id, limit, used)| {
            Member::new(MemberId::new(id), "Generated Member", Decimal::new(limit, 2))
                .and_then(|m| m.with_used_amount(Decimal::new(used, 2)))
                .expect("generated member is within limit")
        })
}

/// One of the catalogue's procedure codes
pub fn procedure_code_strategy() -> impl Strategy<Value = String> {
    let codes: Vec<String> = PROCEDURE_CATALOGUE.iter().map(|p| p.code.to_string()).collect();
    proptest::sample::select(codes)
}

/// Submissions for `member_id` against catalogue procedures
pub fn submission_strategy(member_id: MemberId) -> impl Strategy<Value = ClaimSubmission> {
    (1i64..1_000i64, procedure_code_strategy(), amount_strategy()).prop_map(
        move |(provider, procedure_code, requested_amount)| ClaimSubmission {
            member_id,
            provider_id: ProviderId::new(provider),
            procedure_code,
            diagnosis_code: "Z00.0".to_string(),
            requested_amount,
        },
    )
}

/// A burst of up to `max` requested amounts for one member
pub fn burst_strategy(max: usize) -> impl Strategy<Value = Vec<Decimal>> {
    proptest::collection::vec(amount_strategy(), 1..=max)
}
