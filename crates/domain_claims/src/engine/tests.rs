use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, MemberId, ProcedureId, ProviderId};

use super::*;
use crate::adjudication::PARTIAL_APPROVAL_REASON;
use crate::claim::ClaimStatus;
use crate::member::Member;
use crate::ports::mock::MockLedgerStore;
use crate::procedure::Procedure;

const MEMBER: MemberId = MemberId::new(1);

async fn seeded_store(limit: Decimal, used: Decimal) -> MockLedgerStore {
    let store = MockLedgerStore::new();
    seed(&store, Member::new(MEMBER, "Grace Wanjiru", limit).unwrap().with_used_amount(used).unwrap()).await;
    store
}

async fn seed(store: &MockLedgerStore, member: Member) {
    store.insert_member(member).await;
    store
        .insert_procedure(Procedure::new(ProcedureId::new(1), "CONS-001", "Consultation", dec!(100)).unwrap())
        .await;
    store
        .insert_procedure(Procedure::new(ProcedureId::new(2), "LAB-014", "Lipid panel", dec!(50)).unwrap())
        .await;
}

fn engine(store: &MockLedgerStore) -> ClaimAdjudicationEngine<MockLedgerStore> {
    ClaimAdjudicationEngine::new(Arc::new(store.clone()), AdjudicationConfig::default())
}

fn submission(code: &str, amount: Decimal) -> ClaimSubmission {
    ClaimSubmission {
        member_id: MEMBER,
        provider_id: ProviderId::new(10),
        procedure_code: code.to_string(),
        diagnosis_code: "J06.9".to_string(),
        requested_amount: amount,
    }
}

#[tokio::test]
async fn test_full_approval() {
    let store = seeded_store(dec!(1000), dec!(0)).await;

    let outcome = engine(&store).submit(&submission("CONS-001", dec!(300))).await.unwrap();

    assert_eq!(outcome.status, ClaimStatus::Approved);
    assert_eq!(outcome.approved_amount, dec!(300));
    // 300 > 2 x 100; the flag never blocks approval
    assert!(outcome.fraud_flag);
    assert_eq!(outcome.rejection_reason, None);
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(300));
}

#[tokio::test]
async fn test_partial_approval_carries_fraud_flag() {
    let store = seeded_store(dec!(1000), dec!(800)).await;

    let outcome = engine(&store).submit(&submission("LAB-014", dec!(500))).await.unwrap();

    assert_eq!(outcome.status, ClaimStatus::Partial);
    assert_eq!(outcome.approved_amount, dec!(200));
    assert!(outcome.fraud_flag);
    assert_eq!(outcome.rejection_reason.as_deref(), Some(PARTIAL_APPROVAL_REASON));
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(1000));
}

#[tokio::test]
async fn test_exhausted_benefit_is_rejected_and_recorded() {
    let store = seeded_store(dec!(1000), dec!(1000)).await;

    let outcome = engine(&store).submit(&submission("CONS-001", dec!(50))).await.unwrap();

    assert_eq!(outcome.status, ClaimStatus::Rejected);
    assert_eq!(outcome.approved_amount, dec!(0));
    assert!(!outcome.fraud_flag);
    assert_eq!(outcome.rejection_reason.as_deref(), Some("Benefit limit exhausted"));

    let claims = store.claims().await;
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].id, outcome.claim_id);
    assert_eq!(claims[0].requested_amount, dec!(50));
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(1000));
}

#[tokio::test]
async fn test_inactive_member_is_rejected() {
    let store = MockLedgerStore::new();
    seed(&store, Member::new(MEMBER, "Inactive", dec!(1000)).unwrap().deactivated()).await;

    let outcome = engine(&store).submit(&submission("CONS-001", dec!(100))).await.unwrap();

    assert_eq!(outcome.status, ClaimStatus::Rejected);
    assert_eq!(outcome.approved_amount, dec!(0));
    assert_eq!(outcome.rejection_reason.as_deref(), Some("Member is not active"));
    assert_eq!(store.claims().await.len(), 1);
}

#[tokio::test]
async fn test_unknown_member_is_rejected() {
    let store = MockLedgerStore::new();

    let outcome = engine(&store).submit(&submission("CONS-001", dec!(100))).await.unwrap();

    assert_eq!(outcome.status, ClaimStatus::Rejected);
    assert_eq!(outcome.rejection_reason.as_deref(), Some("Member not found"));
    assert_eq!(store.claims_for_member(MEMBER).await.len(), 1);
}

#[tokio::test]
async fn test_unknown_procedure_skips_fraud_check() {
    let store = seeded_store(dec!(1000), dec!(0)).await;

    let outcome = engine(&store).submit(&submission("NOPE-999", dec!(900))).await.unwrap();

    assert_eq!(outcome.status, ClaimStatus::Rejected);
    assert_eq!(outcome.rejection_reason.as_deref(), Some("Invalid or unknown procedure code"));
    assert!(!outcome.fraud_flag);
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(0));
}

#[tokio::test]
async fn test_committed_claim_matches_outcome() {
    let store = seeded_store(dec!(1000), dec!(0)).await;
    let engine = engine(&store);

    let outcome = engine.submit(&submission("LAB-014", dec!(120))).await.unwrap();
    let claim = engine.store().get_claim(outcome.claim_id).await.unwrap();

    assert_eq!(claim.status, outcome.status);
    assert_eq!(claim.approved_amount, dec!(120));
    assert!(claim.fraud_flag);
    assert_eq!(claim.procedure_code, "LAB-014");
    assert_eq!(claim.provider_id, ProviderId::new(10));
}

#[tokio::test]
async fn test_non_positive_amount_is_refused_without_record() {
    let store = seeded_store(dec!(1000), dec!(0)).await;

    let err = engine(&store).submit(&submission("CONS-001", dec!(0))).await.unwrap_err();

    assert!(matches!(err, ClaimError::InvalidSubmission(_)));
    assert!(!err.is_retryable());
    assert!(store.claims().await.is_empty());
}

#[tokio::test]
async fn test_sub_cent_amount_is_refused_without_record() {
    let store = seeded_store(dec!(1000), dec!(0)).await;
    let engine = engine(&store);

    for amount in [dec!(0.004), dec!(100.005), dec!(1000.004)] {
        let err = engine.submit(&submission("CONS-001", amount)).await.unwrap_err();
        assert!(matches!(err, ClaimError::InvalidSubmission(_)), "{amount}: {err}");
        assert_eq!(err.stage(), None);
    }

    assert!(store.claims().await.is_empty());
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(0));
}

#[tokio::test]
async fn test_trailing_zeros_are_whole_cents() {
    let store = seeded_store(dec!(1000), dec!(0)).await;

    let outcome = engine(&store).submit(&submission("CONS-001", dec!(100.500))).await.unwrap();

    assert_eq!(outcome.status, ClaimStatus::Approved);
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(100.5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_never_both_approved() {
    let store = seeded_store(dec!(1000), dec!(0)).await;
    let engine = Arc::new(engine(&store));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.submit(&submission("CONS-001", dec!(600))).await })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().unwrap());
    }
    outcomes.sort_by_key(|o| o.approved_amount);

    assert_eq!(outcomes[0].status, ClaimStatus::Partial);
    assert_eq!(outcomes[0].approved_amount, dec!(400));
    assert_eq!(outcomes[1].status, ClaimStatus::Approved);
    assert_eq!(outcomes[1].approved_amount, dec!(600));
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(1000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_burst_respects_limit() {
    let store = seeded_store(dec!(1000), dec!(0)).await;
    let engine = Arc::new(engine(&store));

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.submit(&submission("CONS-001", dec!(75))).await })
        })
        .collect();

    let mut approved_total = Decimal::ZERO;
    for handle in handles {
        approved_total += handle.await.unwrap().unwrap().approved_amount;
    }

    let claims = store.claims().await;
    assert_eq!(claims.len(), 25);
    assert_eq!(approved_total, dec!(1000));
    assert_eq!(claims.iter().map(|c| c.approved_amount).sum::<Decimal>(), dec!(1000));
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(1000));
    assert_eq!(
        claims.iter().filter(|c| c.status == ClaimStatus::Partial).count(),
        1
    );
}

#[tokio::test]
async fn test_deadline_rolls_back_and_releases_lock() {
    let store = seeded_store(dec!(1000), dec!(0)).await.with_latency(Duration::from_millis(100));
    let engine = engine(&store);

    let err = engine
        .submit_with_deadline(&submission("CONS-001", dec!(300)), Duration::from_millis(150))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(err.is_retryable());
    assert!(store.claims().await.is_empty());
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(0));

    let outcome = engine
        .submit_with_deadline(&submission("CONS-001", dec!(300)), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(outcome.status, ClaimStatus::Approved);
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(300));
}

#[tokio::test]
async fn test_claim_write_fault_rolls_back_ledger() {
    let store = seeded_store(dec!(1000), dec!(0)).await;
    store.fail_claim_writes(true);

    let err = engine(&store).submit(&submission("CONS-001", dec!(300))).await.unwrap_err();

    assert_eq!(err.stage(), Some(AdjudicationStage::Persisted));
    assert!(err.is_retryable());
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(0));
    assert!(store.claims().await.is_empty());
}

#[tokio::test]
async fn test_rejection_write_fault_is_a_storage_error() {
    let store = MockLedgerStore::new();
    store.fail_claim_writes(true);

    let err = engine(&store).submit(&submission("CONS-001", dec!(300))).await.unwrap_err();

    assert_eq!(err.stage(), Some(AdjudicationStage::RejectedPersisted));
    assert!(store.claims().await.is_empty());
}

#[tokio::test]
async fn test_commit_fault_leaves_no_trace() {
    let store = seeded_store(dec!(1000), dec!(0)).await;
    store.fail_commits(true);
    let engine = engine(&store);

    let err = engine.submit(&submission("CONS-001", dec!(300))).await.unwrap_err();
    assert_eq!(err.stage(), Some(AdjudicationStage::Committed));
    assert_eq!(store.member(MEMBER).await.unwrap().used_amount, dec!(0));
    assert!(store.claims().await.is_empty());

    store.fail_commits(false);
    let outcome = engine.submit(&submission("CONS-001", dec!(300))).await.unwrap();
    assert_eq!(outcome.approved_amount, dec!(300));
    assert!(engine.store().get_claim(outcome.claim_id).await.is_ok());
    assert!(engine.store().get_claim(ClaimId::new(999)).await.unwrap_err().is_not_found());
}
