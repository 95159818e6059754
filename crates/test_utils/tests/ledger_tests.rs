//! Adjudication against a real PostgreSQL ledger
//!
//! These start a container per test and need Docker:
//!
//! ```bash
//! cargo test -p test_utils --test ledger_tests -- --ignored
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::task::JoinSet;

use core_kernel::{ClaimId, HealthCheckable, MemberId};
use domain_claims::{
    AdjudicationConfig, ClaimAdjudicationEngine, ClaimError, ClaimStatus, LedgerStore,
    LedgerTransaction, RejectionReason, PARTIAL_APPROVAL_REASON,
};
use infra_db::PostgresLedger;
use test_utils::{
    assert_ok, assert_outcome, assert_rejected, create_isolated_test_database, MemberBuilder,
    SubmissionFixtures, TestDatabase,
};

async fn setup() -> (TestDatabase, Arc<ClaimAdjudicationEngine<PostgresLedger>>) {
    let db = assert_ok!(create_isolated_test_database().await, "database start");
    assert_ok!(db.seed_catalogue().await);
    let engine = Arc::new(ClaimAdjudicationEngine::new(
        Arc::new(db.ledger()),
        AdjudicationConfig::default(),
    ));
    (db, engine)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_approval_updates_ledger() {
    let (db, engine) = setup().await;
    let member = assert_ok!(db.seed_member_with(dec!(1000), dec!(0)).await);

    let outcome = assert_ok!(engine.submit(&SubmissionFixtures::consultation(member, dec!(300))).await);

    assert_outcome(&outcome, ClaimStatus::Approved, dec!(300));
    assert_eq!(assert_ok!(db.member(member).await).used_amount, dec!(300));

    let stored = assert_ok!(db.ledger().get_claim(outcome.claim_id).await);
    assert_eq!(stored.status, ClaimStatus::Approved);
    assert_eq!(stored.rejection_reason, None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_partial_approval_flags_fraud() {
    let (db, engine) = setup().await;
    let member = assert_ok!(db.seed_member_with(dec!(1000), dec!(800)).await);
    let submission = test_utils::ClaimSubmissionBuilder::new()
        .with_member_id(member)
        .with_procedure_code("LAB-014")
        .with_requested_amount(dec!(500))
        .build();

    let outcome = assert_ok!(engine.submit(&submission).await);

    assert_outcome(&outcome, ClaimStatus::Partial, dec!(200));
    assert!(outcome.fraud_flag);
    assert_eq!(outcome.rejection_reason.as_deref(), Some(PARTIAL_APPROVAL_REASON));
    assert_eq!(assert_ok!(db.member(member).await).used_amount, dec!(1000));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_rejections_are_recorded() {
    let (db, engine) = setup().await;
    let exhausted = assert_ok!(db.seed_member_with(dec!(1000), dec!(1000)).await);
    let inactive = assert_ok!(db.seed_member(MemberBuilder::new().inactive().build_row()).await);
    let active = assert_ok!(db.seed_member_with(dec!(1000), dec!(0)).await);

    let outcome = assert_ok!(engine.submit(&SubmissionFixtures::consultation(exhausted, dec!(100))).await);
    assert_rejected(&outcome, RejectionReason::BenefitExhausted);

    let outcome = assert_ok!(engine.submit(&SubmissionFixtures::consultation(inactive, dec!(100))).await);
    assert_rejected(&outcome, RejectionReason::MemberInactive);

    let outcome = assert_ok!(engine.submit(&SubmissionFixtures::consultation(MemberId::new(9999), dec!(100))).await);
    assert_rejected(&outcome, RejectionReason::MemberNotFound);

    let unknown_code = test_utils::ClaimSubmissionBuilder::new()
        .with_member_id(active)
        .with_procedure_code("NOPE-000")
        .build();
    let outcome = assert_ok!(engine.submit(&unknown_code).await);
    assert_rejected(&outcome, RejectionReason::UnknownProcedure);
    assert!(!outcome.fraud_flag);

    assert_eq!(assert_ok!(db.claim_count().await), 4);
    assert_eq!(assert_ok!(db.member(active).await).used_amount, dec!(0));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_sub_cent_amounts_never_reach_storage() {
    let (db, engine) = setup().await;
    let member = assert_ok!(db.seed_member_with(dec!(1000), dec!(0)).await);

    for amount in [dec!(0.004), dec!(100.005), dec!(1000.004)] {
        let err = engine
            .submit(&SubmissionFixtures::consultation(member, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimError::InvalidSubmission(_)), "{amount}: {err}");
    }

    assert_eq!(assert_ok!(db.claim_count().await), 0);
    assert_eq!(assert_ok!(db.member(member).await).used_amount, Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires Docker"]
async fn test_concurrent_requests_never_both_approved() {
    let (db, engine) = setup().await;
    let member = assert_ok!(db.seed_member_with(dec!(1000), dec!(0)).await);

    let mut tasks = JoinSet::new();
    for _ in 0..2 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            engine.submit(&SubmissionFixtures::consultation(member, dec!(600))).await
        });
    }

    let mut statuses = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        statuses.push(assert_ok!(assert_ok!(joined)).status);
    }
    statuses.sort_by_key(|s| s.as_str());

    assert_eq!(statuses, vec![ClaimStatus::Approved, ClaimStatus::Partial]);
    assert_eq!(assert_ok!(db.member(member).await).used_amount, dec!(1000));
    assert_eq!(assert_ok!(db.approved_total(member).await), dec!(1000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires Docker"]
async fn test_burst_keeps_ledger_consistent() {
    let (db, engine) = setup().await;
    let member = assert_ok!(db.seed_member_with(dec!(1000), dec!(0)).await);
    let bystander = assert_ok!(db.seed_member_with(dec!(1000), dec!(0)).await);

    let mut tasks = JoinSet::new();
    for i in 0..30 {
        let engine = Arc::clone(&engine);
        let target = if i % 5 == 0 { bystander } else { member };
        tasks.spawn(async move {
            engine.submit(&SubmissionFixtures::consultation(target, dec!(75))).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        assert_ok!(assert_ok!(joined));
    }

    let used = assert_ok!(db.member(member).await).used_amount;
    assert_eq!(used, dec!(1000));
    assert_eq!(assert_ok!(db.approved_total(member).await), used);
    assert_eq!(assert_ok!(db.member(bystander).await).used_amount, dec!(450));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_check_constraint_refuses_overspend() {
    let (db, _) = setup().await;
    let id = assert_ok!(db.seed_member_with(dec!(100), dec!(0)).await);
    let ledger = db.ledger();

    let mut tx = assert_ok!(ledger.begin().await);
    let mut member = assert_ok!(tx.get_member_by_id(id).await).expect("seeded member");
    member.used_amount = dec!(100.01);

    let err = tx.update_member(&member).await.unwrap_err();
    assert!(!err.is_transient());
    assert_ok!(tx.rollback().await);

    assert_eq!(assert_ok!(db.member(id).await).used_amount, Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_uncommitted_transaction_leaves_nothing() {
    let (db, _) = setup().await;
    let id = assert_ok!(db.seed_member_with(dec!(1000), dec!(0)).await);
    let ledger = db.ledger();

    {
        let mut tx = assert_ok!(ledger.begin().await);
        let mut member = assert_ok!(tx.get_member_by_id(id).await).expect("seeded member");
        assert_ok!(member.consume_benefit(dec!(250)));
        assert_ok!(tx.update_member(&member).await);
        // dropped without commit
    }

    assert_eq!(assert_ok!(db.member(id).await).used_amount, Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unknown_claim_is_not_found() {
    let (db, _) = setup().await;

    let err = db.ledger().get_claim(ClaimId::new(424242)).await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check() {
    let (db, _) = setup().await;

    let health = db.ledger().health_check().await;

    assert!(health.is_operational());
    assert_eq!(health.adapter_id, "postgres-ledger");
}
