//! Claim Adjudication Engine
//!
//! Turns a [`ClaimSubmission`] into exactly one committed claim inside one
//! ledger transaction.
//!
//! # Pipeline
//!
//! ```text
//! Started -> EligibilityChecked -> ProcedureValidated -> Decided
//!         -> LedgerUpdated -> Persisted -> Committed
//!
//! EligibilityChecked | ProcedureValidated -> RejectedPersisted -> Committed
//! ```
//!
//! Rejections are committed like any other outcome. A storage fault or an
//! elapsed deadline at any stage rolls the whole transaction back, so neither
//! a claim nor a ledger update survives.
//!
//! # Concurrency
//!
//! The member row is locked when eligibility is checked and stays locked
//! until commit. Concurrent submissions for one member are serialized; the
//! benefit limit holds no matter how they interleave.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use core_kernel::SubmissionId;
use crate::adjudication::{decide, RejectionReason};
use crate::claim::{is_whole_cents, ClaimSubmission, NewClaim, SubmissionOutcome, AMOUNT_SCALE};
use crate::eligibility::EligibilityChecker;
use crate::error::ClaimError;
use crate::fraud::{FraudSignalEvaluator, FRAUD_AMOUNT_MULTIPLIER};
use crate::ports::{LedgerStore, LedgerTransaction};

#[cfg(test)]
mod tests;

/// Default deadline for one submission
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stage a submission was advancing to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjudicationStage {
    Started,
    EligibilityChecked,
    ProcedureValidated,
    Decided,
    LedgerUpdated,
    Persisted,
    RejectedPersisted,
    Committed,
}

impl AdjudicationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjudicationStage::Started => "started",
            AdjudicationStage::EligibilityChecked => "eligibility_checked",
            AdjudicationStage::ProcedureValidated => "procedure_validated",
            AdjudicationStage::Decided => "decided",
            AdjudicationStage::LedgerUpdated => "ledger_updated",
            AdjudicationStage::Persisted => "persisted",
            AdjudicationStage::RejectedPersisted => "rejected_persisted",
            AdjudicationStage::Committed => "committed",
        }
    }
}

impl fmt::Display for AdjudicationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjudicationConfig {
    /// Requested/average-cost ratio above which claims are flagged
    pub fraud_multiplier: Decimal,
    /// Deadline applied by [`ClaimAdjudicationEngine::submit`]
    pub submit_timeout: Duration,
}

impl AdjudicationConfig {
    pub fn with_fraud_multiplier(mut self, multiplier: Decimal) -> Self {
        self.fraud_multiplier = multiplier;
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }
}

impl Default for AdjudicationConfig {
    fn default() -> Self {
        Self {
            fraud_multiplier: FRAUD_AMOUNT_MULTIPLIER,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }
}

/// Adjudicates claim submissions against a ledger store
pub struct ClaimAdjudicationEngine<S: LedgerStore> {
    store: Arc<S>,
    eligibility: EligibilityChecker,
    fraud: FraudSignalEvaluator,
    submit_timeout: Duration,
}

impl<S: LedgerStore> ClaimAdjudicationEngine<S> {
    pub fn new(store: Arc<S>, config: AdjudicationConfig) -> Self {
        Self {
            store,
            eligibility: EligibilityChecker::new(),
            fraud: FraudSignalEvaluator::new(config.fraud_multiplier),
            submit_timeout: config.submit_timeout,
        }
    }

    /// The backing ledger store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Adjudicates a submission under the configured deadline
    pub async fn submit(
        &self,
        submission: &ClaimSubmission,
    ) -> Result<SubmissionOutcome, ClaimError> {
        self.submit_with_deadline(submission, self.submit_timeout).await
    }

    /// Adjudicates a submission, rolling back if `deadline` elapses first
    ///
    /// Returns exactly one outcome per call. Every `Ok` outcome, rejections
    /// included, has exactly one committed claim behind it. Every `Err` left
    /// the ledger untouched, except that a deadline hit while the commit was
    /// already in flight cannot tell whether the commit landed.
    #[instrument(
        skip(self, submission),
        fields(
            submission_id = %SubmissionId::new_v7(),
            member_id = %submission.member_id,
            procedure_code = %submission.procedure_code,
        )
    )]
    pub async fn submit_with_deadline(
        &self,
        submission: &ClaimSubmission,
        deadline: Duration,
    ) -> Result<SubmissionOutcome, ClaimError> {
        if submission.requested_amount <= Decimal::ZERO {
            return Err(ClaimError::InvalidSubmission(format!(
                "requested amount must be positive, got {}",
                submission.requested_amount
            )));
        }
        if !is_whole_cents(submission.requested_amount) {
            return Err(ClaimError::InvalidSubmission(format!(
                "requested amount must have at most {} decimal places, got {}",
                AMOUNT_SCALE, submission.requested_amount
            )));
        }

        match tokio::time::timeout(deadline, self.adjudicate_atomically(submission)).await {
            Ok(Ok(outcome)) => {
                info!(
                    claim_id = %outcome.claim_id,
                    status = %outcome.status,
                    approved_amount = %outcome.approved_amount,
                    fraud_flag = outcome.fraud_flag,
                    "Claim adjudicated"
                );
                if outcome.fraud_flag {
                    warn!(
                        claim_id = %outcome.claim_id,
                        requested_amount = %submission.requested_amount,
                        "Claim flagged for possible fraud"
                    );
                }
                Ok(outcome)
            }
            Ok(Err(err)) => {
                error!(
                    error = %err,
                    stage = ?err.stage(),
                    retryable = err.is_retryable(),
                    provider_id = %submission.provider_id,
                    diagnosis_code = %submission.diagnosis_code,
                    requested_amount = %submission.requested_amount,
                    "Claim submission failed, transaction rolled back"
                );
                Err(err)
            }
            Err(_) => {
                let deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                warn!(
                    deadline_ms,
                    provider_id = %submission.provider_id,
                    diagnosis_code = %submission.diagnosis_code,
                    requested_amount = %submission.requested_amount,
                    "Claim submission timed out, transaction rolled back"
                );
                Err(ClaimError::Timeout { deadline_ms })
            }
        }
    }

    async fn adjudicate_atomically(
        &self,
        submission: &ClaimSubmission,
    ) -> Result<SubmissionOutcome, ClaimError> {
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| ClaimError::storage(AdjudicationStage::Started, e))?;

        match self.adjudicate(&mut tx, submission).await {
            Ok(outcome) => {
                tx.commit()
                    .await
                    .map_err(|e| ClaimError::storage(AdjudicationStage::Committed, e))?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn adjudicate(
        &self,
        tx: &mut S::Transaction,
        submission: &ClaimSubmission,
    ) -> Result<SubmissionOutcome, ClaimError> {
        let eligibility = self
            .eligibility
            .check(tx, submission.member_id)
            .await
            .map_err(|e| ClaimError::storage(AdjudicationStage::EligibilityChecked, e))?;
        let mut member = match eligibility.into_member() {
            Ok(member) => member,
            Err(reason) => return self.reject(tx, submission, reason, false).await,
        };

        let procedure = tx
            .get_procedure_by_code(&submission.procedure_code)
            .await
            .map_err(|e| ClaimError::storage(AdjudicationStage::ProcedureValidated, e))?;
        let Some(procedure) = procedure else {
            return self
                .reject(tx, submission, RejectionReason::UnknownProcedure, false)
                .await;
        };

        let fraud_flag = self
            .fraud
            .evaluate(submission.requested_amount, procedure.average_cost);

        let remaining = member.remaining_benefit();
        if remaining <= Decimal::ZERO {
            return self
                .reject(tx, submission, RejectionReason::BenefitExhausted, fraud_flag)
                .await;
        }

        let decision = decide(submission.requested_amount, remaining);
        debug!(
            status = %decision.status,
            approved_amount = %decision.approved_amount,
            remaining = %remaining,
            "Decided claim"
        );

        member.consume_benefit(decision.approved_amount)?;
        tx.update_member(&member)
            .await
            .map_err(|e| ClaimError::storage(AdjudicationStage::LedgerUpdated, e))?;

        let claim = NewClaim::decided(submission, &decision, fraud_flag);
        let claim_id = tx
            .create_claim(&claim)
            .await
            .map_err(|e| ClaimError::storage(AdjudicationStage::Persisted, e))?;

        Ok(SubmissionOutcome::from_claim(claim_id, &claim))
    }

    async fn reject(
        &self,
        tx: &mut S::Transaction,
        submission: &ClaimSubmission,
        reason: RejectionReason,
        fraud_flag: bool,
    ) -> Result<SubmissionOutcome, ClaimError> {
        let claim = NewClaim::rejected(submission, reason, fraud_flag);
        let claim_id = tx
            .create_claim(&claim)
            .await
            .map_err(|e| ClaimError::storage(AdjudicationStage::RejectedPersisted, e))?;
        debug!(claim_id = %claim_id, reason = %reason, "Recorded rejected claim");
        Ok(SubmissionOutcome::from_claim(claim_id, &claim))
    }
}
