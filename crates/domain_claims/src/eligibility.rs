//! Member eligibility

use rust_decimal::Decimal;
use tracing::debug;

use core_kernel::{MemberId, PortError};
use crate::adjudication::RejectionReason;
use crate::member::Member;
use crate::ports::LedgerTransaction;

/// Result of checking whether a member may claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub member: Option<Member>,
    /// `limit - used`, zero when the member was not found
    pub remaining: Decimal,
    pub eligible: bool,
    pub reason: Option<RejectionReason>,
}

impl Eligibility {
    /// Classifies a looked-up member
    ///
    /// Checks run in order: existence, then activity, then remaining benefit.
    pub fn assess(member: Option<Member>) -> Self {
        let Some(member) = member else {
            return Self {
                member: None,
                remaining: Decimal::ZERO,
                eligible: false,
                reason: Some(RejectionReason::MemberNotFound),
            };
        };

        let remaining = member.remaining_benefit();
        let reason = if !member.is_active {
            Some(RejectionReason::MemberInactive)
        } else if remaining <= Decimal::ZERO {
            Some(RejectionReason::BenefitExhausted)
        } else {
            None
        };

        Self {
            member: Some(member),
            remaining,
            eligible: reason.is_none(),
            reason,
        }
    }

    /// Yields the member if eligible, otherwise the rejection reason
    pub fn into_member(self) -> Result<Member, RejectionReason> {
        match (self.reason, self.member) {
            (None, Some(member)) => Ok(member),
            (Some(reason), _) => Err(reason),
            (None, None) => Err(RejectionReason::MemberNotFound),
        }
    }
}

/// Looks up a member inside an open transaction and assesses eligibility
#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityChecker;

impl EligibilityChecker {
    pub fn new() -> Self {
        Self
    }

    /// The lookup takes the member's row lock, which stays held until the
    /// transaction ends. Only storage faults are errors.
    pub async fn check<T: LedgerTransaction>(
        &self,
        tx: &mut T,
        member_id: MemberId,
    ) -> Result<Eligibility, PortError> {
        let member = tx.get_member_by_id(member_id).await?;
        let eligibility = Eligibility::assess(member);
        debug!(
            member_id = %member_id,
            eligible = eligibility.eligible,
            remaining = %eligibility.remaining,
            "Checked member eligibility"
        );
        Ok(eligibility)
    }
}
