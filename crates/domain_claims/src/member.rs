//! Member benefit ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, MemberId};

/// A covered member and their benefit balance
///
/// `used_amount` is the cumulative approved spend. It only grows through
/// [`Member::consume_benefit`], which refuses to push it past
/// `benefit_limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier
    pub id: MemberId,
    /// Full name
    pub full_name: String,
    /// Whether the member may currently claim
    pub is_active: bool,
    /// Maximum cumulative approved amount
    pub benefit_limit: Decimal,
    /// Cumulative approved amount so far
    pub used_amount: Decimal,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Creates an active member with nothing consumed yet
    pub fn new(
        id: MemberId,
        full_name: impl Into<String>,
        benefit_limit: Decimal,
    ) -> Result<Self, CoreError> {
        if benefit_limit.is_sign_negative() {
            return Err(CoreError::validation(format!(
                "benefit limit must not be negative, got {}",
                benefit_limit
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            full_name: full_name.into(),
            is_active: true,
            benefit_limit,
            used_amount: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets an opening used amount
    pub fn with_used_amount(mut self, used_amount: Decimal) -> Result<Self, CoreError> {
        if used_amount.is_sign_negative() {
            return Err(CoreError::validation("used amount must not be negative"));
        }
        if used_amount > self.benefit_limit {
            return Err(CoreError::invariant(format!(
                "used amount {} exceeds benefit limit {}",
                used_amount, self.benefit_limit
            )));
        }
        self.used_amount = used_amount;
        Ok(self)
    }

    /// Marks the member inactive
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Benefit still available for new approvals (`limit - used`)
    pub fn remaining_benefit(&self) -> Decimal {
        self.benefit_limit - self.used_amount
    }

    /// Adds an approved amount to the used ledger
    pub fn consume_benefit(&mut self, amount: Decimal) -> Result<(), CoreError> {
        if amount.is_sign_negative() {
            return Err(CoreError::validation(format!(
                "cannot consume a negative amount ({})",
                amount
            )));
        }
        let used = self.used_amount + amount;
        if used > self.benefit_limit {
            return Err(CoreError::invariant(format!(
                "member {} would use {} of a {} limit",
                self.id, used, self.benefit_limit
            )));
        }
        self.used_amount = used;
        self.updated_at = Utc::now();
        Ok(())
    }
}
