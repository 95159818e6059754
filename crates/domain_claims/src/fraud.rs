//! Fraud signal

use rust_decimal::Decimal;

/// Default ratio of requested amount to average procedure cost above which a
/// claim is flagged
pub const FRAUD_AMOUNT_MULTIPLIER: Decimal = Decimal::TWO;

/// Flags requests that are unusually high for their procedure
///
/// The flag is advisory. It never blocks approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FraudSignalEvaluator {
    multiplier: Decimal,
}

impl FraudSignalEvaluator {
    pub fn new(multiplier: Decimal) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// Returns true when `requested_amount > average_cost * multiplier`
    ///
    /// Any positive request against a zero-cost procedure is flagged.
    pub fn evaluate(&self, requested_amount: Decimal, average_cost: Decimal) -> bool {
        match average_cost.checked_mul(self.multiplier) {
            Some(threshold) => requested_amount > threshold,
            // A threshold too large to represent cannot be exceeded
            None => false,
        }
    }
}

impl Default for FraudSignalEvaluator {
    fn default() -> Self {
        Self::new(FRAUD_AMOUNT_MULTIPLIER)
    }
}
