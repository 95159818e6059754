//! Procedure reference data

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, ProcedureId};

/// A billable procedure and its typical cost
///
/// Read-only during adjudication. `average_cost` is the baseline the fraud
/// signal compares requested amounts against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: ProcedureId,
    /// Unique business key, e.g. `"CONS-001"`
    pub code: String,
    pub description: String,
    pub average_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Procedure {
    pub fn new(
        id: ProcedureId,
        code: impl Into<String>,
        description: impl Into<String>,
        average_cost: Decimal,
    ) -> Result<Self, CoreError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(CoreError::validation("procedure code must not be empty"));
        }
        if average_cost.is_sign_negative() {
            return Err(CoreError::validation(format!(
                "average cost must not be negative, got {}",
                average_cost
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            code,
            description: description.into(),
            average_cost,
            created_at: now,
            updated_at: now,
        })
    }
}
