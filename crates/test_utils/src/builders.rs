//! Test Data Builders
//!
//! Builders with sensible defaults, so a test names only the fields it
//! cares about. `build()` panics on values the domain constructors refuse;
//! these are for tests only.

use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{MemberId, ProcedureId, ProviderId};
use domain_claims::{ClaimSubmission, Member, Procedure};
use infra_db::repositories::{NewMember, NewProcedure};

use crate::fixtures::STANDARD_BENEFIT_LIMIT;

/// Builder for members
pub struct MemberBuilder {
    id: MemberId,
    full_name: String,
    benefit_limit: Decimal,
    used_amount: Decimal,
    is_active: bool,
}

impl Default for MemberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberBuilder {
    /// Creates a builder for an active member with a random name
    pub fn new() -> Self {
        Self {
            id: MemberId::new(1),
            full_name: Name().fake(),
            benefit_limit: STANDARD_BENEFIT_LIMIT,
            used_amount: Decimal::ZERO,
            is_active: true,
        }
    }

    pub fn with_id(mut self, id: MemberId) -> Self {
        self.id = id;
        self
    }

    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.full_name = name.into();
        self
    }

    pub fn with_benefit_limit(mut self, limit: Decimal) -> Self {
        self.benefit_limit = limit;
        self
    }

    pub fn with_used_amount(mut self, used: Decimal) -> Self {
        self.used_amount = used;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Builds the domain member
    ///
    /// # Panics
    ///
    /// Panics if the limit is negative or `used_amount` exceeds it
    pub fn build(self) -> Member {
        let member = Member::new(self.id, self.full_name, self.benefit_limit)
            .and_then(|m| m.with_used_amount(self.used_amount))
            .expect("invalid test member");

        if self.is_active {
            member
        } else {
            member.deactivated()
        }
    }

    /// Builds the insert row; the database assigns the id
    pub fn build_row(self) -> NewMember {
        NewMember {
            full_name: self.full_name,
            is_active: self.is_active,
            benefit_limit: self.benefit_limit,
            used_amount: self.used_amount,
        }
    }
}

/// Builder for procedures
pub struct ProcedureBuilder {
    id: ProcedureId,
    code: String,
    description: String,
    average_cost: Decimal,
}

impl Default for ProcedureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcedureBuilder {
    pub fn new() -> Self {
        Self {
            id: ProcedureId::new(1),
            code: "CONS-001".to_string(),
            description: "General consultation".to_string(),
            average_cost: dec!(100),
        }
    }

    pub fn with_id(mut self, id: ProcedureId) -> Self {
        self.id = id;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_average_cost(mut self, cost: Decimal) -> Self {
        self.average_cost = cost;
        self
    }

    /// # Panics
    ///
    /// Panics on an empty code or negative cost
    pub fn build(self) -> Procedure {
        Procedure::new(self.id, self.code, self.description, self.average_cost)
            .expect("invalid test procedure")
    }

    pub fn build_row(self) -> NewProcedure {
        NewProcedure {
            code: self.code,
            description: self.description,
            average_cost: self.average_cost,
        }
    }
}

/// Builder for claim submissions
pub struct ClaimSubmissionBuilder {
    member_id: MemberId,
    provider_id: ProviderId,
    procedure_code: String,
    diagnosis_code: String,
    requested_amount: Decimal,
}

impl Default for ClaimSubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSubmissionBuilder {
    /// A 100.00 consultation for member 1
    pub fn new() -> Self {
        Self {
            member_id: MemberId::new(1),
            provider_id: ProviderId::new(17),
            procedure_code: "CONS-001".to_string(),
            diagnosis_code: "J06.9".to_string(),
            requested_amount: dec!(100),
        }
    }

    pub fn with_member_id(mut self, id: MemberId) -> Self {
        self.member_id = id;
        self
    }

    pub fn with_provider_id(mut self, id: ProviderId) -> Self {
        self.provider_id = id;
        self
    }

    pub fn with_procedure_code(mut self, code: impl Into<String>) -> Self {
        self.procedure_code = code.into();
        self
    }

    pub fn with_diagnosis_code(mut self, code: impl Into<String>) -> Self {
        self.diagnosis_code = code.into();
        self
    }

    pub fn with_requested_amount(mut self, amount: Decimal) -> Self {
        self.requested_amount = amount;
        self
    }

    pub fn build(self) -> ClaimSubmission {
        ClaimSubmission {
            member_id: self.member_id,
            provider_id: self.provider_id,
            procedure_code: self.procedure_code,
            diagnosis_code: self.diagnosis_code,
            requested_amount: self.requested_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_builder_defaults() {
        let member = MemberBuilder::new().build();
        assert!(member.is_active);
        assert!(!member.full_name.is_empty());
        assert_eq!(member.remaining_benefit(), STANDARD_BENEFIT_LIMIT);
    }

    #[test]
    fn test_member_builder_row_keeps_ledger() {
        let row = MemberBuilder::new()
            .with_benefit_limit(dec!(500))
            .with_used_amount(dec!(125.50))
            .inactive()
            .build_row();
        assert_eq!(row.benefit_limit, dec!(500));
        assert_eq!(row.used_amount, dec!(125.50));
        assert!(!row.is_active);
    }

    #[test]
    #[should_panic(expected = "invalid test member")]
    fn test_member_builder_refuses_overspend() {
        MemberBuilder::new()
            .with_benefit_limit(dec!(10))
            .with_used_amount(dec!(11))
            .build();
    }

    #[test]
    fn test_submission_builder() {
        let submission = ClaimSubmissionBuilder::new()
            .with_member_id(MemberId::new(9))
            .with_requested_amount(dec!(42.10))
            .build();
        assert_eq!(submission.member_id, MemberId::new(9));
        assert_eq!(submission.requested_amount, dec!(42.10));
        assert_eq!(submission.procedure_code, "CONS-001");
    }
}
