//! Pre-built Test Fixtures
//!
//! The members and procedures most suites start from. Ids are fixed so
//! in-memory tests can address them directly; database tests get the
//! assigned ids back from the seeding helpers instead.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{MemberId, ProcedureId, ProviderId};
use domain_claims::ports::mock::MockLedgerStore;
use domain_claims::{ClaimSubmission, Member, Procedure};

use crate::builders::{ClaimSubmissionBuilder, MemberBuilder, ProcedureBuilder};

/// Benefit limit every fixture member starts with
pub const STANDARD_BENEFIT_LIMIT: Decimal = dec!(1000);

/// A procedure the catalogue knows about
#[derive(Debug, Clone, Copy)]
pub struct CatalogueEntry {
    pub code: &'static str,
    pub description: &'static str,
    pub average_cost: Decimal,
}

/// Procedures seeded into every fixture ledger
pub static PROCEDURE_CATALOGUE: Lazy<Vec<CatalogueEntry>> = Lazy::new(|| {
    vec![
        CatalogueEntry { code: "CONS-001", description: "General consultation", average_cost: dec!(100) },
        CatalogueEntry { code: "LAB-014", description: "Lipid panel", average_cost: dec!(50) },
        CatalogueEntry { code: "IMG-220", description: "MRI, lumbar spine", average_cost: dec!(900) },
        CatalogueEntry { code: "DEN-003", description: "Dental scaling", average_cost: dec!(80) },
    ]
});

/// Fixture members
pub struct MemberFixtures;

impl MemberFixtures {
    /// Active, nothing used
    pub fn standard() -> Member {
        MemberBuilder::new().with_id(MemberId::new(1)).build()
    }

    /// Active, 800 of 1000 used
    pub fn near_limit() -> Member {
        MemberBuilder::new()
            .with_id(MemberId::new(2))
            .with_used_amount(dec!(800))
            .build()
    }

    /// Active, limit fully used
    pub fn exhausted() -> Member {
        MemberBuilder::new()
            .with_id(MemberId::new(3))
            .with_used_amount(STANDARD_BENEFIT_LIMIT)
            .build()
    }

    /// Deactivated, nothing used
    pub fn inactive() -> Member {
        MemberBuilder::new()
            .with_id(MemberId::new(4))
            .inactive()
            .build()
    }

    pub fn all() -> Vec<Member> {
        vec![Self::standard(), Self::near_limit(), Self::exhausted(), Self::inactive()]
    }
}

/// Fixture procedures
pub struct ProcedureFixtures;

impl ProcedureFixtures {
    pub fn consultation() -> Procedure {
        Self::from_entry(1, &PROCEDURE_CATALOGUE[0])
    }

    pub fn lipid_panel() -> Procedure {
        Self::from_entry(2, &PROCEDURE_CATALOGUE[1])
    }

    pub fn all() -> Vec<Procedure> {
        PROCEDURE_CATALOGUE
            .iter()
            .zip(1i64..)
            .map(|(entry, id)| Self::from_entry(id, entry))
            .collect()
    }

    fn from_entry(id: i64, entry: &CatalogueEntry) -> Procedure {
        ProcedureBuilder::new()
            .with_id(ProcedureId::new(id))
            .with_code(entry.code)
            .with_description(entry.description)
            .with_average_cost(entry.average_cost)
            .build()
    }
}

/// Fixture submissions
pub struct SubmissionFixtures;

impl SubmissionFixtures {
    /// A consultation claim from the default provider
    pub fn consultation(member_id: MemberId, amount: Decimal) -> ClaimSubmission {
        ClaimSubmissionBuilder::new()
            .with_member_id(member_id)
            .with_procedure_code(PROCEDURE_CATALOGUE[0].code)
            .with_requested_amount(amount)
            .build()
    }

    pub fn default_provider() -> ProviderId {
        ProviderId::new(17)
    }
}

/// An in-memory ledger holding every fixture member and procedure
pub async fn seeded_mock_store() -> MockLedgerStore {
    let store = MockLedgerStore::new();
    for member in MemberFixtures::all() {
        store.insert_member(member).await;
    }
    for procedure in ProcedureFixtures::all() {
        store.insert_procedure(procedure).await;
    }
    store
}
