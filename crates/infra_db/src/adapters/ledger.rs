//! PostgreSQL Ledger Adapter
//!
//! Implements the claims domain's `LedgerStore` port on PostgreSQL.
//!
//! # Overview
//!
//! Each [`PostgresLedgerTx`] wraps one `sqlx::Transaction`. Member reads take
//! `SELECT ... FOR UPDATE` locks, so concurrent submissions for one member
//! serialize on the member row while other members proceed in parallel.
//! Dropping a transaction without committing rolls it back.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedger;
//! use domain_claims::{AdjudicationConfig, ClaimAdjudicationEngine};
//! use std::sync::Arc;
//!
//! let ledger = Arc::new(PostgresLedger::new(pool));
//! let engine = ClaimAdjudicationEngine::new(ledger, AdjudicationConfig::default());
//! let outcome = engine.submit(&submission).await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, MemberId,
    PortError, ProcedureId, ProviderId,
};
use domain_claims::{
    Claim, ClaimStatus, LedgerStore, LedgerTransaction, Member, NewClaim, Procedure,
};

use crate::error::DatabaseError;
use crate::repositories::claims::{ClaimRow, ClaimStatus as DbClaimStatus, ClaimsRepository, NewClaimRow};
use crate::repositories::members::{MemberRepository, MemberRow};
use crate::repositories::procedures::{ProcedureRepository, ProcedureRow};

const ADAPTER_ID: &str = "postgres-ledger";

/// PostgreSQL-backed implementation of the LedgerStore port
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
    claims: ClaimsRepository,
}

impl PostgresLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            claims: ClaimsRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresLedger {}

#[async_trait]
impl HealthCheckable for PostgresLedger {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedger {
    type Transaction = PostgresLedgerTx;

    async fn begin(&self) -> Result<PostgresLedgerTx, PortError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(e)))?;
        Ok(PostgresLedgerTx { tx })
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        debug!("Fetching claim by ID");
        let row = self.claims.get_by_id(id.value()).await?;
        row_to_claim(row)
    }
}

/// Transaction handle for [`PostgresLedger`]
pub struct PostgresLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTx {
    #[instrument(skip(self), fields(member_id = %id))]
    async fn get_member_by_id(&mut self, id: MemberId) -> Result<Option<Member>, PortError> {
        debug!("Locking member row");
        MemberRepository::lock_by_id(&mut self.tx, id.value())
            .await?
            .map(row_to_member)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn get_procedure_by_code(&mut self, code: &str) -> Result<Option<Procedure>, PortError> {
        ProcedureRepository::find_by_code(&mut self.tx, code)
            .await?
            .map(row_to_procedure)
            .transpose()
    }

    #[instrument(skip(self, member), fields(member_id = %member.id, used_amount = %member.used_amount))]
    async fn update_member(&mut self, member: &Member) -> Result<(), PortError> {
        debug!("Writing member ledger");
        MemberRepository::upsert(&mut self.tx, &member_to_row(member)).await?;
        Ok(())
    }

    #[instrument(skip(self, claim), fields(member_id = %claim.member_id, status = %claim.status))]
    async fn create_claim(&mut self, claim: &NewClaim) -> Result<ClaimId, PortError> {
        let id = ClaimsRepository::insert(&mut self.tx, &new_claim_to_row(claim)).await?;
        debug!(claim_id = id, "Inserted claim");
        Ok(ClaimId::new(id))
    }

    async fn commit(self) -> Result<(), PortError> {
        self.tx
            .commit()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(e)))
    }

    async fn rollback(self) -> Result<(), PortError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| PortError::from(DatabaseError::from(e)))
    }
}

// ============================================================================
// Row conversions
// ============================================================================

fn invalid_row(e: impl std::fmt::Display) -> PortError {
    DatabaseError::InvalidRow(e.to_string()).into()
}

fn row_to_member(row: MemberRow) -> Result<Member, PortError> {
    let member = Member::new(MemberId::new(row.id), row.full_name, row.benefit_limit)
        .and_then(|m| m.with_used_amount(row.used_amount))
        .map_err(invalid_row)?;
    let member = if row.is_active { member } else { member.deactivated() };

    Ok(Member {
        created_at: row.created_at,
        updated_at: row.updated_at,
        ..member
    })
}

fn member_to_row(member: &Member) -> MemberRow {
    MemberRow {
        id: member.id.value(),
        full_name: member.full_name.clone(),
        is_active: member.is_active,
        benefit_limit: member.benefit_limit,
        used_amount: member.used_amount,
        created_at: member.created_at,
        updated_at: member.updated_at,
    }
}

fn row_to_procedure(row: ProcedureRow) -> Result<Procedure, PortError> {
    let procedure = Procedure::new(
        ProcedureId::new(row.id),
        row.code,
        row.description,
        row.average_cost,
    )
    .map_err(invalid_row)?;

    Ok(Procedure {
        created_at: row.created_at,
        updated_at: row.updated_at,
        ..procedure
    })
}

fn new_claim_to_row(claim: &NewClaim) -> NewClaimRow {
    NewClaimRow {
        member_id: claim.member_id.value(),
        provider_id: claim.provider_id.value(),
        procedure_code: claim.procedure_code.clone(),
        diagnosis_code: claim.diagnosis_code.clone(),
        requested_amount: claim.requested_amount,
        approved_amount: claim.approved_amount,
        status: domain_to_db_status(claim.status),
        fraud_flag: claim.fraud_flag,
        rejection_reason: claim.rejection_reason.clone().unwrap_or_default(),
    }
}

fn row_to_claim(row: ClaimRow) -> Result<Claim, PortError> {
    Ok(Claim {
        id: ClaimId::new(row.id),
        member_id: MemberId::new(row.member_id),
        provider_id: ProviderId::new(row.provider_id),
        procedure_code: row.procedure_code,
        diagnosis_code: row.diagnosis_code,
        requested_amount: row.requested_amount,
        approved_amount: row.approved_amount,
        status: db_to_domain_status(row.status),
        fraud_flag: row.fraud_flag,
        rejection_reason: Some(row.rejection_reason).filter(|r| !r.is_empty()),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn domain_to_db_status(status: ClaimStatus) -> DbClaimStatus {
    match status {
        ClaimStatus::Approved => DbClaimStatus::Approved,
        ClaimStatus::Partial => DbClaimStatus::Partial,
        ClaimStatus::Rejected => DbClaimStatus::Rejected,
    }
}

fn db_to_domain_status(status: DbClaimStatus) -> ClaimStatus {
    match status {
        DbClaimStatus::Approved => ClaimStatus::Approved,
        DbClaimStatus::Partial => ClaimStatus::Partial,
        DbClaimStatus::Rejected => ClaimStatus::Rejected,
    }
}
