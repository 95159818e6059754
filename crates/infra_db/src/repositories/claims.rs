//! Claims repository implementation
//!
//! Claims are written once, inside the adjudication transaction, and never
//! updated afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::DatabaseError;

/// Repository for claim rows
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a claim by its identifier
    pub async fn get_by_id(&self, claim_id: i64) -> Result<ClaimRow, DatabaseError> {
        sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT
                id, member_id, provider_id, procedure_code, diagnosis_code,
                requested_amount, approved_amount, status, fraud_flag,
                rejection_reason, created_at, updated_at
            FROM claims
            WHERE id = $1
            "#,
        )
        .bind(claim_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    /// Inserts a claim and returns its assigned id
    pub async fn insert(conn: &mut PgConnection, claim: &NewClaimRow) -> Result<i64, DatabaseError> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO claims (
                member_id, provider_id, procedure_code, diagnosis_code,
                requested_amount, approved_amount, status, fraud_flag,
                rejection_reason, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING id
            "#,
        )
        .bind(claim.member_id)
        .bind(claim.provider_id)
        .bind(&claim.procedure_code)
        .bind(&claim.diagnosis_code)
        .bind(claim.requested_amount)
        .bind(claim.approved_amount)
        .bind(claim.status)
        .bind(claim.fraud_flag)
        .bind(&claim.rejection_reason)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }
}

/// Database row for a claim
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: i64,
    pub member_id: i64,
    pub provider_id: i64,
    pub procedure_code: String,
    pub diagnosis_code: String,
    pub requested_amount: Decimal,
    pub approved_amount: Decimal,
    pub status: ClaimStatus,
    pub fraud_flag: bool,
    /// Empty when the claim was fully approved
    pub rejection_reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a claim
#[derive(Debug, Clone)]
pub struct NewClaimRow {
    pub member_id: i64,
    pub provider_id: i64,
    pub procedure_code: String,
    pub diagnosis_code: String,
    pub requested_amount: Decimal,
    pub approved_amount: Decimal,
    pub status: ClaimStatus,
    pub fraud_flag: bool,
    pub rejection_reason: String,
}

/// Claim status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Approved for the full requested amount
    Approved,
    /// Approved up to the remaining benefit
    Partial,
    /// Nothing approved
    Rejected,
}
