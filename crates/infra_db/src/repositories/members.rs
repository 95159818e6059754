//! Member repository implementation
//!
//! Members carry the benefit ledger. Reads made during adjudication go
//! through [`MemberRepository::lock_by_id`], which holds the row lock until
//! the surrounding transaction ends.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::DatabaseError;

const MEMBER_COLUMNS: &str =
    "id, full_name, is_active, benefit_limit, used_amount, created_at, updated_at";

/// Repository for member rows
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Creates a new MemberRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a member and returns it with its assigned id
    pub async fn insert(&self, member: NewMember) -> Result<MemberRow, DatabaseError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            INSERT INTO members (full_name, is_active, benefit_limit, used_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(&member.full_name)
        .bind(member.is_active)
        .bind(member.benefit_limit)
        .bind(member.used_amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Reads a member without locking it
    pub async fn get_by_id(&self, id: i64) -> Result<MemberRow, DatabaseError> {
        sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Member", id))
    }

    /// Reads a member and takes an exclusive row lock on it
    ///
    /// The lock is held until the transaction owning `conn` commits or rolls
    /// back. Concurrent callers for the same id block here.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<MemberRow>, DatabaseError> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Writes a member by identity, inserting it if absent
    pub async fn upsert(conn: &mut PgConnection, member: &MemberRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id, full_name, is_active, benefit_limit, used_amount, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                is_active = EXCLUDED.is_active,
                benefit_limit = EXCLUDED.benefit_limit,
                used_amount = EXCLUDED.used_amount,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(member.id)
        .bind(&member.full_name)
        .bind(member.is_active)
        .bind(member.benefit_limit)
        .bind(member.used_amount)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

/// Database row for a member
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MemberRow {
    pub id: i64,
    pub full_name: String,
    pub is_active: bool,
    pub benefit_limit: Decimal,
    pub used_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a member
#[derive(Debug, Clone)]
pub struct NewMember {
    pub full_name: String,
    pub is_active: bool,
    pub benefit_limit: Decimal,
    pub used_amount: Decimal,
}
