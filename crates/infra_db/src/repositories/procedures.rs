//! Procedure repository implementation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::DatabaseError;

/// Repository for procedure reference data
#[derive(Debug, Clone)]
pub struct ProcedureRepository {
    pool: PgPool,
}

impl ProcedureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a procedure
    ///
    /// Fails with `DuplicateEntry` if the code is taken.
    pub async fn insert(&self, procedure: NewProcedure) -> Result<ProcedureRow, DatabaseError> {
        let row = sqlx::query_as::<_, ProcedureRow>(
            r#"
            INSERT INTO procedures (code, description, average_cost)
            VALUES ($1, $2, $3)
            RETURNING id, code, description, average_cost, created_at, updated_at
            "#,
        )
        .bind(&procedure.code)
        .bind(&procedure.description)
        .bind(procedure.average_cost)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Finds a procedure by its business code
    pub async fn find_by_code(
        conn: &mut PgConnection,
        code: &str,
    ) -> Result<Option<ProcedureRow>, DatabaseError> {
        let row = sqlx::query_as::<_, ProcedureRow>(
            r#"
            SELECT id, code, description, average_cost, created_at, updated_at
            FROM procedures
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }
}

/// Database row for a procedure
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProcedureRow {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub average_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a procedure
#[derive(Debug, Clone)]
pub struct NewProcedure {
    pub code: String,
    pub description: String,
    pub average_cost: Decimal,
}
