//! Database Test Utilities
//!
//! PostgreSQL testcontainer harness for the ledger integration tests. Each
//! [`TestDatabase`] runs the workspace migrations and offers seeding and
//! inspection helpers that bypass the adjudication engine.

use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use core_kernel::MemberId;
use domain_claims::Member;
use infra_db::repositories::{MemberRepository, NewMember, NewProcedure, ProcedureRepository};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedger};

use crate::builders::{MemberBuilder, ProcedureBuilder};

const POSTGRES_TAG: &str = "16-alpine";
const POSTGRES_USER: &str = "test_user";
const POSTGRES_PASSWORD: &str = "test_password";
const POSTGRES_DB: &str = "claims_test";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for test database
#[derive(Debug, Clone)]
pub struct TestDatabaseConfig {
    pub user: String,
    pub password: String,
    pub database: String,
    pub host: String,
    pub port: u16,
}

impl Default for TestDatabaseConfig {
    fn default() -> Self {
        Self {
            user: POSTGRES_USER.to_string(),
            password: POSTGRES_PASSWORD.to_string(),
            database: POSTGRES_DB.to_string(),
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

impl TestDatabaseConfig {
    /// Creates the database connection URL
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

/// A migrated PostgreSQL container
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    pub config: TestDatabaseConfig,
    pub pool: PgPool,
}

impl TestDatabase {
    /// Starts a container and applies the migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the container fails to start or a migration fails
    pub async fn new() -> Result<Self, BoxError> {
        let container = Postgres::default()
            .with_user(POSTGRES_USER)
            .with_password(POSTGRES_PASSWORD)
            .with_db_name(POSTGRES_DB)
            .with_tag(POSTGRES_TAG)
            .start()
            .await?;

        let config = TestDatabaseConfig {
            host: container.get_host().await?.to_string(),
            port: container.get_host_port_ipv4(5432).await?,
            ..TestDatabaseConfig::default()
        };

        // Sized for the concurrency tests, which hold one connection per
        // in-flight submission.
        let pool = create_pool(
            DatabaseConfig::new(config.connection_url())
                .max_connections(32)
                .min_connections(0),
        )
        .await?;

        run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            config,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// A ledger adapter over this database
    pub fn ledger(&self) -> PostgresLedger {
        PostgresLedger::new(self.pool.clone())
    }

    /// Truncates every table and restarts the id sequences
    pub async fn clear_data(&self) -> Result<(), BoxError> {
        sqlx::query("TRUNCATE TABLE claims, procedures, members RESTART IDENTITY")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a member and returns the id the database assigned
    pub async fn seed_member(&self, member: NewMember) -> Result<MemberId, BoxError> {
        let row = MemberRepository::new(self.pool.clone()).insert(member).await?;
        Ok(MemberId::new(row.id))
    }

    /// Inserts an active member with the given limit and used amount
    pub async fn seed_member_with(
        &self,
        benefit_limit: Decimal,
        used_amount: Decimal,
    ) -> Result<MemberId, BoxError> {
        self.seed_member(
            MemberBuilder::new()
                .with_benefit_limit(benefit_limit)
                .with_used_amount(used_amount)
                .build_row(),
        )
        .await
    }

    pub async fn seed_procedure(&self, procedure: NewProcedure) -> Result<(), BoxError> {
        ProcedureRepository::new(self.pool.clone()).insert(procedure).await?;
        Ok(())
    }

    /// Inserts every procedure in the catalogue
    pub async fn seed_catalogue(&self) -> Result<(), BoxError> {
        for entry in crate::fixtures::PROCEDURE_CATALOGUE.iter() {
            self.seed_procedure(
                ProcedureBuilder::new()
                    .with_code(entry.code)
                    .with_description(entry.description)
                    .with_average_cost(entry.average_cost)
                    .build_row(),
            )
            .await?;
        }
        Ok(())
    }

    /// Reads a member outside any transaction
    pub async fn member(&self, id: MemberId) -> Result<Member, BoxError> {
        let row = MemberRepository::new(self.pool.clone()).get_by_id(id.value()).await?;
        let member = Member::new(id, row.full_name, row.benefit_limit)?
            .with_used_amount(row.used_amount)?;
        Ok(if row.is_active { member } else { member.deactivated() })
    }

    /// Sum of approved amounts over a member's claims
    pub async fn approved_total(&self, id: MemberId) -> Result<Decimal, BoxError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(approved_amount), 0) FROM claims WHERE member_id = $1",
        )
        .bind(id.value())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn claim_count(&self) -> Result<i64, BoxError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

static SHARED_TEST_DB: OnceCell<Arc<TestDatabase>> = OnceCell::const_new();

/// Gets or creates a shared test database instance
///
/// Tests sharing it must seed their own members rather than assume fixed
/// ids.
///
/// # Panics
///
/// Panics if the database fails to initialize
pub async fn get_shared_test_database() -> Arc<TestDatabase> {
    SHARED_TEST_DB
        .get_or_init(|| async {
            Arc::new(
                TestDatabase::new()
                    .await
                    .expect("Failed to create shared test database"),
            )
        })
        .await
        .clone()
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, BoxError> {
    TestDatabase::new().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_connection_url() {
        let config = TestDatabaseConfig::default();
        let url = config.connection_url();

        assert!(url.starts_with("postgres://"));
        assert!(url.contains(POSTGRES_USER));
        assert!(url.contains(POSTGRES_DB));
    }
}
