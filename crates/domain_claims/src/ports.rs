//! Claims Domain Ports
//!
//! The adjudication engine needs one thing from storage: an atomic unit of
//! work over members, procedures, and claims. [`LedgerStore`] opens such a
//! unit; [`LedgerTransaction`] is the handle every adjudication step runs
//! through.
//!
//! # Concurrency contract
//!
//! [`LedgerTransaction::get_member_by_id`] must take an exclusive lock on the
//! member that is held until the transaction commits or rolls back. Two
//! submissions for the same member therefore adjudicate one after the other,
//! and the second sees the first's consumed benefit. Submissions for
//! different members never wait on each other.
//!
//! Dropping a transaction without committing must roll it back.
//!
//! # Adapters
//!
//! - **PostgreSQL**: `infra_db::PostgresLedger` (`SELECT ... FOR UPDATE`)
//! - **Mock**: [`mock::MockLedgerStore`], in memory with per-member mutexes

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, MemberId, PortError};

use crate::claim::{Claim, NewClaim};
use crate::member::Member;
use crate::procedure::Procedure;

/// One atomic unit of ledger work
#[async_trait]
pub trait LedgerTransaction: Send + Sized {
    /// Reads a member and locks it for the rest of the transaction
    ///
    /// Returns `Ok(None)` when no such member exists.
    async fn get_member_by_id(&mut self, id: MemberId) -> Result<Option<Member>, PortError>;

    /// Reads a procedure by its business code
    async fn get_procedure_by_code(&mut self, code: &str) -> Result<Option<Procedure>, PortError>;

    /// Writes a member, inserting it if absent
    ///
    /// Fails with [`PortError::Conflict`] if `used_amount` would exceed
    /// `benefit_limit`.
    async fn update_member(&mut self, member: &Member) -> Result<(), PortError>;

    /// Inserts a claim and returns its assigned identity
    async fn create_claim(&mut self, claim: &NewClaim) -> Result<ClaimId, PortError>;

    /// Makes every write in this transaction durable
    async fn commit(self) -> Result<(), PortError>;

    /// Discards every write in this transaction
    async fn rollback(self) -> Result<(), PortError>;
}

/// Source of ledger transactions
#[async_trait]
pub trait LedgerStore: DomainPort + HealthCheckable {
    type Transaction: LedgerTransaction + 'static;

    /// Opens a new transaction
    async fn begin(&self) -> Result<Self::Transaction, PortError>;

    /// Reads a committed claim
    async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError>;
}

/// In-memory ledger for tests
///
/// Writes are staged on the transaction and applied together on commit.
/// Each member has its own mutex, acquired by `get_member_by_id` and released
/// when the transaction is committed, rolled back, or dropped.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use chrono::Utc;
    use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

    use core_kernel::{AdapterHealth, HealthCheckResult};

    #[derive(Debug, Default)]
    struct LedgerState {
        members: HashMap<MemberId, Member>,
        procedures: HashMap<String, Procedure>,
        claims: BTreeMap<ClaimId, Claim>,
    }

    #[derive(Debug, Default)]
    struct Faults {
        fail_claim_writes: AtomicBool,
        fail_commits: AtomicBool,
    }

    /// In-memory mock implementation of LedgerStore
    #[derive(Debug, Clone, Default)]
    pub struct MockLedgerStore {
        state: Arc<RwLock<LedgerState>>,
        row_locks: Arc<Mutex<HashMap<MemberId, Arc<Mutex<()>>>>>,
        claim_sequence: Arc<AtomicI64>,
        faults: Arc<Faults>,
        latency: Option<Duration>,
    }

    impl MockLedgerStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Delays every transactional read and write by `latency`
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        pub async fn insert_member(&self, member: Member) {
            self.state.write().await.members.insert(member.id, member);
        }

        pub async fn insert_procedure(&self, procedure: Procedure) {
            self.state
                .write()
                .await
                .procedures
                .insert(procedure.code.clone(), procedure);
        }

        /// Committed state of a member
        pub async fn member(&self, id: MemberId) -> Option<Member> {
            self.state.read().await.members.get(&id).cloned()
        }

        /// All committed claims in id order
        pub async fn claims(&self) -> Vec<Claim> {
            self.state.read().await.claims.values().cloned().collect()
        }

        pub async fn claims_for_member(&self, id: MemberId) -> Vec<Claim> {
            self.state
                .read()
                .await
                .claims
                .values()
                .filter(|c| c.member_id == id)
                .cloned()
                .collect()
        }

        /// Makes every subsequent `create_claim` fail with a connection error
        pub fn fail_claim_writes(&self, fail: bool) {
            self.faults.fail_claim_writes.store(fail, Ordering::SeqCst);
        }

        /// Makes every subsequent commit fail with a connection error
        pub fn fail_commits(&self, fail: bool) {
            self.faults.fail_commits.store(fail, Ordering::SeqCst);
        }

        async fn row_lock(&self, id: MemberId) -> Arc<Mutex<()>> {
            self.row_locks
                .lock()
                .await
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        }
    }

    impl DomainPort for MockLedgerStore {}

    #[async_trait]
    impl HealthCheckable for MockLedgerStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-ledger".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl LedgerStore for MockLedgerStore {
        type Transaction = MockLedgerTransaction;

        async fn begin(&self) -> Result<MockLedgerTransaction, PortError> {
            Ok(MockLedgerTransaction {
                store: self.clone(),
                held_locks: HashMap::new(),
                staged_members: HashMap::new(),
                staged_claims: Vec::new(),
            })
        }

        async fn get_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.state
                .read()
                .await
                .claims
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }
    }

    /// Transaction handle for [`MockLedgerStore`]
    pub struct MockLedgerTransaction {
        store: MockLedgerStore,
        held_locks: HashMap<MemberId, OwnedMutexGuard<()>>,
        staged_members: HashMap<MemberId, Member>,
        staged_claims: Vec<(ClaimId, NewClaim)>,
    }

    impl MockLedgerTransaction {
        async fn simulate_latency(&self) {
            if let Some(latency) = self.store.latency {
                tokio::time::sleep(latency).await;
            }
        }

        async fn lock_member(&mut self, id: MemberId) {
            if self.held_locks.contains_key(&id) {
                return;
            }
            let guard = self.store.row_lock(id).await.lock_owned().await;
            self.held_locks.insert(id, guard);
        }
    }

    #[async_trait]
    impl LedgerTransaction for MockLedgerTransaction {
        async fn get_member_by_id(&mut self, id: MemberId) -> Result<Option<Member>, PortError> {
            self.lock_member(id).await;
            self.simulate_latency().await;
            if let Some(member) = self.staged_members.get(&id) {
                return Ok(Some(member.clone()));
            }
            Ok(self.store.member(id).await)
        }

        async fn get_procedure_by_code(&mut self, code: &str) -> Result<Option<Procedure>, PortError> {
            self.simulate_latency().await;
            Ok(self.store.state.read().await.procedures.get(code).cloned())
        }

        async fn update_member(&mut self, member: &Member) -> Result<(), PortError> {
            if member.used_amount > member.benefit_limit {
                return Err(PortError::conflict(format!(
                    "used amount {} exceeds benefit limit {} for {}",
                    member.used_amount, member.benefit_limit, member.id
                )));
            }
            self.lock_member(member.id).await;
            self.simulate_latency().await;
            self.staged_members.insert(member.id, member.clone());
            Ok(())
        }

        async fn create_claim(&mut self, claim: &NewClaim) -> Result<ClaimId, PortError> {
            self.simulate_latency().await;
            if self.store.faults.fail_claim_writes.load(Ordering::SeqCst) {
                return Err(PortError::connection("injected claim write failure"));
            }
            let id = ClaimId::new(self.store.claim_sequence.fetch_add(1, Ordering::SeqCst) + 1);
            self.staged_claims.push((id, claim.clone()));
            Ok(id)
        }

        async fn commit(self) -> Result<(), PortError> {
            if self.store.faults.fail_commits.load(Ordering::SeqCst) {
                return Err(PortError::connection("injected commit failure"));
            }
            let now = Utc::now();
            let mut state = self.store.state.write().await;
            for (id, member) in self.staged_members {
                state.members.insert(id, member);
            }
            for (id, claim) in self.staged_claims {
                state.claims.insert(id, Claim::from_new(id, claim, now));
            }
            // Row locks are released when `held_locks` drops here
            Ok(())
        }

        async fn rollback(self) -> Result<(), PortError> {
            Ok(())
        }
    }
}
