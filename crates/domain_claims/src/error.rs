//! Claims domain errors
//!
//! Expected adjudication outcomes (rejections, partial approvals) are not
//! errors. Everything here is a fault: the submission was not recorded and
//! its transaction was rolled back.

use thiserror::Error;

use core_kernel::{CoreError, PortError};
use crate::engine::AdjudicationStage;

/// Errors that can occur while adjudicating a claim
#[derive(Debug, Error)]
pub enum ClaimError {
    /// The ledger store failed at the given stage
    #[error("Storage fault during {stage}: {source}")]
    Storage {
        stage: AdjudicationStage,
        #[source]
        source: PortError,
    },

    /// The submission deadline elapsed before commit
    #[error("Submission timed out after {deadline_ms}ms")]
    Timeout { deadline_ms: u64 },

    /// The submission failed pre-validation
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// A domain invariant would have been broken
    #[error(transparent)]
    Invariant(#[from] CoreError),
}

impl ClaimError {
    pub fn storage(stage: AdjudicationStage, source: PortError) -> Self {
        ClaimError::Storage { stage, source }
    }

    /// Returns true if re-submitting may succeed
    ///
    /// A retry after a timeout can duplicate a claim whose commit actually
    /// landed; callers that need exactly-once must deduplicate themselves.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClaimError::Timeout { .. } => true,
            ClaimError::Storage { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClaimError::Timeout { .. })
    }

    /// Stage at which a storage fault happened
    pub fn stage(&self) -> Option<AdjudicationStage> {
        match self {
            ClaimError::Storage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
