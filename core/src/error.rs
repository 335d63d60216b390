//! Error taxonomy.
//!
//! Fatalness is a property of the error *kind*, never inferred from
//! `Result`/exception mechanics: `EngineError::is_fatal` is the single
//! source of truth callers should consult before deciding whether a
//! run's partial output is usable.

use thiserror::Error;

/// A single referential-integrity or invariant violation found by the
/// Snapshot Loader. Violations are accumulated, not short-circuited
/// on the first one found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub entity: String,
    pub detail: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.entity, self.detail)
    }
}

/// A single dimension/rep pair for which no feasible completion exists
/// under the configured hard caps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfeasibilityReport {
    pub dimension: String,
    pub rep_id: String,
    pub detail: String,
}

/// Engine-wide error taxonomy.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid snapshot: {0:?}")]
    InvalidSnapshot(Vec<ValidationIssue>),

    #[error("insufficient reps: calibration population is empty (N=0)")]
    InsufficientReps,

    #[error("infeasible balance: {0:?}")]
    InfeasibleBalance(InfeasibilityReport),

    #[error("stale state transition: reassignment {reassignment_id} expected {expected}, found {found}")]
    StaleStateTransition {
        reassignment_id: String,
        expected: String,
        found: String,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("run exceeded its wall-clock budget of {budget_ms}ms")]
    Timeout { budget_ms: u64 },
}

impl EngineError {
    /// Fatalness is a property of the error kind, never of
    /// how the error propagated.
    pub fn is_fatal(&self) -> bool {
        match self {
            EngineError::InvalidSnapshot(_) => true,
            EngineError::InsufficientReps => true,
            EngineError::InfeasibleBalance(_) => true,
            EngineError::StaleStateTransition { .. } => false,
            EngineError::StoreUnavailable(_) => true,
            EngineError::Timeout { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_state_transition_is_the_only_non_fatal_kind() {
        let err = EngineError::StaleStateTransition {
            reassignment_id: "RP1".to_string(),
            expected: "pending_slm".to_string(),
            found: "approved".to_string(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn invalid_snapshot_is_fatal() {
        let err = EngineError::InvalidSnapshot(vec![ValidationIssue {
            entity: "rep:R1".to_string(),
            detail: "ambiguous backfill flags".to_string(),
        }]);
        assert!(err.is_fatal());
    }

    #[test]
    fn insufficient_reps_is_fatal() {
        assert!(EngineError::InsufficientReps.is_fatal());
    }
}
