//! External interfaces.
//!
//! The core depends on exactly three external capability sets: a
//! `Store` (the only persistence dependency), a `Notifier`
//! (best-effort), and an `IdentityResolver`. All three are modeled as
//! traits; the core's public API never depends on a concrete
//! implementation of any of them.

use crate::model::{
    AccountId, ApprovalTarget, ApproverRole, AssignmentProposal, BuildId, ManagerReassignmentProposal,
    ReassignmentId,
};
use crate::orchestrator::stats::{Conflict, RunStatistics};
use crate::snapshot::loader::RawSnapshotData;
use crate::workflow::CrossBuildReassignment;

/// The Store is the core's only persistence dependency.
///
/// Implementations must provide read-committed semantics for
/// `read_snapshot` and serializable semantics for `write_proposals` and
/// reassignment transitions. `read_snapshot` hands back raw, undeduced
/// rows — deriving the immutable `Snapshot` (parent/child
/// classification, ATR, fiscal quarters, population totals) is the
/// Snapshot Loader's job (`snapshot::loader::load`), not the Store's.
pub trait Store {
    fn read_snapshot(&self, build_id: &str) -> Result<RawSnapshotData, StoreError>;

    /// Transactional replace: prior proposals for the build are
    /// atomically superseded.
    fn write_proposals(
        &mut self,
        build_id: &str,
        proposals: &[AssignmentProposal],
        conflicts: &[Conflict],
        statistics: &RunStatistics,
    ) -> Result<(), StoreError>;

    fn insert_reassignment(&mut self, r: ManagerReassignmentProposal) -> Result<ReassignmentId, StoreError>;

    fn transition_reassignment(
        &mut self,
        id: &str,
        new_state: crate::model::ApprovalStatus,
        actor: &str,
        rationale: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Returns the count of reassignments transitioned.
    fn bulk_reject_reassignments(
        &mut self,
        build_id: &str,
        account_id: &str,
        exclude_id: &str,
        actor: &str,
        rationale: &str,
    ) -> Result<usize, StoreError>;

    fn upsert_note(&mut self, note: crate::model::ManagerNote) -> Result<(), StoreError>;
    fn delete_note(&mut self, build_id: &str, target: &ApprovalTarget, category: &str) -> Result<(), StoreError>;

    fn read_cross_build_reassignments(
        &self,
        account_ids: &[AccountId],
        exclude_build_id: &BuildId,
    ) -> Result<Vec<CrossBuildReassignment>, StoreError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Best-effort notification transport. Notification failure
/// never rolls back the governing transition.
pub trait Notifier {
    fn notify_proposal_rejected(&mut self, recipient: &str, account_name: &str, actor_name: &str, reason: &str);
    fn notify_superseded(&mut self, recipient: &str, account_name: &str, actor_name: &str);
}

/// Role resolution. The engine treats the resolved role as
/// opaque.
pub trait IdentityResolver {
    fn resolve_role(&self, user_id: &str) -> Result<ResolvedRole, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRole {
    Flm,
    Slm,
    RevOps,
}

impl From<ResolvedRole> for ApproverRole {
    fn from(r: ResolvedRole) -> Self {
        match r {
            ResolvedRole::Flm => ApproverRole::Flm,
            ResolvedRole::Slm => ApproverRole::Slm,
            ResolvedRole::RevOps => ApproverRole::RevOps,
        }
    }
}
