//! Manager reassignment proposal and its approval state machine.

use serde::{Deserialize, Serialize};

/// Approval state of a manager reassignment proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStatus {
    PendingSlm,
    PendingRevops,
    Approved,
    Rejected,
}

/// Who originated a reassignment proposal, which determines its
/// starting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposerRole {
    Flm,
    Slm,
    RevOps,
}

impl ProposerRole {
    /// Starting state for a freshly-submitted proposal.
    pub fn starting_status(self) -> ApprovalStatus {
        match self {
            ProposerRole::RevOps => ApprovalStatus::Approved,
            ProposerRole::Slm => ApprovalStatus::PendingRevops,
            ProposerRole::Flm => ApprovalStatus::PendingSlm,
        }
    }
}

/// A manager-initiated reassignment proposal. Append-only: once
/// created, a record is never deleted, only transitioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerReassignmentProposal {
    pub id: String,
    pub account_id: String,
    pub build_id: String,
    pub manager_user_id: String,

    pub current_owner: String,
    pub proposed_owner: String,
    pub rationale: String,

    pub approval_status: ApprovalStatus,

    /// Set when an FLM files after the SLM's top-level review for this
    /// scope was already accepted.
    #[serde(default)]
    pub is_late_submission: bool,

    /// When set, this proposal was superseded by another (terminal,
    /// rejected) action — points at the superseding proposal's id.
    #[serde(default)]
    pub superseded_by: Option<String>,

    /// Logical arrival sequence number, used for the total ordering
    /// over reassignments for the same `(build_id, account_id)` pair.
    /// Never a wall-clock timestamp.
    pub created_at: u64,
}

impl ManagerReassignmentProposal {
    /// Whether this proposal is still open to transition (neither
    /// `approved` nor `rejected`).
    pub fn is_non_terminal(&self) -> bool {
        matches!(
            self.approval_status,
            ApprovalStatus::PendingSlm | ApprovalStatus::PendingRevops
        )
    }
}
