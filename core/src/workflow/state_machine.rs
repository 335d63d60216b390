//! Manager reassignment approval state machine.
//!
//! Legal transitions: `pending_slm -> pending_revops` (SLM approval),
//! `pending_slm -> rejected` (SLM rejection), `pending_revops ->
//! approved | rejected` (RevOps action). Only the `approved` transition
//! mutates the snapshot's `new_owner_*` fields — that mutation happens
//! at the Store layer, triggered by the caller after this function
//! returns `Approved`.

use crate::error::EngineError;
use crate::model::{ApprovalStatus, ManagerNote, ManagerReassignmentProposal, ProposerRole};

/// An action a reviewer takes against a pending reassignment proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    SlmApprove,
    SlmReject,
    RevOpsApprove,
    RevOpsReject,
}

/// Compute the next state for `current` under `action`, or
/// `EngineError::StaleStateTransition` if the action does not apply to
/// that state (e.g. a second SLM approval on an already-`pending_revops`
/// proposal).
pub fn transition(
    reassignment_id: &str,
    current: ApprovalStatus,
    action: TransitionAction,
) -> Result<ApprovalStatus, EngineError> {
    use ApprovalStatus::*;
    use TransitionAction::*;
    match (current, action) {
        (PendingSlm, SlmApprove) => Ok(PendingRevops),
        (PendingSlm, SlmReject) => Ok(Rejected),
        (PendingRevops, RevOpsApprove) => Ok(Approved),
        (PendingRevops, RevOpsReject) => Ok(Rejected),
        _ => Err(EngineError::StaleStateTransition {
            reassignment_id: reassignment_id.to_string(),
            expected: expected_states_for(action).to_string(),
            found: format!("{current:?}"),
        }),
    }
}

fn expected_states_for(action: TransitionAction) -> &'static str {
    match action {
        TransitionAction::SlmApprove | TransitionAction::SlmReject => "PendingSlm",
        TransitionAction::RevOpsApprove | TransitionAction::RevOpsReject => "PendingRevops",
    }
}

/// Build a freshly-submitted reassignment proposal, resolving its
/// starting state from the proposer's role and its late-submission
/// flag from whether the SLM has already accepted a top-level review
/// for the FLM's team.
#[allow(clippy::too_many_arguments)]
pub fn submit_proposal(
    id: String,
    account_id: String,
    build_id: String,
    manager_user_id: String,
    role: ProposerRole,
    current_owner: String,
    proposed_owner: String,
    rationale: String,
    created_at: u64,
    flm_team: Option<&str>,
    existing_notes: &[ManagerNote],
) -> ManagerReassignmentProposal {
    let is_late_submission = role == ProposerRole::Flm && flm_team.is_some_and(|team| slm_review_already_accepted(team, existing_notes));

    ManagerReassignmentProposal {
        id,
        account_id,
        build_id,
        manager_user_id,
        current_owner,
        proposed_owner,
        rationale,
        approval_status: role.starting_status(),
        is_late_submission,
        superseded_by: None,
        created_at,
    }
}

fn slm_review_already_accepted(flm_team: &str, notes: &[ManagerNote]) -> bool {
    use crate::model::{ApprovalTarget, ApproverRole};
    notes.iter().any(|n| {
        n.category == "review"
            && n.target == ApprovalTarget::FlmTeam(flm_team.to_string())
            && n.stamp.as_ref().map(|s| s.approver_role == ApproverRole::Slm).unwrap_or(false)
    })
}
