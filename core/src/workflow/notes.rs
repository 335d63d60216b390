//! Approval-stamp notes.
//!
//! Stamps at `rep-book:{rep_id}` and `flm-team:{flm}` granularity are
//! stored as `ManagerNote`s in category `"approval"`. `Store::upsert_note`
//! is idempotent by construction (same `(build_id, target, category)`
//! key overwrites); this module adds the one piece of business logic
//! the Store trait doesn't express on its own: undoing an FLM-team
//! stamp cascades into deleting every rep-book stamp under that FLM.

use crate::model::{ApprovalStamp, ApprovalTarget, ApproverRole, ManagerNote, ProposerRole};
use crate::snapshot::Snapshot;
use crate::store::{Store, StoreError};

const APPROVAL_CATEGORY: &str = "approval";

/// Build the idempotent approval-stamp note for `target`.
pub fn approval_note(
    build_id: &str,
    target: ApprovalTarget,
    approver_id: &str,
    approver_name: &str,
    approver_role: ApproverRole,
    approved_at: u64,
) -> ManagerNote {
    ManagerNote {
        build_id: build_id.to_string(),
        target,
        category: APPROVAL_CATEGORY.to_string(),
        stamp: Some(ApprovalStamp {
            approver_id: approver_id.to_string(),
            approver_name: approver_name.to_string(),
            approver_role,
            approved_at,
        }),
        text: None,
    }
}

/// Whether filing a new proposal against `target` should first surface
/// the counter-proposal confirmation gate: the target is currently approval-stamped, and
/// by a role other than the new proposer's.
pub fn requires_counter_proposal_confirmation(
    proposer_role: ProposerRole,
    target: &ApprovalTarget,
    existing_notes: &[ManagerNote],
) -> bool {
    let proposer_role: ApproverRole = proposer_role.into();
    existing_notes.iter().any(|n| {
        n.category == APPROVAL_CATEGORY
            && &n.target == target
            && n.stamp.as_ref().map(|s| s.approver_role != proposer_role).unwrap_or(false)
    })
}

/// Undo an FLM-team approval stamp, cascading into every rep-book
/// stamp for reps reporting to that FLM within `snapshot`.
pub fn undo_flm_team_stamp<S: Store>(store: &mut S, snapshot: &Snapshot, build_id: &str, flm: &str) -> Result<(), StoreError> {
    store.delete_note(build_id, &ApprovalTarget::FlmTeam(flm.to_string()), APPROVAL_CATEGORY)?;

    let reps_under_flm: Vec<String> = snapshot
        .reps
        .values()
        .filter(|r| r.flm.as_deref() == Some(flm))
        .map(|r| r.rep_id.clone())
        .collect();

    for rep_id in reps_under_flm {
        store.delete_note(build_id, &ApprovalTarget::RepBook(rep_id), APPROVAL_CATEGORY)?;
    }

    Ok(())
}
