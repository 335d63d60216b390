//! RevOps direct-assignment supersession.
//!
//! When RevOps directly assigns an account (an `approved` reassignment
//! created outside the standard FLM/SLM flow), every other non-terminal
//! proposal for the same `(account_id, build_id)` is rejected with a
//! fixed rationale and its proposer notified. The reject is atomic at
//! the Store layer (`bulk_reject_reassignments`); notification is
//! best-effort and never rolls back the reject.

use crate::store::{Notifier, Store, StoreError};

/// A proposer whose now-superseded proposal needs notifying. The Store
/// trait exposes no "list reassignments for an account" read, so the
/// caller (which already holds the proposal list it is about to
/// supersede) supplies this directly.
pub struct SupersededProposer {
    pub user_id: String,
    pub account_name: String,
}

/// Reject every other non-terminal proposal for `account_id` in
/// `build_id`, excluding `exclude_id` (the new RevOps-approved
/// reassignment), and notify each affected proposer.
///
/// Returns the number of proposals rejected.
pub fn apply_revops_direct_assignment<S: Store, N: Notifier>(
    store: &mut S,
    notifier: &mut N,
    build_id: &str,
    account_id: &str,
    exclude_id: &str,
    actor_name: &str,
    affected_proposers: &[SupersededProposer],
) -> Result<usize, StoreError> {
    let rationale = format!("Superseded: RevOps directly assigned this account to {actor_name}");
    let count = store.bulk_reject_reassignments(build_id, account_id, exclude_id, actor_name, &rationale)?;

    for proposer in affected_proposers {
        notifier.notify_superseded(&proposer.user_id, &proposer.account_name, actor_name);
    }

    Ok(count)
}
