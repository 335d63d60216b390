//! C5 — Review workflow: approval state machine, supersession, and
//! cross-build conflict detection.

pub mod conflicts;
pub mod notes;
pub mod state_machine;
pub mod supersession;

pub use conflicts::{CrossBuildReassignment, CrossBuildWarning};
pub use notes::{approval_note, requires_counter_proposal_confirmation, undo_flm_team_stamp};
pub use state_machine::{submit_proposal, transition, TransitionAction};
pub use supersession::{apply_revops_direct_assignment, SupersededProposer};
