//! Domain types for the territory assignment core.
//!
//! Accounts, reps, opportunities, configuration, and the records the
//! engine produces or mediates (assignment proposals, manager
//! reassignment proposals, manager notes / approval stamps).
//!
//! CRITICAL: all currency fields are `i64` minor units (cents), never
//! floating point. Ratios, variances, and distances are `f64`.

pub mod account;
pub mod config;
pub mod note;
pub mod opportunity;
pub mod proposal;
pub mod reassignment;
pub mod rep;

pub use account::{Account, ExpansionTier, FiscalQuarter};
pub use config::{BalanceIntensity, Configuration, OptimizationModel, PriorityConfigEntry};
pub use note::{ApprovalStamp, ApprovalTarget, ApproverRole, ManagerNote};
pub use opportunity::Opportunity;
pub use proposal::{AssignmentProposal, Confidence, RuleApplied};
pub use reassignment::{ApprovalStatus, ManagerReassignmentProposal, ProposerRole};
pub use rep::Rep;

/// Unique account identifier, as assigned by the upstream Store.
pub type AccountId = String;

/// Unique rep identifier, as assigned by the upstream Store.
pub type RepId = String;

/// Unique opportunity identifier.
pub type OpportunityId = String;

/// Unique identifier for a build (a run of the engine over a snapshot).
pub type BuildId = String;

/// Unique identifier for a manager reassignment proposal.
pub type ReassignmentId = String;
