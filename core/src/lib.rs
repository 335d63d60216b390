//! Territory Assignment Core.
//!
//! A deterministic engine that assigns sales accounts to sales reps
//! subject to multi-dimensional balancing, geographic, continuity,
//! capacity, and policy constraints, organized around five cooperating
//! components:
//!
//! - [`snapshot`] — C1, Snapshot Loader
//! - [`calibrator`] — C2, Threshold Calibrator
//! - [`priority`] — C3, Priority Engine
//! - [`balance`] — C4, Balance Optimizer
//! - [`workflow`] — C5, Proposal Writer & Review Workflow
//!
//! [`orchestrator::run_once`] ties all five together into a single
//! engine run against a caller-supplied [`store::Store`]
//! implementation. The crate has no persistence, UI, or transport
//! layer of its own — those are external collaborators.

pub mod balance;
pub mod calibrator;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod priority;
pub mod snapshot;
pub mod store;
pub mod testutil;
pub mod workflow;

pub use error::EngineError;
pub use orchestrator::{run_once, RunOutcome};
pub use snapshot::Snapshot;
pub use store::{IdentityResolver, Notifier, ResolvedRole, Store, StoreError};
