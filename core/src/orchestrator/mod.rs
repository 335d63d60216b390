//! Top-level orchestration: wires C1-C5 into a single engine run
//! under one wall-clock budget, plus the structured event
//! log and the aggregate statistics persisted alongside proposals.

pub mod log;
pub mod run;
pub mod stats;

pub use log::{RunEvent, RunLog};
pub use run::{run_once, RunOutcome};
pub use stats::{Conflict, ConflictKind, RebalancingSuggestion, Rollup, RunStatistics};
