//! C4 — Balance Optimizer.
//!
//! Dispatches to `waterfall::repair` or `relaxed::optimize` depending
//! on `Configuration::optimization_model`. When relaxed mode is
//! configured but `relaxed_solver_enabled` is `false` for this
//! environment, degrades to waterfall mode and records a warning event
//! rather than failing the run.

pub mod relaxed;
pub mod waterfall;

use std::collections::BTreeMap;

use crate::calibrator::CalibratedBands;
use crate::error::InfeasibilityReport;
use crate::model::{AssignmentProposal, OptimizationModel};
use crate::priority::RepLoad;
use crate::snapshot::Snapshot;

pub struct BalanceOutput {
    pub proposals: BTreeMap<String, AssignmentProposal>,
    pub rep_loads: BTreeMap<String, RepLoad>,
    pub moves_performed: usize,
    pub infeasibility: Option<InfeasibilityReport>,
    /// Set when relaxed mode was configured but unavailable and the
    /// run degraded to waterfall mode instead.
    pub degraded_to_waterfall: bool,
}

pub fn run(
    snapshot: &Snapshot,
    bands: &CalibratedBands,
    proposals: BTreeMap<String, AssignmentProposal>,
    rep_loads: BTreeMap<String, RepLoad>,
) -> BalanceOutput {
    let wants_relaxed = snapshot.config.optimization_model == OptimizationModel::Relaxed;
    let relaxed_available = snapshot.config.relaxed_solver_enabled;

    if wants_relaxed && relaxed_available {
        let result = relaxed::optimize(snapshot, bands, proposals, rep_loads);
        return BalanceOutput {
            proposals: result.proposals,
            rep_loads: result.rep_loads,
            moves_performed: result.moves_performed,
            infeasibility: result.infeasibility,
            degraded_to_waterfall: false,
        };
    }

    let result = waterfall::repair(snapshot, bands, proposals, rep_loads);
    BalanceOutput {
        proposals: result.proposals,
        rep_loads: result.rep_loads,
        moves_performed: result.swaps_performed,
        infeasibility: None,
        degraded_to_waterfall: wants_relaxed && !relaxed_available,
    }
}
