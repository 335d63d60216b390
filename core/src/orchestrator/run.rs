//! Top-level run entry point: C1 (Snapshot Loader) through C5 (Review
//! Workflow's cross-build detection), tied together under one
//! wall-clock budget.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use crate::balance;
use crate::calibrator::{self, CalibratedBands, Dimension};
use crate::error::EngineError;
use crate::model::AssignmentProposal;
use crate::orchestrator::log::{RunEvent, RunLog};
use crate::orchestrator::stats::{self, Conflict, RebalancingSuggestion, Rollup, RunStatistics};
use crate::priority::{self, RepLoad};
use crate::snapshot::loader;
use crate::snapshot::Snapshot;
use crate::store::{Notifier, Store, StoreError};
use crate::workflow::conflicts;

/// What a successful run produced: the proposals committed to the
/// Store plus the log of events emitted along the way (useful to a
/// caller for observability without a logging crate in the loop).
#[derive(Serialize)]
pub struct RunOutcome {
    pub proposals: BTreeMap<String, AssignmentProposal>,
    pub statistics: RunStatistics,
    pub conflicts: Vec<Conflict>,
    pub log: RunLog,
}

/// Run the full pipeline for `build_id` against `store`, committing
/// output through `store.write_proposals` and notifying through
/// `notifier` for anything the workflow layer surfaces.
pub fn run_once<S: Store, N: Notifier>(
    store: &mut S,
    _notifier: &mut N,
    build_id: &str,
) -> Result<RunOutcome, EngineError> {
    let start = Instant::now();
    let mut log = RunLog::new();

    let raw = store.read_snapshot(build_id).map_err(store_error_to_engine_error)?;
    let snapshot = loader::load(raw)?;
    log.push(RunEvent::SnapshotLoaded {
        build_id: snapshot.build_id.clone(),
        account_count: snapshot.accounts.len(),
        rep_count: snapshot.reps.len(),
    });
    if !snapshot.warnings.is_empty() {
        log.push(RunEvent::HierarchyWarningsFound { count: snapshot.warnings.len() });
    }
    check_budget(&snapshot, start)?;

    let bands = calibrator::calibrate(&snapshot)?;
    log.push(RunEvent::BandsCalibrated);
    check_budget(&snapshot, start)?;

    let engine_out = priority::run(&snapshot, &bands);
    log.push(RunEvent::PriorityEngineCompleted {
        proposal_count: engine_out.proposals.len(),
        overflow_count: engine_out.overflows.len(),
    });
    let overflows = engine_out.overflows;
    check_budget(&snapshot, start)?;

    let balance_out = balance::run(&snapshot, &bands, engine_out.proposals, engine_out.rep_loads);
    log.push(RunEvent::BalanceOptimizerCompleted {
        mode: if balance_out.degraded_to_waterfall { "waterfall (degraded)" } else { "configured" },
        moves_performed: balance_out.moves_performed,
    });
    if balance_out.degraded_to_waterfall {
        log.push(RunEvent::RelaxedSolverDegraded {
            reason: "relaxed_solver_enabled=false for this environment",
        });
    }
    if let Some(report) = balance_out.infeasibility {
        return Err(EngineError::InfeasibleBalance(report));
    }
    check_budget(&snapshot, start)?;

    let cross_build = conflicts::detect(store, &snapshot).map_err(store_error_to_engine_error)?;
    log.push(RunEvent::CrossBuildConflictsDetected { count: cross_build.len() });

    let conflicts_final = stats::build_conflicts(&overflows, &cross_build, &snapshot.warnings);

    let statistics = compute_statistics(
        &balance_out.proposals,
        &balance_out.rep_loads,
        &bands,
        &snapshot,
        conflicts_final.len(),
        balance_out.degraded_to_waterfall,
    );

    check_budget(&snapshot, start)?;

    store
        .write_proposals(
            build_id,
            &balance_out.proposals.values().cloned().collect::<Vec<_>>(),
            &conflicts_final,
            &statistics,
        )
        .map_err(store_error_to_engine_error)?;

    log.push(RunEvent::RunCompleted { duration_ms: start.elapsed().as_millis() as u64 });

    Ok(RunOutcome {
        proposals: balance_out.proposals,
        statistics,
        conflicts: conflicts_final,
        log,
    })
}

fn store_error_to_engine_error(e: StoreError) -> EngineError {
    EngineError::StoreUnavailable(e.to_string())
}

fn check_budget(snapshot: &Snapshot, start: Instant) -> Result<(), EngineError> {
    let budget_ms = snapshot.config.wall_clock_budget_ms;
    if start.elapsed().as_millis() as u64 > budget_ms {
        return Err(EngineError::Timeout { budget_ms });
    }
    Ok(())
}

fn compute_statistics(
    proposals: &BTreeMap<String, AssignmentProposal>,
    rep_loads: &BTreeMap<String, RepLoad>,
    bands: &CalibratedBands,
    snapshot: &Snapshot,
    conflict_count: usize,
    degraded_to_waterfall: bool,
) -> RunStatistics {
    let mut by_region: BTreeMap<String, Rollup> = BTreeMap::new();
    let mut by_rep: BTreeMap<String, Rollup> = BTreeMap::new();
    let mut unassigned = 0;

    for proposal in proposals.values() {
        let account = snapshot.account(&proposal.account_id);
        let region = account.and_then(|a| a.geo.clone()).unwrap_or_else(|| "UNKNOWN".to_string());
        let region_entry = by_region.entry(region).or_default();
        region_entry.proposal_count += 1;
        if let Some(a) = account {
            region_entry.total_arr += a.arr;
            region_entry.total_atr += a.atr;
        }

        match &proposal.proposed_owner_id {
            Some(rep_id) => {
                let rep_entry = by_rep.entry(rep_id.clone()).or_default();
                rep_entry.proposal_count += 1;
                if let Some(a) = account {
                    rep_entry.total_arr += a.arr;
                    rep_entry.total_atr += a.atr;
                }
            }
            None => unassigned += 1,
        }
    }

    let rebalance_warnings: Vec<String> = {
        let mut set: Vec<String> = proposals
            .values()
            .flat_map(|p| p.warning_details.iter().cloned())
            .collect();
        set.sort();
        set.dedup();
        set
    };

    let snapshot_warnings: Vec<String> = snapshot.warnings.iter().map(|w| w.to_string()).collect();

    RunStatistics {
        proposals: proposals.len(),
        conflicts: conflict_count,
        unassigned_accounts: unassigned,
        by_region,
        by_rep,
        rebalance_warnings,
        rebalancing_suggestions: rebalancing_suggestions(rep_loads, bands, snapshot),
        degraded_to_waterfall,
        snapshot_warnings,
    }
}

/// Supplemented feature:
/// advisory donor/receiver pairs still away from target ARR after
/// optimization, to help a reviewing manager spot what the automated
/// passes could not fully close.
fn rebalancing_suggestions(
    rep_loads: &BTreeMap<String, RepLoad>,
    bands: &CalibratedBands,
    snapshot: &Snapshot,
) -> Vec<RebalancingSuggestion> {
    let target = bands.get(Dimension::CustomerArr).target;
    if target <= 0.0 {
        return Vec::new();
    }

    let mut over: Vec<(String, f64)> = Vec::new();
    let mut under: Vec<(String, f64)> = Vec::new();

    for (rep_id, load) in rep_loads {
        if snapshot.rep(rep_id).map(|r| r.is_strategic_rep).unwrap_or(true) {
            continue;
        }
        let deviation = load.arr as f64 - target;
        if deviation > 0.0 {
            over.push((rep_id.clone(), deviation));
        } else if deviation < 0.0 {
            under.push((rep_id.clone(), -deviation));
        }
    }

    over.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));
    under.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));

    over.into_iter()
        .zip(under)
        .map(|((donor, donor_dev), (receiver, receiver_dev))| RebalancingSuggestion {
            dimension: "customer_arr".to_string(),
            donor_rep_id: donor,
            receiver_rep_id: receiver,
            magnitude: donor_dev.min(receiver_dev),
        })
        .collect()
}
