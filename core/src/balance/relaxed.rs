//! Balance Optimizer — relaxed mode.
//!
//! The full constraint system (`x[a,r] ∈ {0,1}`, one rep per account,
//! hard per-dimension caps, a weighted-distance-plus-continuity-bonus
//! objective) is solved here as an LP-relaxation-with-rounding stand-in:
//! a deterministic local search that repeatedly looks for the single
//! reassignment move with the steepest objective improvement and
//! applies it, same as a rounded relaxation would converge toward,
//! without requiring an external MILP dependency. P0/Protected and
//! P1/Continuity+Geo assignments are admitted as fixed, exactly as the
//! constraint system requires.
//!
//! Deterministic under equal weights: every candidate move is scored
//! by a pure function of the current state, ties broken by account id
//! then rep id, both drawn from `BTreeMap` iteration order.

use std::collections::BTreeMap;

use crate::calibrator::CalibratedBands;
use crate::error::InfeasibilityReport;
use crate::model::{AssignmentProposal, BalanceIntensity, OptimizationModel, RuleApplied};
use crate::priority::distance::{breaches_hard_cap, distance_to_target, RepLoad};
use crate::snapshot::Snapshot;

const MAX_PASSES: usize = 10_000;

/// Priority-rank continuity bonus: lower-ranked priorities contribute
/// smaller bonuses for staying put.
fn continuity_bonus(rule: RuleApplied) -> f64 {
    match rule {
        RuleApplied::Geography => 0.30,
        RuleApplied::Continuity => 0.60,
        RuleApplied::ResidualBalance => 0.10,
        RuleApplied::CapacityOverflow => 0.05,
        RuleApplied::Protected
        | RuleApplied::ContinuityGeo
        | RuleApplied::SalesToolsBucket
        | RuleApplied::VirtualParentDisplay => 0.0,
    }
}

pub struct RelaxedResult {
    pub proposals: BTreeMap<String, AssignmentProposal>,
    pub rep_loads: BTreeMap<String, RepLoad>,
    pub moves_performed: usize,
    pub infeasibility: Option<InfeasibilityReport>,
}

fn account_delta(account: &crate::model::Account) -> RepLoad {
    use crate::model::{ExpansionTier, FiscalQuarter};
    RepLoad {
        arr: account.arr,
        atr: account.atr,
        pipeline: if account.is_customer { 0 } else { account.arr },
        cre: account.cre_count,
        tier1: (account.expansion_tier == Some(ExpansionTier::Tier1)) as u32,
        tier2: (account.expansion_tier == Some(ExpansionTier::Tier2)) as u32,
        q1_renewals: (account.renewal_quarter == Some(FiscalQuarter::Q1)) as u32,
        q2_renewals: (account.renewal_quarter == Some(FiscalQuarter::Q2)) as u32,
        q3_renewals: (account.renewal_quarter == Some(FiscalQuarter::Q3)) as u32,
        q4_renewals: (account.renewal_quarter == Some(FiscalQuarter::Q4)) as u32,
        customer_count: account.is_customer as u32,
    }
}

fn add_load(a: RepLoad, b: RepLoad) -> RepLoad {
    RepLoad {
        arr: a.arr + b.arr,
        atr: a.atr + b.atr,
        pipeline: a.pipeline + b.pipeline,
        cre: a.cre + b.cre,
        tier1: a.tier1 + b.tier1,
        tier2: a.tier2 + b.tier2,
        q1_renewals: a.q1_renewals + b.q1_renewals,
        q2_renewals: a.q2_renewals + b.q2_renewals,
        q3_renewals: a.q3_renewals + b.q3_renewals,
        q4_renewals: a.q4_renewals + b.q4_renewals,
        customer_count: a.customer_count + b.customer_count,
    }
}

fn subtract_load(a: RepLoad, b: RepLoad) -> RepLoad {
    RepLoad {
        arr: a.arr - b.arr,
        atr: a.atr - b.atr,
        pipeline: a.pipeline - b.pipeline,
        cre: a.cre.saturating_sub(b.cre),
        tier1: a.tier1.saturating_sub(b.tier1),
        tier2: a.tier2.saturating_sub(b.tier2),
        q1_renewals: a.q1_renewals.saturating_sub(b.q1_renewals),
        q2_renewals: a.q2_renewals.saturating_sub(b.q2_renewals),
        q3_renewals: a.q3_renewals.saturating_sub(b.q3_renewals),
        q4_renewals: a.q4_renewals.saturating_sub(b.q4_renewals),
        customer_count: a.customer_count.saturating_sub(b.customer_count),
    }
}

/// Per-rep weighted distance, used as the objective's balance term.
fn rep_objective(load: &RepLoad, bands: &CalibratedBands, intensity: BalanceIntensity) -> f64 {
    distance_to_target(load, &RepLoad::default(), bands, OptimizationModel::Relaxed, intensity)
}

fn global_objective(
    rep_loads: &BTreeMap<String, RepLoad>,
    snapshot: &Snapshot,
    bands: &CalibratedBands,
    proposals: &BTreeMap<String, AssignmentProposal>,
) -> f64 {
    let intensity = snapshot.config.balance_intensity;
    let balance_term: f64 = rep_loads
        .iter()
        .filter(|(rep_id, _)| snapshot.rep(rep_id).map(|r| !r.is_strategic_rep).unwrap_or(false))
        .map(|(_, load)| rep_objective(load, bands, intensity))
        .sum();

    let continuity_term: f64 = proposals
        .values()
        .filter_map(|p| {
            let account = snapshot.account(&p.account_id)?;
            let owner = account.owner_id.as_deref()?;
            let proposed = p.proposed_owner_id.as_deref()?;
            if owner == proposed {
                Some(continuity_bonus(p.rule_applied))
            } else {
                Some(0.0)
            }
        })
        .sum();

    balance_term - continuity_term
}

/// Run the relaxed-mode local search. `engine_proposals`/`engine_loads`
/// are the Priority Engine's output, already honoring P0/P1 as fixed
/// (the engine never revisits them, so this pass leaves them alone by
/// construction — it only ever moves accounts whose `rule_applied` is
/// not `Protected` or `ContinuityGeo`).
pub fn optimize(
    snapshot: &Snapshot,
    bands: &CalibratedBands,
    mut proposals: BTreeMap<String, AssignmentProposal>,
    mut rep_loads: BTreeMap<String, RepLoad>,
) -> RelaxedResult {
    let mut moves_performed = 0;
    let mut infeasibility = None;
    let arr_hard_capped = snapshot.config.customer_max_arr > 0;

    for _ in 0..MAX_PASSES {
        let current_objective = global_objective(&rep_loads, snapshot, bands, &proposals);

        let movable: Vec<String> = proposals
            .values()
            .filter(|p| {
                !matches!(
                    p.rule_applied,
                    RuleApplied::Protected
                        | RuleApplied::ContinuityGeo
                        | RuleApplied::SalesToolsBucket
                        | RuleApplied::VirtualParentDisplay
                ) && p.proposed_owner_id.is_some()
            })
            .map(|p| p.account_id.clone())
            .collect();

        let mut best_move: Option<(String, String, f64)> = None;

        for account_id in &movable {
            let proposal = &proposals[account_id];
            let current_rep = match &proposal.proposed_owner_id {
                Some(r) => r.clone(),
                None => continue,
            };
            let account = match snapshot.account(account_id) {
                Some(a) => a,
                None => continue,
            };
            let delta = account_delta(account);
            let current_load = rep_loads.get(&current_rep).copied().unwrap_or_default();

            let mut receivers: Vec<String> =
                snapshot.assignable_reps().map(|r| r.rep_id.clone()).filter(|id| id != &current_rep).collect();
            receivers.sort();

            for receiver in receivers {
                if snapshot.rep(&receiver).map(|r| r.is_strategic_rep).unwrap_or(false) {
                    continue;
                }
                let receiver_load = rep_loads.get(&receiver).copied().unwrap_or_default();
                if breaches_hard_cap(&receiver_load, &delta, bands, arr_hard_capped).is_some() {
                    continue;
                }

                let mut trial_loads = rep_loads.clone();
                trial_loads.insert(current_rep.clone(), subtract_load(current_load, delta));
                trial_loads.insert(receiver.clone(), add_load(receiver_load, delta));

                let mut trial_proposals = proposals.clone();
                if let Some(p) = trial_proposals.get_mut(account_id) {
                    p.proposed_owner_id = Some(receiver.clone());
                }

                let trial_objective = global_objective(&trial_loads, snapshot, bands, &trial_proposals);
                if trial_objective < current_objective - f64::EPSILON {
                    let improvement = current_objective - trial_objective;
                    if best_move.as_ref().map(|(_, _, best_improvement)| improvement > *best_improvement).unwrap_or(true)
                    {
                        best_move = Some((account_id.clone(), receiver, improvement));
                    }
                }
            }
        }

        match best_move {
            Some((account_id, receiver, _)) => {
                let proposal = proposals.get_mut(&account_id).unwrap();
                let old_rep = proposal.proposed_owner_id.clone().unwrap();
                let account = snapshot.account(&account_id).unwrap();
                let delta = account_delta(account);

                if let Some(load) = rep_loads.get_mut(&old_rep) {
                    *load = subtract_load(*load, delta);
                }
                let entry = rep_loads.entry(receiver.clone()).or_default();
                *entry = add_load(*entry, delta);

                proposal.proposed_owner_id = Some(receiver.clone());
                proposal.proposed_owner_name = snapshot.rep(&receiver).map(|r| r.name.clone());
                moves_performed += 1;
            }
            None => break,
        }
    }

    for (account_id, proposal) in &proposals {
        if proposal.rule_applied == RuleApplied::VirtualParentDisplay {
            continue;
        }
        let Some(rep_id) = &proposal.proposed_owner_id else { continue };
        if snapshot.rep(rep_id).map(|r| r.is_strategic_rep).unwrap_or(false) {
            continue;
        }
        let account = match snapshot.account(account_id) {
            Some(a) => a,
            None => continue,
        };
        let delta = account_delta(account);
        let own_load = rep_loads.get(rep_id.as_str()).copied().unwrap_or_default();
        let baseline = subtract_load(own_load, delta);
        if let Some(dim) = breaches_hard_cap(&baseline, &delta, bands, arr_hard_capped) {
            infeasibility.get_or_insert(InfeasibilityReport {
                dimension: format!("{dim:?}"),
                rep_id: rep_id.clone(),
                detail: format!("account {account_id} cannot be placed without breaching {dim:?}"),
            });
        }
    }

    RelaxedResult { proposals, rep_loads, moves_performed, infeasibility }
}
