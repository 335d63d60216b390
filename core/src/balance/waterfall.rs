//! Balance Optimizer — waterfall (greedy repair) mode.
//!
//! After the Priority Engine's ordered pass, partition accounts by the
//! priority that selected them. Within each partition, repeatedly find
//! the most-over-target rep and try donating one of its accounts
//! (ascending ARR, never a P0/P1 account) to the under-target rep that
//! minimizes post-swap distance. Accept a donation only if it strictly
//! improves the global L1 ARR deviation; stop when no partition admits
//! an improving swap.

use std::collections::BTreeMap;

use crate::calibrator::{CalibratedBands, Dimension};
use crate::model::{AssignmentProposal, RuleApplied};
use crate::priority::distance::{breaches_hard_cap, RepLoad};
use crate::snapshot::Snapshot;

/// Priorities whose accounts may be donated, in the order partitions
/// are repaired. P0 (Protected) and P1 (Continuity+Geo) are never
/// donation sources.
const DONATION_PARTITIONS: [RuleApplied; 4] = [
    RuleApplied::Geography,
    RuleApplied::Continuity,
    RuleApplied::ResidualBalance,
    RuleApplied::CapacityOverflow,
];

/// Safety bound on repair iterations; a strictly-improving acceptance
/// criterion already guarantees termination, this only protects
/// against an unforeseen floating-point cycle.
const MAX_PASSES: usize = 10_000;

pub struct WaterfallResult {
    pub proposals: BTreeMap<String, AssignmentProposal>,
    pub rep_loads: BTreeMap<String, RepLoad>,
    pub swaps_performed: usize,
}

pub fn repair(
    snapshot: &Snapshot,
    bands: &CalibratedBands,
    mut proposals: BTreeMap<String, AssignmentProposal>,
    mut rep_loads: BTreeMap<String, RepLoad>,
) -> WaterfallResult {
    let mut swaps_performed = 0;
    let arr_hard_capped = snapshot.config.customer_max_arr > 0;

    for &partition in &DONATION_PARTITIONS {
        let mut passes = 0;
        while passes < MAX_PASSES {
            passes += 1;
            if try_one_improving_swap(snapshot, bands, partition, arr_hard_capped, &mut proposals, &mut rep_loads) {
                swaps_performed += 1;
            } else {
                break;
            }
        }
    }

    WaterfallResult { proposals, rep_loads, swaps_performed }
}

fn global_arr_deviation(rep_loads: &BTreeMap<String, RepLoad>, snapshot: &Snapshot, target: f64) -> f64 {
    rep_loads
        .iter()
        .filter(|(rep_id, _)| snapshot.rep(rep_id).map(|r| !r.is_strategic_rep).unwrap_or(false))
        .map(|(_, load)| (load.arr as f64 - target).abs())
        .sum()
}

fn try_one_improving_swap(
    snapshot: &Snapshot,
    bands: &CalibratedBands,
    partition: RuleApplied,
    arr_hard_capped: bool,
    proposals: &mut BTreeMap<String, AssignmentProposal>,
    rep_loads: &mut BTreeMap<String, RepLoad>,
) -> bool {
    let target = bands.get(Dimension::CustomerArr).target;

    let mut over_target_reps: Vec<(String, f64)> = rep_loads
        .iter()
        .filter(|(rep_id, _)| snapshot.rep(rep_id.as_str()).map(|r| !r.is_strategic_rep).unwrap_or(false))
        .map(|(rep_id, load)| (rep_id.clone(), load.arr as f64 - target))
        .filter(|(_, deviation)| *deviation > 0.0)
        .collect();
    over_target_reps.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then_with(|| a.0.cmp(&b.0)));

    for (donor_rep, _) in over_target_reps {
        let mut donor_accounts: Vec<String> = proposals
            .values()
            .filter(|p| p.rule_applied == partition && p.proposed_owner_id.as_deref() == Some(donor_rep.as_str()))
            .map(|p| p.account_id.clone())
            .collect();
        donor_accounts.sort_by_key(|id| {
            snapshot.account(id).map(|a| a.arr).unwrap_or(0)
        });

        for account_id in donor_accounts {
            let account = match snapshot.account(&account_id) {
                Some(a) => a,
                None => continue,
            };
            let delta = RepLoad {
                arr: account.arr,
                atr: account.atr,
                pipeline: if account.is_customer { 0 } else { account.arr },
                cre: account.cre_count,
                tier1: (account.expansion_tier == Some(crate::model::ExpansionTier::Tier1)) as u32,
                tier2: (account.expansion_tier == Some(crate::model::ExpansionTier::Tier2)) as u32,
                q1_renewals: (account.renewal_quarter == Some(crate::model::FiscalQuarter::Q1)) as u32,
                q2_renewals: (account.renewal_quarter == Some(crate::model::FiscalQuarter::Q2)) as u32,
                q3_renewals: (account.renewal_quarter == Some(crate::model::FiscalQuarter::Q3)) as u32,
                q4_renewals: (account.renewal_quarter == Some(crate::model::FiscalQuarter::Q4)) as u32,
                customer_count: account.is_customer as u32,
            };

            let donor_load = rep_loads.get(&donor_rep).copied().unwrap_or_default();
            let current_total = global_arr_deviation(rep_loads, snapshot, target);

            let mut best: Option<(String, f64)> = None;
            let mut receiver_ids: Vec<String> =
                snapshot.assignable_reps().map(|r| r.rep_id.clone()).filter(|id| id != &donor_rep).collect();
            receiver_ids.sort();

            for receiver in receiver_ids {
                if snapshot.rep(&receiver).map(|r| r.is_strategic_rep).unwrap_or(false) {
                    continue;
                }
                let receiver_load = rep_loads.get(&receiver).copied().unwrap_or_default();
                if breaches_hard_cap(&receiver_load, &delta, bands, arr_hard_capped).is_some() {
                    continue;
                }
                let new_donor_arr = (donor_load.arr - delta.arr) as f64;
                let new_receiver_arr = (receiver_load.arr + delta.arr) as f64;
                let new_total = current_total
                    - (donor_load.arr as f64 - target).abs()
                    - (receiver_load.arr as f64 - target).abs()
                    + (new_donor_arr - target).abs()
                    + (new_receiver_arr - target).abs();
                if new_total < current_total - f64::EPSILON {
                    if best.as_ref().map(|(_, bd)| new_total < *bd).unwrap_or(true) {
                        best = Some((receiver, new_total));
                    }
                }
            }

            if let Some((receiver, _)) = best {
                apply_swap(snapshot, proposals, rep_loads, &account_id, &donor_rep, &receiver, delta);
                return true;
            }
        }
    }

    false
}

fn apply_swap(
    snapshot: &Snapshot,
    proposals: &mut BTreeMap<String, AssignmentProposal>,
    rep_loads: &mut BTreeMap<String, RepLoad>,
    account_id: &str,
    donor_rep: &str,
    receiver_rep: &str,
    delta: RepLoad,
) {
    if let Some(load) = rep_loads.get_mut(donor_rep) {
        *load = subtract_load(*load, delta);
    }
    let entry = rep_loads.entry(receiver_rep.to_string()).or_default();
    *entry = add_load(*entry, delta);

    if let Some(proposal) = proposals.get_mut(account_id) {
        proposal.proposed_owner_id = Some(receiver_rep.to_string());
        proposal.proposed_owner_name = snapshot.rep(receiver_rep).map(|r| r.name.clone());
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
