//! C3 — Priority Engine.
//!
//! Walks every parent account — `Snapshot::parent_accounts()`, in the
//! snapshot's stable `BTreeMap` key order — through the Sales-Tools
//! gate and then the effective priority waterfall, accumulating each
//! rep's running load as assignments are made so later accounts see
//! the effect of earlier ones within the same run. Real child accounts
//! are never independently balanced: exactly one proposal exists per
//! parent account. Orphan children (their pointed-at parent absent
//! from the snapshot) get a display-only proposal instead, routed
//! through neither the waterfall nor the rep-load accumulation. A rule
//! that finds no eligible candidate falls through to the next enabled
//! priority; a rule that produces no candidate at all after the full
//! waterfall is a Capacity-Overflow, logged as a conflict and resolved
//! by a best-effort, cap-ignoring placement.

use std::collections::BTreeMap;

use crate::calibrator::{CalibratedBands, Dimension};
use crate::model::{Account, AssignmentProposal, Confidence, RuleApplied, Warning};
use crate::priority::catalogue::{effective_waterfall, EngineContext};
use crate::priority::distance::{breaches_hard_cap, RepLoad};
use crate::snapshot::Snapshot;

/// A single account for which no enabled priority admitted a
/// candidate under hard caps. The engine still produces a proposal
/// (best-effort, caps ignored) but records the breach here for the
/// run's conflict log.
#[derive(Debug, Clone)]
pub struct CapacityOverflow {
    pub account_id: String,
    pub dimension: Option<Dimension>,
    pub detail: String,
}

/// Result of a full priority-engine pass.
pub struct EngineOutput {
    pub proposals: BTreeMap<String, AssignmentProposal>,
    pub overflows: Vec<CapacityOverflow>,
    /// Final per-rep running loads, handed to the Balance Optimizer as
    /// its starting point.
    pub rep_loads: BTreeMap<String, RepLoad>,
}

/// Run the full waterfall over every parent account in `snapshot`.
pub fn run(snapshot: &Snapshot, bands: &CalibratedBands) -> EngineOutput {
    let waterfall = effective_waterfall(&snapshot.config.priority_config);
    let arr_hard_capped = snapshot.config.customer_max_arr > 0;
    let mut rep_loads: BTreeMap<String, RepLoad> = BTreeMap::new();
    let mut proposals = BTreeMap::new();
    let mut overflows = Vec::new();

    for account in snapshot.parent_accounts() {
        if account.is_sales_tools_candidate(snapshot.config.rs_arr_threshold) {
            proposals.insert(account.account_id.clone(), sales_tools_proposal(account));
            continue;
        }

        let ctx = EngineContext {
            snapshot,
            bands,
            rep_loads: &rep_loads,
            model: snapshot.config.optimization_model,
            intensity: snapshot.config.balance_intensity,
        };

        let mut chosen: Option<(String, RuleApplied)> = None;
        for rule in &waterfall {
            if !rule.is_applicable(account, &ctx) {
                continue;
            }
            if let Some(rep_id) = rule.choose(account, &ctx) {
                chosen = Some((rep_id, rule.id()));
                break;
            }
        }

        let (rep_id, rule_applied, is_overflow) = match chosen {
            Some((rep_id, rule_applied)) => (rep_id, rule_applied, false),
            None => {
                let delta = account_delta(account);
                let best = best_effort_candidate(&ctx, account);
                match best {
                    Some(rep_id) => {
                        let load = rep_loads.get(&rep_id).copied().unwrap_or_default();
                        let dim = breaches_hard_cap(&load, &delta, bands, arr_hard_capped);
                        overflows.push(CapacityOverflow {
                            account_id: account.account_id.clone(),
                            dimension: dim,
                            detail: format!(
                                "no enabled priority admitted account {} under configured caps",
                                account.account_id
                            ),
                        });
                        (rep_id, RuleApplied::CapacityOverflow, true)
                    }
                    None => {
                        overflows.push(CapacityOverflow {
                            account_id: account.account_id.clone(),
                            dimension: None,
                            detail: format!("no assignable rep exists for account {}", account.account_id),
                        });
                        proposals.insert(
                            account.account_id.clone(),
                            unassignable_proposal(account),
                        );
                        continue;
                    }
                }
            }
        };

        let rep = snapshot.rep(&rep_id);
        let delta = account_delta(account);
        let entry = rep_loads.entry(rep_id.clone()).or_default();
        *entry = add_load(*entry, delta);
        let updated_load = rep_loads.get(&rep_id).copied().unwrap_or_default();

        let warnings = assess_warnings(account, rule_applied, is_overflow, &ctx, rep, &updated_load, bands);
        let confidence = AssignmentProposal::grade_confidence(&warnings);

        proposals.insert(
            account.account_id.clone(),
            AssignmentProposal {
                account_id: account.account_id.clone(),
                current_owner_id: account.owner_id.clone(),
                current_owner_name: account.owner_name.clone(),
                proposed_owner_id: Some(rep_id),
                proposed_owner_name: rep.map(|r| r.name.clone()),
                rule_applied,
                confidence,
                assignment_reason: reason_for(rule_applied),
                warning_details: warnings.iter().map(|w| w.describe().to_string()).collect(),
            },
        );
    }

    for orphan_id in snapshot.virtual_parent_groups.values().flatten() {
        if let Some(account) = snapshot.account(orphan_id) {
            proposals.insert(account.account_id.clone(), virtual_parent_display_proposal(account));
        }
    }

    EngineOutput { proposals, overflows, rep_loads }
}

/// An orphan child (its `ultimate_parent_id` does not resolve to any
/// account in this snapshot) is excluded from balance math entirely —
/// it keeps its existing owner for display and never enters the
/// waterfall or the rep-load totals.
fn virtual_parent_display_proposal(account: &Account) -> AssignmentProposal {
    AssignmentProposal {
        account_id: account.account_id.clone(),
        current_owner_id: account.owner_id.clone(),
        current_owner_name: account.owner_name.clone(),
        proposed_owner_id: account.owner_id.clone(),
        proposed_owner_name: account.owner_name.clone(),
        rule_applied: RuleApplied::VirtualParentDisplay,
        confidence: Confidence::Medium,
        assignment_reason: reason_for(RuleApplied::VirtualParentDisplay),
        warning_details: vec![Warning::OrphanParentMissing.describe().to_string()],
    }
}

fn sales_tools_proposal(account: &Account) -> AssignmentProposal {
    AssignmentProposal {
        account_id: account.account_id.clone(),
        current_owner_id: account.owner_id.clone(),
        current_owner_name: account.owner_name.clone(),
        proposed_owner_id: None,
        proposed_owner_name: None,
        rule_applied: RuleApplied::SalesToolsBucket,
        confidence: Confidence::High,
        assignment_reason: reason_for(RuleApplied::SalesToolsBucket),
        warning_details: Vec::new(),
    }
}

fn unassignable_proposal(account: &Account) -> AssignmentProposal {
    AssignmentProposal {
        account_id: account.account_id.clone(),
        current_owner_id: account.owner_id.clone(),
        current_owner_name: account.owner_name.clone(),
        proposed_owner_id: None,
        proposed_owner_name: None,
        rule_applied: RuleApplied::CapacityOverflow,
        confidence: Confidence::Low,
        assignment_reason: reason_for(RuleApplied::CapacityOverflow),
        warning_details: vec![Warning::CapacityExceededOverridden.describe().to_string()],
    }
}

fn reason_for(rule: RuleApplied) -> String {
    match rule {
        RuleApplied::Protected => "strategic or manual-holdover account routed to its designated rep".to_string(),
        RuleApplied::ContinuityGeo => "prior owner retained; region matches the account's mapped region".to_string(),
        RuleApplied::Geography => "assigned to the closest-to-target rep in the account's mapped region".to_string(),
        RuleApplied::Continuity => "prior owner retained outside their mapped region".to_string(),
        RuleApplied::ResidualBalance => "assigned to the closest-to-target eligible rep".to_string(),
        RuleApplied::SalesToolsBucket => "ARR below the sales-tools threshold".to_string(),
        RuleApplied::CapacityOverflow => "no enabled priority admitted this account under configured caps".to_string(),
        RuleApplied::VirtualParentDisplay => {
            "ultimate parent account absent from this snapshot; kept with its existing owner for display only"
                .to_string()
        }
    }
}

fn account_delta(account: &Account) -> RepLoad {
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

/// Best-effort placement once every enabled priority has failed to
/// admit an account under hard caps: rank every assignable rep by
/// distance-to-target alone, ignoring caps entirely.
fn best_effort_candidate(ctx: &EngineContext, account: &Account) -> Option<String> {
    let candidates: Vec<String> = ctx
        .snapshot
        .assignable_reps()
        .map(|r| r.rep_id.clone())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let delta = account_delta(account);
    let mut best: Option<(f64, &str)> = None;
    for rep_id in &candidates {
        let load = ctx.rep_loads.get(rep_id).copied().unwrap_or_default();
        let d = crate::priority::distance::distance_to_target(&load, &delta, ctx.bands, ctx.model, ctx.intensity);
        if best.map(|(bd, _)| d < bd).unwrap_or(true) {
            best = Some((d, rep_id));
        }
    }
    best.map(|(_, rep_id)| rep_id.to_string())
}

fn assess_warnings(
    account: &Account,
    rule: RuleApplied,
    is_overflow: bool,
    ctx: &EngineContext,
    rep: Option<&crate::model::Rep>,
    updated_load: &RepLoad,
    bands: &CalibratedBands,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if is_overflow {
        warnings.push(Warning::CapacityExceededOverridden);
    }

    if rule == RuleApplied::Protected {
        let expected = account.strategic_rep_id.as_deref();
        let actual = rep.map(|r| r.rep_id.as_str());
        if expected.is_some() && expected != actual {
            warnings.push(Warning::ProtectedRuleViolated);
        }
    }

    if matches!(rule, RuleApplied::Continuity | RuleApplied::ResidualBalance) {
        if let (Some(mapped), Some(rep)) = (ctx.mapped_region(account), rep) {
            if rep.region.as_deref() != Some(mapped) {
                warnings.push(Warning::GeoMismatch);
            }
        }
    }

    if account.is_customer {
        if let Some(owner) = &account.owner_id {
            if rep.map(|r| r.rep_id.as_str()) != Some(owner.as_str()) {
                warnings.push(Warning::ChangingCurrentCustomerOwner);
            }
        }
    }

    let tier1_bands = bands.get(Dimension::Tier1);
    if !tier1_bands.is_disabled() && updated_load.tier1 as f64 >= tier1_bands.max * 0.9 {
        warnings.push(Warning::TierConcentration);
    }
    let tier2_bands = bands.get(Dimension::Tier2);
    if !tier2_bands.is_disabled() && updated_load.tier2 as f64 >= tier2_bands.max * 0.9 {
        warnings.push(Warning::TierConcentration);
    }

    if bands.renewal_concentration_ceiling > 0.0 {
        let total_renewals = updated_load.q1_renewals
            + updated_load.q2_renewals
            + updated_load.q3_renewals
            + updated_load.q4_renewals;
        if total_renewals > 0 {
            let max_quarter = updated_load
                .q1_renewals
                .max(updated_load.q2_renewals)
                .max(updated_load.q3_renewals)
                .max(updated_load.q4_renewals);
            let share = max_quarter as f64 / total_renewals as f64;
            if share >= bands.renewal_concentration_ceiling * 0.9 {
                warnings.push(Warning::RenewalConcentrationNearCeiling);
            }
        }
    }

    warnings.dedup();
    warnings
}
