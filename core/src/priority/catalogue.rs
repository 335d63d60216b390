//! Priority catalogue.
//!
//! Each priority is a record implementing the `PriorityRule` capability
//! set: `id`, `is_applicable`, and `choose`. The Priority Engine is a
//! sequence over a `Vec<Box<dyn PriorityRule>>` built from
//! `Configuration::priority_config`, filtered to `enabled = true`, in
//! list order — no inheritance, no special-casing per rule inside the
//! engine loop.

use std::collections::BTreeMap;

use crate::calibrator::CalibratedBands;
use crate::model::{Account, OptimizationModel, RuleApplied};
use crate::priority::distance::{breaches_hard_cap, distance_to_target, RepLoad};
use crate::priority::tie_break::tie_break_rep;
use crate::snapshot::Snapshot;

/// Everything a priority rule needs to evaluate one account, bundled
/// so the trait signature stays stable as the engine evolves.
pub struct EngineContext<'a> {
    pub snapshot: &'a Snapshot,
    pub bands: &'a CalibratedBands,
    /// Running per-rep loads as the waterfall proceeds; a rule reads
    /// this to compute distance-to-target and to check hard caps
    /// against the *current* state, never a cached snapshot-start
    /// state.
    pub rep_loads: &'a BTreeMap<String, RepLoad>,
    pub model: OptimizationModel,
    pub intensity: crate::model::BalanceIntensity,
}

impl<'a> EngineContext<'a> {
    /// `territory_mappings[account.sales_territory]`, with the
    /// `not-applicable` sentinel disabling P1/P2.
    pub fn mapped_region(&self, account: &Account) -> Option<&str> {
        let territory = account.sales_territory.as_deref()?;
        let mapped = self.snapshot.config.territory_mappings.get(territory)?;
        if mapped == crate::model::config::NOT_APPLICABLE {
            None
        } else {
            Some(mapped.as_str())
        }
    }

    fn rep_is_eligible(&self, rep_id: &str, delta: &RepLoad) -> bool {
        let rep = match self.snapshot.rep(rep_id) {
            Some(r) => r,
            None => return false,
        };
        if !rep.is_assignable() {
            return false;
        }
        if rep.is_strategic_rep {
            return true;
        }
        let load = self.rep_loads.get(rep_id).copied().unwrap_or_default();
        let arr_hard_capped = self.snapshot.config.customer_max_arr > 0;
        breaches_hard_cap(&load, delta, self.bands, arr_hard_capped).is_none()
    }

    fn account_delta(&self, account: &Account) -> RepLoad {
        RepLoad {
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
        }
    }

    fn distance_for(&self, rep_id: &str, delta: &RepLoad) -> f64 {
        let load = self.rep_loads.get(rep_id).copied().unwrap_or_default();
        distance_to_target(&load, delta, self.bands, self.model, self.intensity)
    }

    /// Tie-break order for P2/P4: (1) fewer customers, (2) fewer CRE,
    /// (3) fewer Tier1, (4) stable hash of rep_id.
    fn rank_candidates(&self, candidates: &[String]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }
        let min_distance_reps: Vec<&String> = {
            let distances: Vec<(f64, &String)> = candidates
                .iter()
                .map(|r| (self.distance_for(r, &RepLoad::default()), r))
                .collect();
            let min = distances.iter().map(|(d, _)| *d).fold(f64::INFINITY, f64::min);
            distances
                .into_iter()
                .filter(|(d, _)| (*d - min).abs() < f64::EPSILON)
                .map(|(_, r)| r)
                .collect()
        };
        if min_distance_reps.len() == 1 {
            return Some(min_distance_reps[0].clone());
        }

        let fewest_customers = tie_break_by(&min_distance_reps, |r| {
            self.rep_loads.get(r).map(|l| l.customer_count).unwrap_or(0)
        });
        if fewest_customers.len() == 1 {
            return Some(fewest_customers[0].clone());
        }

        let fewest_cre = tie_break_by(&fewest_customers, |r| self.rep_loads.get(r).map(|l| l.cre).unwrap_or(0));
        if fewest_cre.len() == 1 {
            return Some(fewest_cre[0].clone());
        }

        let fewest_tier1 = tie_break_by(&fewest_cre, |r| self.rep_loads.get(r).map(|l| l.tier1).unwrap_or(0));
        if fewest_tier1.len() == 1 {
            return Some(fewest_tier1[0].clone());
        }

        tie_break_rep(&self.snapshot.build_id, fewest_tier1.iter().map(|s| s.as_str())).map(|s| s.to_string())
    }
}

fn tie_break_by<T: Ord + Copy>(candidates: &[&String], key: impl Fn(&String) -> T) -> Vec<String> {
    let min = candidates.iter().map(|r| key(r)).min().unwrap();
    candidates.iter().filter(|r| key(r) == min).map(|r| r.to_string()).collect()
}

/// The capability set every priority rule implements.
pub trait PriorityRule {
    fn id(&self) -> RuleApplied;

    /// Whether this rule even applies to the account (filter).
    fn is_applicable(&self, account: &Account, ctx: &EngineContext) -> bool;

    /// Choose a candidate rep, if one is eligible. `None` means this
    /// rule yields no candidate and the waterfall should fall through
    /// to the next enabled priority.
    fn choose(&self, account: &Account, ctx: &EngineContext) -> Option<String>;
}

/// P0 — Protected: Strategic or Manual-Holdover accounts to their
/// designated rep. Explicit config, no ranking.
pub struct ProtectedPriority;

impl PriorityRule for ProtectedPriority {
    fn id(&self) -> RuleApplied {
        RuleApplied::Protected
    }

    fn is_applicable(&self, account: &Account, _ctx: &EngineContext) -> bool {
        account.is_strategic || account.is_manual_holdover
    }

    fn choose(&self, account: &Account, ctx: &EngineContext) -> Option<String> {
        let rep_id = account.strategic_rep_id.as_ref()?;
        // Strategic reps are exempt from caps,
        // but the rep must still exist and be assignable.
        let rep = ctx.snapshot.rep(rep_id)?;
        if rep.is_assignable() {
            Some(rep_id.clone())
        } else {
            None
        }
    }
}

/// P1 — Continuity+Geo: prior owner, still eligible, whose region
/// matches the account's mapped region.
pub struct ContinuityGeoPriority;

impl PriorityRule for ContinuityGeoPriority {
    fn id(&self) -> RuleApplied {
        RuleApplied::ContinuityGeo
    }

    fn is_applicable(&self, account: &Account, ctx: &EngineContext) -> bool {
        account.owner_id.is_some() && ctx.mapped_region(account).is_some()
    }

    fn choose(&self, account: &Account, ctx: &EngineContext) -> Option<String> {
        let owner_id = account.owner_id.as_ref()?;
        let mapped_region = ctx.mapped_region(account)?;
        let rep = ctx.snapshot.rep(owner_id)?;
        let region_matches = rep.region.as_deref() == Some(mapped_region);
        if !region_matches {
            return None;
        }
        let delta = ctx.account_delta(account);
        if ctx.rep_is_eligible(owner_id, &delta) {
            Some(owner_id.clone())
        } else {
            None
        }
    }
}

/// P2 — Geography: reps in the mapped region ranked by
/// distance-to-target, with the 4-step tie-break.
pub struct GeographyPriority;

impl PriorityRule for GeographyPriority {
    fn id(&self) -> RuleApplied {
        RuleApplied::Geography
    }

    fn is_applicable(&self, account: &Account, ctx: &EngineContext) -> bool {
        ctx.mapped_region(account).is_some()
    }

    fn choose(&self, account: &Account, ctx: &EngineContext) -> Option<String> {
        let mapped_region = ctx.mapped_region(account)?.to_string();
        let delta = ctx.account_delta(account);
        let candidates: Vec<String> = ctx
            .snapshot
            .assignable_reps()
            .filter(|r| r.region.as_deref() == Some(mapped_region.as_str()))
            .filter(|r| ctx.rep_is_eligible(&r.rep_id, &delta))
            .map(|r| r.rep_id.clone())
            .collect();
        ctx.rank_candidates(&candidates)
    }
}

/// P3 — Continuity: prior owner still eligible, region disregarded.
pub struct ContinuityPriority;

impl PriorityRule for ContinuityPriority {
    fn id(&self) -> RuleApplied {
        RuleApplied::Continuity
    }

    fn is_applicable(&self, account: &Account, _ctx: &EngineContext) -> bool {
        account.owner_id.is_some()
    }

    fn choose(&self, account: &Account, ctx: &EngineContext) -> Option<String> {
        let owner_id = account.owner_id.as_ref()?;
        let delta = ctx.account_delta(account);
        if ctx.rep_is_eligible(owner_id, &delta) {
            Some(owner_id.clone())
        } else {
            None
        }
    }
}

/// P4 / RO — Residual Balance: any eligible rep minimizing
/// distance-to-target, same tie-break as P2.
pub struct ResidualBalancePriority;

impl PriorityRule for ResidualBalancePriority {
    fn id(&self) -> RuleApplied {
        RuleApplied::ResidualBalance
    }

    fn is_applicable(&self, _account: &Account, _ctx: &EngineContext) -> bool {
        true
    }

    fn choose(&self, account: &Account, ctx: &EngineContext) -> Option<String> {
        let delta = ctx.account_delta(account);
        let candidates: Vec<String> = ctx
            .snapshot
            .assignable_reps()
            .filter(|r| ctx.rep_is_eligible(&r.rep_id, &delta))
            .map(|r| r.rep_id.clone())
            .collect();
        ctx.rank_candidates(&candidates)
    }
}

/// Build the rule for a catalogue id string.
pub fn rule_for(priority_id: &str) -> Option<Box<dyn PriorityRule>> {
    match priority_id {
        "P0" => Some(Box::new(ProtectedPriority)),
        "P1" => Some(Box::new(ContinuityGeoPriority)),
        "P2" => Some(Box::new(GeographyPriority)),
        "P3" => Some(Box::new(ContinuityPriority)),
        "P4" | "RO" => Some(Box::new(ResidualBalancePriority)),
        _ => None,
    }
}

/// Build the effective waterfall from configuration: `priority_config`
/// filtered to `enabled = true`, in list order.
pub fn effective_waterfall(priority_config: &[crate::model::PriorityConfigEntry]) -> Vec<Box<dyn PriorityRule>> {
    priority_config
        .iter()
        .filter(|e| e.enabled)
        .filter_map(|e| rule_for(&e.priority_id))
        .collect()
}
