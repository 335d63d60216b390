//! Snapshot Loader entry point.
//!
//! `load` takes the raw rows the Store hands back and produces an
//! immutable, internally consistent `Snapshot`, performing every
//! derivation this entails: parent/child classification,
//! customer/prospect propagation, per-account ATR (with
//! `calculated_atr` fallback), fiscal-quarter derivation, and legacy
//! configuration field mapping. Validation failures are accumulated
//! and returned together as `EngineError::InvalidSnapshot`, never
//! short-circuited on the first one found.

use std::collections::BTreeMap;

use crate::error::{EngineError, ValidationIssue};
use crate::model::{Account, BuildId, Configuration, FiscalQuarter, Opportunity, Rep};
use crate::snapshot::hierarchy::{classify_customer_prospect, resolve_hierarchy};
use crate::snapshot::totals::PopulationTotals;
use crate::snapshot::Snapshot;

/// The raw rows a `Store` implementation hands back for a build,
/// before any derivation has run.
#[derive(Debug, Clone)]
pub struct RawSnapshotData {
    pub build_id: BuildId,
    pub accounts: Vec<Account>,
    pub reps: Vec<Rep>,
    pub opportunities: Vec<Opportunity>,
    pub config: Configuration,
}

/// Build an immutable `Snapshot` from raw Store rows.
pub fn load(mut raw: RawSnapshotData) -> Result<Snapshot, EngineError> {
    let mut issues = Vec::new();

    normalize_legacy_config(&mut raw.config);

    let mut accounts: BTreeMap<String, Account> =
        raw.accounts.into_iter().map(|a| (a.account_id.clone(), a)).collect();

    for rep in &raw.reps {
        if rep.has_ambiguous_backfill_flags() {
            issues.push(ValidationIssue {
                entity: format!("rep:{}", rep.rep_id),
                detail: "rep is flagged both is_backfill_source and is_backfill_target".to_string(),
            });
        }
    }

    let mut opportunities_by_account: BTreeMap<String, Vec<Opportunity>> = BTreeMap::new();
    for opp in raw.opportunities {
        if !accounts.contains_key(&opp.account_id) {
            issues.push(ValidationIssue {
                entity: format!("opportunity:{}", opp.opportunity_id),
                detail: format!("references unknown account_id '{}'", opp.account_id),
            });
            continue;
        }
        opportunities_by_account.entry(opp.account_id.clone()).or_default().push(opp);
    }

    for account in accounts.values() {
        if let Some(owner) = &account.owner_id {
            if !owner.is_empty() && !raw.reps.iter().any(|r| &r.rep_id == owner) {
                issues.push(ValidationIssue {
                    entity: format!("account:{}", account.account_id),
                    detail: format!("owner_id '{owner}' does not reference a rep in the snapshot"),
                });
            }
        }
    }

    if !issues.is_empty() {
        return Err(EngineError::InvalidSnapshot(issues));
    }

    let hierarchy = resolve_hierarchy(&mut accounts);
    classify_customer_prospect(&mut accounts, &hierarchy.children_of);

    compute_atr_and_fiscal_quarter(&mut accounts, &opportunities_by_account);

    let mut population_totals = PopulationTotals::default();
    for account in accounts.values() {
        let prospect_net_arr: i64 = opportunities_by_account
            .get(&account.account_id)
            .map(|opps| opps.iter().map(|o| o.net_arr).sum())
            .unwrap_or(0);
        population_totals.accumulate(account, prospect_net_arr);
    }

    let reps: BTreeMap<String, Rep> = raw.reps.into_iter().map(|r| (r.rep_id.clone(), r)).collect();

    Ok(Snapshot {
        build_id: raw.build_id,
        accounts,
        reps,
        opportunities_by_account,
        config: raw.config,
        children_of: hierarchy.children_of,
        virtual_parent_groups: hierarchy.virtual_parent_groups,
        population_totals,
        warnings: hierarchy.warnings,
    })
}

/// Per-account ATR is `Σ available_to_renew` over opportunities whose
/// type normalizes to `renewals`, restricted to customer parent
/// accounts; when that sum is zero, `calculated_atr` is used as
/// fallback. Fiscal quarter is derived from the earliest
/// ATR-bearing renewal opportunity's `renewal_event_date`.
fn compute_atr_and_fiscal_quarter(
    accounts: &mut BTreeMap<String, Account>,
    opportunities_by_account: &BTreeMap<String, Vec<Opportunity>>,
) {
    let ids: Vec<String> = accounts.keys().cloned().collect();
    for id in ids {
        let is_customer_parent = accounts.get(&id).map(|a| a.is_customer && a.is_parent()).unwrap_or(false);
        if !is_customer_parent {
            continue;
        }

        let opps = match opportunities_by_account.get(&id) {
            Some(o) => o,
            None => continue,
        };

        let renewal_opps: Vec<&Opportunity> = opps.iter().filter(|o| o.is_renewal_type()).collect();
        let atr_sum: i64 = renewal_opps.iter().map(|o| o.available_to_renew).sum();

        let account = accounts.get_mut(&id).unwrap();
        if atr_sum > 0 {
            account.atr = atr_sum;
        } else {
            account.atr = account.calculated_atr;
        }

        if let Some(earliest) = renewal_opps
            .iter()
            .filter_map(|o| o.renewal_event_date.as_deref())
            .filter_map(parse_month)
            .min()
        {
            account.renewal_quarter = Some(FiscalQuarter::from_month(earliest));
        }
    }
}

/// Extract the calendar month (1-12) from an ISO-8601-ish date string
/// (`YYYY-MM-DD`). Returns `None` on anything unparseable rather than
/// failing the load — a malformed date degrades the renewal-quarter
/// derivation, it does not invalidate the snapshot.
fn parse_month(date: &str) -> Option<u32> {
    let parts: Vec<&str> = date.split('-').collect();
    let month_str = parts.get(1)?;
    month_str.parse::<u32>().ok().filter(|m| (1..=12).contains(m))
}

/// Legacy field mapping happens here, and only here: `atr_target` maps to
/// `customer_target_atr` when the canonical field was not itself
/// supplied with a non-zero value.
fn normalize_legacy_config(config: &mut Configuration) {
    if config.customer_target_atr == 0 {
        if let Some(legacy) = config.atr_target {
            config.customer_target_atr = legacy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BalanceIntensity, OptimizationModel};
    use std::collections::HashMap;

    fn minimal_config() -> Configuration {
        Configuration {
            customer_target_arr: 0,
            customer_min_arr: 0,
            customer_max_arr: 0,
            capacity_variance_percent: 0.15,
            customer_target_atr: 0,
            customer_min_atr: 0,
            customer_max_atr: 0,
            atr_variance: 0.15,
            atr_target: None,
            prospect_target_arr: 0,
            prospect_min_arr: 0,
            prospect_max_arr: 0,
            prospect_variance_percent: 0.15,
            max_cre_per_rep: 10,
            renewal_concentration_max: 0.4,
            territory_mappings: HashMap::new(),
            optimization_model: OptimizationModel::Waterfall,
            balance_intensity: BalanceIntensity::Normal,
            assignment_mode: "Custom".to_string(),
            priority_config: vec![],
            is_custom_priority: true,
            rs_arr_threshold: 5_000,
            overrides: HashMap::new(),
            relaxed_solver_enabled: true,
            wall_clock_budget_ms: 60_000,
        }
    }

    fn account(id: &str, parent: Option<&str>, arr: i64, owner: Option<&str>) -> Account {
        Account {
            account_id: id.to_string(),
            display_name: id.to_string(),
            ultimate_parent_id: parent.map(|p| p.to_string()),
            arr,
            atr: 0,
            calculated_arr: 0,
            calculated_atr: 0,
            hierarchy_bookings_arr: 0,
            expansion_tier: None,
            initial_sale_tier: None,
            sales_territory: None,
            geo: None,
            hq_country: None,
            renewal_quarter: None,
            cre_count: 0,
            cre_risk: None,
            risk_flag: false,
            cre_status: None,
            owner_id: owner.map(|o| o.to_string()),
            owner_name: None,
            new_owner_id: None,
            new_owner_name: None,
            is_strategic: false,
            is_manual_holdover: false,
            strategic_rep_id: None,
            is_customer: false,
            has_split_ownership: false,
            is_virtual_parent: false,
        }
    }

    fn rep(id: &str) -> Rep {
        Rep {
            rep_id: id.to_string(),
            name: id.to_string(),
            team: None,
            flm: None,
            slm: None,
            region: Some("AMER".to_string()),
            is_active: true,
            include_in_assignments: true,
            is_strategic_rep: false,
            is_backfill_source: false,
            is_backfill_target: false,
            is_placeholder: false,
        }
    }

    #[test]
    fn legacy_atr_target_maps_to_canonical_field_when_canonical_is_unset() {
        let mut config = minimal_config();
        config.atr_target = Some(42_000);
        normalize_legacy_config(&mut config);
        assert_eq!(config.customer_target_atr, 42_000);
    }

    #[test]
    fn canonical_field_wins_over_legacy_when_both_are_set() {
        let mut config = minimal_config();
        config.customer_target_atr = 10_000;
        config.atr_target = Some(42_000);
        normalize_legacy_config(&mut config);
        assert_eq!(config.customer_target_atr, 10_000);
    }

    #[test]
    fn load_rejects_an_account_owned_by_an_unknown_rep() {
        let raw = RawSnapshotData {
            build_id: "B1".to_string(),
            accounts: vec![account("A1", None, 100, Some("GHOST"))],
            reps: vec![],
            opportunities: vec![],
            config: minimal_config(),
        };
        let result = load(raw);
        assert!(matches!(result, Err(EngineError::InvalidSnapshot(_))));
    }

    #[test]
    fn load_accumulates_multiple_issues_in_one_pass() {
        let raw = RawSnapshotData {
            build_id: "B1".to_string(),
            accounts: vec![account("A1", None, 100, Some("GHOST1")), account("A2", None, 50, Some("GHOST2"))],
            reps: vec![],
            opportunities: vec![],
            config: minimal_config(),
        };
        match load(raw) {
            Err(EngineError::InvalidSnapshot(issues)) => assert_eq!(issues.len(), 2),
            other => panic!("expected InvalidSnapshot with 2 issues, got {other:?}"),
        }
    }

    #[test]
    fn load_succeeds_and_derives_customer_classification() {
        let raw = RawSnapshotData {
            build_id: "B1".to_string(),
            accounts: vec![account("A1", None, 100, Some("R1"))],
            reps: vec![rep("R1")],
            opportunities: vec![],
            config: minimal_config(),
        };
        let snapshot = load(raw).unwrap();
        assert!(snapshot.accounts["A1"].is_customer);
    }
}
