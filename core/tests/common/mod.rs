//! Shared fixture builders for the integration test suite. Every
//! field defaults to a neutral, zeroed value; each test overrides only
//! what its scenario cares about.

#![allow(dead_code)]

use std::collections::HashMap;

use territory_assignment_core::model::{
    Account, BalanceIntensity, Configuration, Opportunity, OptimizationModel, PriorityConfigEntry, Rep,
};
use territory_assignment_core::snapshot::loader::RawSnapshotData;

pub fn config() -> Configuration {
    Configuration {
        customer_target_arr: 0,
        customer_min_arr: 0,
        customer_max_arr: 0,
        capacity_variance_percent: 0.2,
        customer_target_atr: 0,
        customer_min_atr: 0,
        customer_max_atr: 0,
        atr_variance: 0.2,
        atr_target: None,
        prospect_target_arr: 0,
        prospect_min_arr: 0,
        prospect_max_arr: 0,
        prospect_variance_percent: 0.2,
        max_cre_per_rep: 100,
        renewal_concentration_max: 0.0,
        territory_mappings: HashMap::new(),
        optimization_model: OptimizationModel::Waterfall,
        balance_intensity: BalanceIntensity::Normal,
        assignment_mode: "Default".to_string(),
        priority_config: full_waterfall(),
        is_custom_priority: false,
        rs_arr_threshold: 0,
        overrides: HashMap::new(),
        relaxed_solver_enabled: true,
        wall_clock_budget_ms: 60_000,
    }
}

/// The default catalogue order, every priority enabled.
pub fn full_waterfall() -> Vec<PriorityConfigEntry> {
    ["P0", "P1", "P2", "P3", "P4"]
        .iter()
        .map(|id| PriorityConfigEntry { priority_id: id.to_string(), enabled: true })
        .collect()
}

pub fn account(id: &str, arr: i64) -> Account {
    Account {
        account_id: id.to_string(),
        display_name: id.to_string(),
        ultimate_parent_id: None,
        arr,
        atr: 0,
        calculated_arr: 0,
        calculated_atr: 0,
        hierarchy_bookings_arr: arr,
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
        owner_id: None,
        owner_name: None,
        new_owner_id: None,
        new_owner_name: None,
        is_strategic: false,
        is_manual_holdover: false,
        strategic_rep_id: None,
        is_customer: arr > 0,
        has_split_ownership: false,
        is_virtual_parent: false,
    }
}

pub fn rep(id: &str, region: &str) -> Rep {
    Rep {
        rep_id: id.to_string(),
        name: id.to_string(),
        team: None,
        flm: None,
        slm: None,
        region: Some(region.to_string()),
        is_active: true,
        include_in_assignments: true,
        is_strategic_rep: false,
        is_backfill_source: false,
        is_backfill_target: false,
        is_placeholder: false,
    }
}

pub fn opportunity(opportunity_id: &str, account_id: &str, opportunity_type: &str, available_to_renew: i64) -> Opportunity {
    Opportunity {
        opportunity_id: opportunity_id.to_string(),
        account_id: account_id.to_string(),
        opportunity_type: opportunity_type.to_string(),
        available_to_renew,
        renewal_event_date: None,
        owner_id: None,
        new_owner_id: None,
        cre_status: None,
        net_arr: 0,
    }
}

pub fn raw(build_id: &str, accounts: Vec<Account>, reps: Vec<Rep>, opportunities: Vec<Opportunity>, config: Configuration) -> RawSnapshotData {
    RawSnapshotData {
        build_id: build_id.to_string(),
        accounts,
        reps,
        opportunities,
        config,
    }
}
