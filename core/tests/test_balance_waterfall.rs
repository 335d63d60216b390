//! Black-box tests of waterfall-mode balance optimization: donation
//! from an over-target rep to an under-target one, and the exclusion
//! of P0/P1 accounts as donation sources.

mod common;

use std::collections::BTreeMap;

use territory_assignment_core::balance::waterfall::repair;
use territory_assignment_core::calibrator::{Bands, CalibratedBands};
use territory_assignment_core::model::{AssignmentProposal, Confidence, RuleApplied};
use territory_assignment_core::priority::RepLoad;
use territory_assignment_core::snapshot::loader::load;

fn proposal(account_id: &str, rep_id: &str, rule: RuleApplied) -> AssignmentProposal {
    AssignmentProposal {
        account_id: account_id.to_string(),
        current_owner_id: None,
        current_owner_name: None,
        proposed_owner_id: Some(rep_id.to_string()),
        proposed_owner_name: Some(rep_id.to_string()),
        rule_applied: rule,
        confidence: Confidence::High,
        assignment_reason: "test".to_string(),
        warning_details: vec![],
    }
}

#[test]
fn donates_the_smallest_account_from_the_over_target_rep() {
    let raw = common::raw(
        "B1",
        vec![common::account("A1", 900_000), common::account("A2", 100_000)],
        vec![common::rep("R1", "AMER"), common::rep("R2", "AMER")],
        vec![],
        common::config(),
    );
    let snapshot = load(raw).unwrap();

    let mut bands = CalibratedBands::default();
    bands.customer_arr = Bands { target: 500_000.0, min: 400_000.0, max: 2_000_000.0 };

    let mut proposals = BTreeMap::new();
    proposals.insert("A1".to_string(), proposal("A1", "R1", RuleApplied::ResidualBalance));
    proposals.insert("A2".to_string(), proposal("A2", "R1", RuleApplied::ResidualBalance));

    let mut rep_loads = BTreeMap::new();
    rep_loads.insert("R1".to_string(), RepLoad { arr: 1_000_000, ..Default::default() });
    rep_loads.insert("R2".to_string(), RepLoad::default());

    let result = repair(&snapshot, &bands, proposals, rep_loads);
    assert!(result.swaps_performed > 0);
    assert_eq!(result.proposals["A2"].proposed_owner_id.as_deref(), Some("R2"));
    assert_eq!(result.rep_loads["R1"].arr, 900_000);
    assert_eq!(result.rep_loads["R2"].arr, 100_000);
}

#[test]
fn protected_and_continuity_geo_accounts_are_never_donated() {
    let raw = common::raw(
        "B1",
        vec![common::account("A1", 900_000), common::account("A2", 100_000)],
        vec![common::rep("R1", "AMER"), common::rep("R2", "AMER")],
        vec![],
        common::config(),
    );
    let snapshot = load(raw).unwrap();

    let mut bands = CalibratedBands::default();
    bands.customer_arr = Bands { target: 500_000.0, min: 400_000.0, max: 2_000_000.0 };

    let mut proposals = BTreeMap::new();
    proposals.insert("A1".to_string(), proposal("A1", "R1", RuleApplied::Protected));
    proposals.insert("A2".to_string(), proposal("A2", "R1", RuleApplied::ContinuityGeo));

    let mut rep_loads = BTreeMap::new();
    rep_loads.insert("R1".to_string(), RepLoad { arr: 1_000_000, ..Default::default() });
    rep_loads.insert("R2".to_string(), RepLoad::default());

    let result = repair(&snapshot, &bands, proposals, rep_loads);
    assert_eq!(result.swaps_performed, 0);
    assert_eq!(result.proposals["A1"].proposed_owner_id.as_deref(), Some("R1"));
    assert_eq!(result.proposals["A2"].proposed_owner_id.as_deref(), Some("R1"));
}

#[test]
fn no_improving_swap_exists_when_every_rep_is_already_on_target() {
    let raw = common::raw(
        "B1",
        vec![common::account("A1", 500_000)],
        vec![common::rep("R1", "AMER"), common::rep("R2", "AMER")],
        vec![],
        common::config(),
    );
    let snapshot = load(raw).unwrap();

    let mut bands = CalibratedBands::default();
    bands.customer_arr = Bands { target: 500_000.0, min: 400_000.0, max: 600_000.0 };

    let mut proposals = BTreeMap::new();
    proposals.insert("A1".to_string(), proposal("A1", "R1", RuleApplied::ResidualBalance));

    let mut rep_loads = BTreeMap::new();
    rep_loads.insert("R1".to_string(), RepLoad { arr: 500_000, ..Default::default() });
    rep_loads.insert("R2".to_string(), RepLoad::default());

    let result = repair(&snapshot, &bands, proposals, rep_loads);
    assert_eq!(result.swaps_performed, 0);
}
