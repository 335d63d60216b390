//! Black-box tests of threshold calibration: band computation, the
//! insufficient-reps edge case, and the monotone-bands invariant
//! (narrower variance -> narrower band width).

mod common;

use territory_assignment_core::calibrator::{calibrate, Dimension};
use territory_assignment_core::error::EngineError;
use territory_assignment_core::snapshot::loader::load;

#[test]
fn zero_calibration_reps_is_insufficient_reps() {
    let raw = common::raw("B1", vec![common::account("A1", 100)], vec![], vec![], common::config());
    let snapshot = load(raw).unwrap();
    assert!(matches!(calibrate(&snapshot), Err(EngineError::InsufficientReps)));
}

#[test]
fn placeholder_and_inactive_reps_do_not_count_toward_calibration() {
    let mut placeholder = common::rep("R1", "EMEA");
    placeholder.is_placeholder = true;
    let mut inactive = common::rep("R2", "EMEA");
    inactive.is_active = false;
    let raw = common::raw("B1", vec![common::account("A1", 100)], vec![placeholder, inactive], vec![], common::config());
    let snapshot = load(raw).unwrap();
    assert!(matches!(calibrate(&snapshot), Err(EngineError::InsufficientReps)));
}

#[test]
fn customer_arr_band_targets_total_over_calibration_population() {
    let mut cfg = common::config();
    cfg.capacity_variance_percent = 0.10;
    let accounts = vec![common::account("A1", 100_000), common::account("A2", 100_000)];
    let reps = vec![common::rep("R1", "EMEA"), common::rep("R2", "EMEA")];
    let raw = common::raw("B1", accounts, reps, vec![], cfg);
    let snapshot = load(raw).unwrap();

    let bands = calibrate(&snapshot).unwrap();
    let arr = bands.get(Dimension::CustomerArr);
    assert_eq!(arr.target, 100_000.0);
    assert!(arr.min < arr.target && arr.max > arr.target);
}

#[test]
fn narrower_variance_strictly_narrows_band_width_monotonically() {
    let accounts = vec![common::account("A1", 200_000), common::account("A2", 200_000)];
    let reps = vec![common::rep("R1", "EMEA"), common::rep("R2", "EMEA")];

    let mut wide_cfg = common::config();
    wide_cfg.capacity_variance_percent = 0.40;
    let wide = load(common::raw("B1", accounts.clone(), reps.clone(), vec![], wide_cfg)).unwrap();
    let wide_bands = calibrate(&wide).unwrap();

    let mut narrow_cfg = common::config();
    narrow_cfg.capacity_variance_percent = 0.10;
    let narrow = load(common::raw("B1", accounts, reps, vec![], narrow_cfg)).unwrap();
    let narrow_bands = calibrate(&narrow).unwrap();

    let wide_width = wide_bands.get(Dimension::CustomerArr).band_width();
    let narrow_width = narrow_bands.get(Dimension::CustomerArr).band_width();
    assert!(narrow_width < wide_width);
}

#[test]
fn explicit_override_wins_over_the_calibrated_recommendation() {
    use territory_assignment_core::model::config::CapacityBand;

    let mut cfg = common::config();
    cfg.capacity_variance_percent = 0.10;
    cfg.overrides.insert(
        "customer_arr".to_string(),
        CapacityBand { target: 1.0, min: 2.0, max: 3.0, variance_percent: 0.0 },
    );
    let accounts = vec![common::account("A1", 100_000)];
    let reps = vec![common::rep("R1", "EMEA")];
    let snapshot = load(common::raw("B1", accounts, reps, vec![], cfg)).unwrap();

    let bands = calibrate(&snapshot).unwrap();
    let arr = bands.get(Dimension::CustomerArr);
    assert_eq!((arr.target, arr.min, arr.max), (1.0, 2.0, 3.0));
}

#[test]
fn renewal_concentration_ceiling_is_the_configured_absolute_value_not_population_derived() {
    let mut cfg = common::config();
    cfg.renewal_concentration_max = 0.35;
    let accounts = vec![common::account("A1", 100_000)];
    let reps = vec![common::rep("R1", "EMEA")];
    let snapshot = load(common::raw("B1", accounts, reps, vec![], cfg)).unwrap();

    let bands = calibrate(&snapshot).unwrap();
    assert_eq!(bands.renewal_concentration_ceiling, 0.35);
}
