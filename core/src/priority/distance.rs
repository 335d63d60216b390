//! Distance-to-target.
//!
//! A weighted L1 distance across active dimensions:
//! `|current + delta - target_d| / band_width_d`, with weights scaled
//! by `balance_intensity.multiplier`. ARR is always weighted; in
//! relaxed mode, ATR and Pipeline are also weighted. Tier counts and
//! renewal-quarter counts apply as hard caps in both modes, never as
//! part of this weighted sum.

use crate::calibrator::{Bands, CalibratedBands, Dimension};
use crate::model::{BalanceIntensity, OptimizationModel};

/// A rep's running totals across every balanced dimension, accumulated
/// as the Priority Engine assigns accounts to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepLoad {
    pub arr: i64,
    pub atr: i64,
    pub pipeline: i64,
    pub cre: u32,
    pub tier1: u32,
    pub tier2: u32,
    pub q1_renewals: u32,
    pub q2_renewals: u32,
    pub q3_renewals: u32,
    pub q4_renewals: u32,
    /// Customer-account count, used only for P2's tie-break order,
    /// never weighted into the distance itself.
    pub customer_count: u32,
}

impl RepLoad {
    pub fn plus_arr(mut self, delta: i64) -> Self {
        self.arr += delta;
        self
    }
}

fn term(current: f64, delta: f64, bands: Bands, weight: f64) -> f64 {
    if bands.is_disabled() {
        return 0.0;
    }
    let width = bands.band_width();
    if width <= 0.0 {
        return 0.0;
    }
    weight * ((current + delta - bands.target).abs() / width)
}

/// Weighted L1 distance-to-target for a rep, if `account_delta` were
/// added to its current load.
pub fn distance_to_target(
    load: &RepLoad,
    account_delta: &RepLoad,
    calibrated: &CalibratedBands,
    model: OptimizationModel,
    intensity: BalanceIntensity,
) -> f64 {
    let w = intensity.multiplier();
    let mut total = term(load.arr as f64, account_delta.arr as f64, calibrated.get(Dimension::CustomerArr), w);

    if model == OptimizationModel::Relaxed {
        total += term(load.atr as f64, account_delta.atr as f64, calibrated.get(Dimension::Atr), w);
        total += term(
            load.pipeline as f64,
            account_delta.pipeline as f64,
            calibrated.get(Dimension::Pipeline),
            w,
        );
    }

    total
}

/// Whether adding `account_delta` to `load` would breach any
/// hard-capped dimension (CRE, tier counts, renewal-quarter counts, and
/// ARR when `customer_max_arr` is configured) — the eligibility gate
/// every `PriorityRule::choose` implementation checks through
/// `EngineContext::rep_is_eligible` before it ever offers a rep as a
/// candidate.
pub fn breaches_hard_cap(
    load: &RepLoad,
    account_delta: &RepLoad,
    calibrated: &CalibratedBands,
    arr_hard_capped: bool,
) -> Option<Dimension> {
    let checks: [(Dimension, f64, f64); 7] = [
        (Dimension::Cre, load.cre as f64, account_delta.cre as f64),
        (Dimension::Tier1, load.tier1 as f64, account_delta.tier1 as f64),
        (Dimension::Tier2, load.tier2 as f64, account_delta.tier2 as f64),
        (Dimension::Q1Renewals, load.q1_renewals as f64, account_delta.q1_renewals as f64),
        (Dimension::Q2Renewals, load.q2_renewals as f64, account_delta.q2_renewals as f64),
        (Dimension::Q3Renewals, load.q3_renewals as f64, account_delta.q3_renewals as f64),
        (Dimension::Q4Renewals, load.q4_renewals as f64, account_delta.q4_renewals as f64),
    ];
    if arr_hard_capped {
        let bands = calibrated.get(Dimension::CustomerArr);
        if !bands.is_disabled() && load.arr as f64 + account_delta.arr as f64 > bands.max {
            return Some(Dimension::CustomerArr);
        }
    }
    for (dim, current, delta) in checks {
        if !dim.is_hard_capped() {
            continue;
        }
        let bands = calibrated.get(dim);
        if bands.is_disabled() {
            continue;
        }
        if current + delta > bands.max {
            return Some(dim);
        }
    }
    None
}
