//! C2 — Threshold Calibrator.
//!
//! Computes per-rep target/min/max bands for six dimensions from
//! population totals and configured variances. Explicit per-field
//! overrides in `Configuration::overrides` take precedence over the
//! calibrated recommendation.

pub mod bands;

pub use bands::{Bands, CalibratedBands, Dimension};

use crate::error::EngineError;
use crate::snapshot::Snapshot;

/// Compute calibrated bands for every dimension.
///
/// Returns `EngineError::InsufficientReps` when the calibration
/// population `N` is empty.
pub fn calibrate(snapshot: &Snapshot) -> Result<CalibratedBands, EngineError> {
    let n = snapshot.calibration_reps().count();
    if n == 0 {
        return Err(EngineError::InsufficientReps);
    }
    let n = n as f64;

    let totals = snapshot.population_totals;
    let cfg = &snapshot.config;

    let mut out = CalibratedBands::default();

    out.customer_arr = bands::band(
        totals.customer_arr_total as f64,
        n,
        cfg.capacity_variance_percent,
        totals.max_account_arr as f64,
    );
    // `customer_max_arr`, when configured, is an explicit hard ceiling
    // on a rep's ARR load — it replaces the auto-widened max rather
    // than competing with it, since the auto-widening only guarantees
    // the largest single account fits, not that a rep's accumulated
    // load stays under a policy-mandated cap.
    if cfg.customer_max_arr > 0 {
        out.customer_arr.max = cfg.customer_max_arr as f64;
    }
    out.atr = bands::band(totals.atr_total as f64, n, cfg.atr_variance, totals.max_account_atr as f64);
    out.pipeline = bands::band(totals.pipeline_total as f64, n, cfg.prospect_variance_percent, 0.0);

    // Counts use a fixed 20% variance.
    const COUNT_VARIANCE: f64 = 0.20;
    out.cre = bands::band(totals.cre_total as f64, n, COUNT_VARIANCE, totals.max_account_cre as f64);
    out.cre.max = (totals.cre_total as f64 / n * 1.2).ceil().max((totals.max_account_cre as f64 * 1.2).ceil());

    out.tier1 = bands::band(totals.tier1_total as f64, n, COUNT_VARIANCE, 0.0);
    out.tier2 = bands::band(totals.tier2_total as f64, n, COUNT_VARIANCE, 0.0);

    out.q1_renewals = bands::band(totals.q1_renewals as f64, n, COUNT_VARIANCE, 0.0);
    out.q2_renewals = bands::band(totals.q2_renewals as f64, n, COUNT_VARIANCE, 0.0);
    out.q3_renewals = bands::band(totals.q3_renewals as f64, n, COUNT_VARIANCE, 0.0);
    out.q4_renewals = bands::band(totals.q4_renewals as f64, n, COUNT_VARIANCE, 0.0);

    // Absolute ceiling, never derived from population.
    out.renewal_concentration_ceiling = cfg.renewal_concentration_max;

    out.apply_overrides(&cfg.overrides);

    Ok(out)
}
