//! Per-dimension capacity bands.

use std::collections::HashMap;

use crate::model::CapacityBand;

/// The six (plus renewal-quarter split) dimensions balanced across
/// reps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    CustomerArr,
    Atr,
    Pipeline,
    Cre,
    Tier1,
    Tier2,
    Q1Renewals,
    Q2Renewals,
    Q3Renewals,
    Q4Renewals,
}

impl Dimension {
    /// Hard-capped dimensions gate rep eligibility; soft dimensions only contribute to the
    /// distance-to-target objective. `CustomerArr` is hard-capped only
    /// when a `customer_max_arr` ceiling is actually configured — see
    /// `calibrator::calibrate`, which overwrites the calibrated
    /// `customer_arr.max` with that ceiling before eligibility checks
    /// ever run.
    pub fn is_hard_capped(self) -> bool {
        matches!(
            self,
            Dimension::CustomerArr | Dimension::Cre | Dimension::Tier1 | Dimension::Tier2
                | Dimension::Q1Renewals | Dimension::Q2Renewals | Dimension::Q3Renewals | Dimension::Q4Renewals
        )
    }

    /// ARR is always weighted in the distance-to-target objective; ATR
    /// and Pipeline are weighted only in relaxed mode.
    pub fn is_always_weighted(self) -> bool {
        matches!(self, Dimension::CustomerArr)
    }

    pub fn is_weighted_in_relaxed_mode_only(self) -> bool {
        matches!(self, Dimension::Atr | Dimension::Pipeline)
    }

    /// The configuration override key for this dimension, if one is
    /// recognized.
    pub fn override_key(self) -> &'static str {
        match self {
            Dimension::CustomerArr => "customer_arr",
            Dimension::Atr => "atr",
            Dimension::Pipeline => "pipeline",
            Dimension::Cre => "cre",
            Dimension::Tier1 => "tier1",
            Dimension::Tier2 => "tier2",
            Dimension::Q1Renewals => "q1_renewals",
            Dimension::Q2Renewals => "q2_renewals",
            Dimension::Q3Renewals => "q3_renewals",
            Dimension::Q4Renewals => "q4_renewals",
        }
    }
}

/// A single dimension's calibrated target/min/max.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bands {
    pub target: f64,
    pub min: f64,
    pub max: f64,
}

impl Bands {
    pub fn band_width(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_disabled(&self) -> bool {
        self.target == 0.0 && self.min == 0.0 && self.max == 0.0
    }
}

/// Calibrated bands for every dimension, plus the absolute
/// renewal-concentration ceiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibratedBands {
    pub customer_arr: Bands,
    pub atr: Bands,
    pub pipeline: Bands,
    pub cre: Bands,
    pub tier1: Bands,
    pub tier2: Bands,
    pub q1_renewals: Bands,
    pub q2_renewals: Bands,
    pub q3_renewals: Bands,
    pub q4_renewals: Bands,
    pub renewal_concentration_ceiling: f64,
}

impl CalibratedBands {
    pub fn get(&self, d: Dimension) -> Bands {
        match d {
            Dimension::CustomerArr => self.customer_arr,
            Dimension::Atr => self.atr,
            Dimension::Pipeline => self.pipeline,
            Dimension::Cre => self.cre,
            Dimension::Tier1 => self.tier1,
            Dimension::Tier2 => self.tier2,
            Dimension::Q1Renewals => self.q1_renewals,
            Dimension::Q2Renewals => self.q2_renewals,
            Dimension::Q3Renewals => self.q3_renewals,
            Dimension::Q4Renewals => self.q4_renewals,
        }
    }

    fn set(&mut self, d: Dimension, b: Bands) {
        match d {
            Dimension::CustomerArr => self.customer_arr = b,
            Dimension::Atr => self.atr = b,
            Dimension::Pipeline => self.pipeline = b,
            Dimension::Cre => self.cre = b,
            Dimension::Tier1 => self.tier1 = b,
            Dimension::Tier2 => self.tier2 = b,
            Dimension::Q1Renewals => self.q1_renewals = b,
            Dimension::Q2Renewals => self.q2_renewals = b,
            Dimension::Q3Renewals => self.q3_renewals = b,
            Dimension::Q4Renewals => self.q4_renewals = b,
        }
    }

    /// Explicit per-field overrides take precedence over the
    /// calibrator's recommendation.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, CapacityBand>) {
        for d in [
            Dimension::CustomerArr,
            Dimension::Atr,
            Dimension::Pipeline,
            Dimension::Cre,
            Dimension::Tier1,
            Dimension::Tier2,
            Dimension::Q1Renewals,
            Dimension::Q2Renewals,
            Dimension::Q3Renewals,
            Dimension::Q4Renewals,
        ] {
            if let Some(over) = overrides.get(d.override_key()) {
                self.set(
                    d,
                    Bands {
                        target: over.target as f64,
                        min: over.min as f64,
                        max: over.max as f64,
                    },
                );
            }
        }
    }
}

/// Compute a single dimension's band.
///
/// `target = total / n` (no outlier inflation). The band is widened,
/// when `single_account_max > 0`, to guarantee `max >= 1.2 *
/// single_account_max` so the largest single account always fits
///. A zero population total disables the dimension
/// (`target = min = max = 0`).
pub fn band(total: f64, n: f64, variance_percent: f64, single_account_max: f64) -> Bands {
    if total == 0.0 {
        return Bands::default();
    }
    let target = total / n;
    let min = target * (1.0 - variance_percent);
    let mut max = target * (1.0 + variance_percent);
    if single_account_max > 0.0 {
        max = max.max(1.2 * single_account_max);
    }
    Bands { target, min, max }
}
