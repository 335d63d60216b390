//! Build configuration
//!
//! Single source of truth for every recognized configuration option.
//! Field names match the external configuration surface exactly.
//! Legacy field aliases (e.g. `atr_target`) are *not* resolved here —
//! that mapping is the Snapshot Loader's job alone, so this struct
//! carries both the canonical field and, optionally, the legacy one,
//! and downstream code only ever reads the canonical field after the
//! loader has normalized it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};

/// Balance intensity: a fixed 5-point scale with literal multipliers.
/// Never configurable beyond this enum's choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BalanceIntensity {
    VeryLight,
    Light,
    Normal,
    Heavy,
    VeryHeavy,
}

impl BalanceIntensity {
    pub fn multiplier(self) -> f64 {
        match self {
            BalanceIntensity::VeryLight => 0.25,
            BalanceIntensity::Light => 0.5,
            BalanceIntensity::Normal => 1.0,
            BalanceIntensity::Heavy => 2.0,
            BalanceIntensity::VeryHeavy => 4.0,
        }
    }
}

/// Which optimizer drives the Balance Optimizer component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptimizationModel {
    Waterfall,
    Relaxed,
}

/// One entry in the ordered priority waterfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityConfigEntry {
    pub priority_id: String,
    pub enabled: bool,
}

/// Per-scope capacity band configuration (target/min/max/variance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CapacityBand {
    pub target: i64,
    pub min: i64,
    pub max: i64,
    /// Percentage, expressed as a fraction (0.15 == 15%).
    pub variance_percent: f64,
}

/// Per-build configuration; the single owned record consumed by every
/// downstream component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub customer_target_arr: i64,
    pub customer_min_arr: i64,
    pub customer_max_arr: i64,
    pub capacity_variance_percent: f64,

    pub customer_target_atr: i64,
    pub customer_min_atr: i64,
    pub customer_max_atr: i64,
    pub atr_variance: f64,

    /// Legacy alias for `customer_target_atr`; resolved by the Snapshot
    /// Loader, never read downstream.
    #[serde(default)]
    pub atr_target: Option<i64>,

    pub prospect_target_arr: i64,
    pub prospect_min_arr: i64,
    pub prospect_max_arr: i64,
    pub prospect_variance_percent: f64,

    pub max_cre_per_rep: u32,
    /// Absolute percentage ceiling (0.0-1.0), not derived from population.
    pub renewal_concentration_max: f64,

    /// Account territory label -> rep region label. The sentinel value
    /// `"not-applicable"` disables priorities P1/P2 for accounts mapped
    /// to it.
    pub territory_mappings: HashMap<String, String>,

    pub optimization_model: OptimizationModel,
    pub balance_intensity: BalanceIntensity,

    /// Preset name, or the literal string `"Custom"`.
    pub assignment_mode: String,
    pub priority_config: Vec<PriorityConfigEntry>,
    pub is_custom_priority: bool,

    /// ARR floor below which an account routes to the Sales-Tools
    /// bucket instead of the main waterfall.
    pub rs_arr_threshold: i64,

    /// Explicit per-field overrides for calibrated bands; present
    /// entries take precedence over the Calibrator's recommendation.
    #[serde(default)]
    pub overrides: HashMap<String, CapacityBand>,

    /// Whether the relaxed-mode solver is available in this
    /// environment. When `optimization_model = Relaxed` and this is
    /// `false`, the engine degrades to waterfall with a warning.
    #[serde(default = "default_true")]
    pub relaxed_solver_enabled: bool,

    /// Wall-clock budget for a single engine run, in milliseconds.
    /// Exceeding it is a fatal `timeout` failure.
    #[serde(default = "default_wall_clock_budget_ms")]
    pub wall_clock_budget_ms: u64,
}

impl Configuration {
    /// Deterministic SHA256 fingerprint of this configuration, used by
    /// the idempotence test harness to assert two runs were given
    /// byte-identical configuration. Object keys are sorted before
    /// hashing so the fingerprint never depends on `HashMap` iteration
    /// order (e.g. `territory_mappings`, `overrides`).
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        let canonical = canonicalize(value);
        let json = serde_json::to_string(&canonical)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<String, serde_json::Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn default_true() -> bool {
    true
}

fn default_wall_clock_budget_ms() -> u64 {
    60_000
}

/// The sentinel territory-mapping value that disables geo-based
/// priorities for an account.
pub const NOT_APPLICABLE: &str = "not-applicable";

/// Accounts below this ARR route to the Sales-Tools bucket. Mirrors
/// `Configuration::rs_arr_threshold`, named for readability at call
/// sites that only care about the threshold, not the whole config.
pub const SALES_TOOLS_ARR_THRESHOLD_FIELD: &str = "rs_arr_threshold";
