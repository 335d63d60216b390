//! Account model
//!
//! Represents a sales account: either a parent (`ultimate_parent_id` is
//! empty) or a child that points at a parent, possibly in the same
//! snapshot. Customer/Prospect classification and balance math are
//! always resolved at the parent-hierarchy level.
//!
//! CRITICAL: `arr`, `atr`, `calculated_arr`, `calculated_atr`,
//! `hierarchy_bookings_arr` are `i64` minor units (cents). `atr <= arr`
//! always holds for a loaded account.

use serde::{Deserialize, Serialize};

/// Expansion tier bucket an account falls into for tier-count balancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpansionTier {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

/// Fiscal quarter, with the fiscal calendar fixed by the glossary:
/// Q1 = Feb-Apr, Q2 = May-Jul, Q3 = Aug-Oct, Q4 = Nov-Jan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiscalQuarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl FiscalQuarter {
    /// Derive the fiscal quarter from a calendar month (1-12).
    ///
    /// Calendar-complete: every month maps to exactly one quarter.
    pub fn from_month(month: u32) -> Self {
        match month {
            2 | 3 | 4 => FiscalQuarter::Q1,
            5 | 6 | 7 => FiscalQuarter::Q2,
            8 | 9 | 10 => FiscalQuarter::Q3,
            11 | 12 | 1 => FiscalQuarter::Q4,
            other => panic!("invalid calendar month: {other}"),
        }
    }
}

/// A sales account as loaded from the Store.
///
/// This is the *input* shape; derived fields computed by the Snapshot
/// Loader (customer/prospect classification, hierarchy totals, ATR,
/// fiscal quarter) live alongside the input fields but are clearly
/// marked as loader-derived in their doc comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub display_name: String,

    /// Empty string (or absent) means this account is a parent.
    #[serde(default)]
    pub ultimate_parent_id: Option<String>,

    /// Booked ARR, minor units. Never negative.
    pub arr: i64,

    /// Available-to-renew, minor units. Always `<= arr` once loaded.
    pub atr: i64,

    /// System-calculated ARR (used as an input signal, not authoritative).
    #[serde(default)]
    pub calculated_arr: i64,

    /// System-calculated ATR; fallback source when renewal-opportunity
    /// ATR sums to zero.
    #[serde(default)]
    pub calculated_atr: i64,

    /// Loader-derived: `sum(child.arr) + parent.arr` for the parent this
    /// account heads (or 0 for a non-parent).
    #[serde(default)]
    pub hierarchy_bookings_arr: i64,

    #[serde(default)]
    pub expansion_tier: Option<ExpansionTier>,
    #[serde(default)]
    pub initial_sale_tier: Option<ExpansionTier>,

    #[serde(default)]
    pub sales_territory: Option<String>,
    #[serde(default)]
    pub geo: Option<String>,
    #[serde(default)]
    pub hq_country: Option<String>,

    /// Loader-derived from `renewal_event_date` on ATR-bearing opportunities.
    #[serde(default)]
    pub renewal_quarter: Option<FiscalQuarter>,

    #[serde(default)]
    pub cre_count: u32,
    #[serde(default)]
    pub cre_risk: Option<String>,
    #[serde(default)]
    pub risk_flag: bool,
    #[serde(default)]
    pub cre_status: Option<String>,

    /// Prior owner, immutable within a build.
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,

    /// Current proposal target. Nullable until the engine (or a manager
    /// approval) first assigns the account.
    #[serde(default)]
    pub new_owner_id: Option<String>,
    #[serde(default)]
    pub new_owner_name: Option<String>,

    /// Strategic/Manual-Holdover marker consumed by priority P0.
    #[serde(default)]
    pub is_strategic: bool,
    #[serde(default)]
    pub is_manual_holdover: bool,
    /// Strategic accounts are routed to this rep by priority P0.
    #[serde(default)]
    pub strategic_rep_id: Option<String>,

    /// Loader-derived: true once any account in
    /// this hierarchy has positive booked ARR.
    #[serde(default)]
    pub is_customer: bool,

    /// Loader-derived: set when a child's
    /// `new_owner_id` diverges from its parent's.
    #[serde(default)]
    pub has_split_ownership: bool,

    /// Loader-derived: true if this account was an orphan child (its
    /// `ultimate_parent_id` did not resolve) and is therefore excluded
    /// from balance math as a virtual-parent group.
    #[serde(default)]
    pub is_virtual_parent: bool,
}

impl Account {
    /// An account is a parent iff it carries no (non-empty) ultimate
    /// parent pointer.
    pub fn is_parent(&self) -> bool {
        match &self.ultimate_parent_id {
            None => true,
            Some(s) => s.is_empty(),
        }
    }

    /// Whether this account is routed to the Sales-Tools bucket because
    /// its ARR falls below the configured threshold.
    pub fn is_sales_tools_candidate(&self, threshold: i64) -> bool {
        self.arr < threshold
    }
}
