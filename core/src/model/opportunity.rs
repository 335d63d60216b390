//! Opportunity model
//!
//! Only `Renewals`-typed opportunities contribute to an account's ATR
//!. Prospect pipeline totals are drawn from `net_arr`
//! on opportunities regardless of type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub opportunity_id: String,
    pub account_id: String,

    /// Free-text opportunity type; normalized (case/whitespace
    /// insensitive) against `"renewals"` when computing ATR.
    pub opportunity_type: String,

    /// Non-negative currency, minor units.
    #[serde(default)]
    pub available_to_renew: i64,

    #[serde(default)]
    pub renewal_event_date: Option<String>,

    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub new_owner_id: Option<String>,
    #[serde(default)]
    pub cre_status: Option<String>,

    /// Used for prospect pipeline totals.
    #[serde(default)]
    pub net_arr: i64,
}

impl Opportunity {
    /// Case/whitespace-insensitive match against the canonical
    /// `Renewals` opportunity type.
    pub fn is_renewal_type(&self) -> bool {
        self.opportunity_type.trim().eq_ignore_ascii_case("renewals")
    }
}
