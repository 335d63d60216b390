//! Population totals, precomputed once at load time and consumed by
//! the Threshold Calibrator.

use serde::{Deserialize, Serialize};

use crate::model::{Account, FiscalQuarter};

/// Population totals and per-dimension single-account maxima, computed
/// in one pass over the account array.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PopulationTotals {
    pub customer_arr_total: i64,
    pub atr_total: i64,
    pub pipeline_total: i64,
    pub cre_total: u64,
    pub tier1_total: u64,
    pub tier2_total: u64,
    pub q1_renewals: u64,
    pub q2_renewals: u64,
    pub q3_renewals: u64,
    pub q4_renewals: u64,

    pub max_account_arr: i64,
    pub max_account_atr: i64,
    pub max_account_cre: u64,
}

impl PopulationTotals {
    /// Fold a single account's contribution into the running totals.
    /// Called once per account during the loader's single pass.
    pub fn accumulate(&mut self, account: &Account, prospect_net_arr: i64) {
        if !account.is_parent() || account.is_virtual_parent {
            return;
        }

        if account.is_customer {
            self.customer_arr_total += account.arr;
            self.atr_total += account.atr;
            self.max_account_arr = self.max_account_arr.max(account.arr);
            self.max_account_atr = self.max_account_atr.max(account.atr);
        } else {
            self.pipeline_total += prospect_net_arr;
        }

        self.cre_total += account.cre_count as u64;
        self.max_account_cre = self.max_account_cre.max(account.cre_count as u64);

        match account.expansion_tier {
            Some(crate::model::ExpansionTier::Tier1) => self.tier1_total += 1,
            Some(crate::model::ExpansionTier::Tier2) => self.tier2_total += 1,
            _ => {}
        }

        match account.renewal_quarter {
            Some(FiscalQuarter::Q1) => self.q1_renewals += 1,
            Some(FiscalQuarter::Q2) => self.q2_renewals += 1,
            Some(FiscalQuarter::Q3) => self.q3_renewals += 1,
            Some(FiscalQuarter::Q4) => self.q4_renewals += 1,
            None => {}
        }
    }
}
