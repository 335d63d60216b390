//! C1 — Snapshot Loader.
//!
//! Produces a read-only, internally consistent `Snapshot` from the
//! external Store. See `loader.rs` for the load entry point and
//! `hierarchy.rs` for parent/child classification.

pub mod hierarchy;
pub mod loader;
pub mod totals;

use std::collections::BTreeMap;

use crate::error::ValidationIssue;
use crate::model::{Account, AccountId, BuildId, Configuration, Opportunity, Rep, RepId};

/// An immutable, internally consistent in-memory model of a build.
///
/// Iteration order over `accounts`/`reps` is always the stable
/// `BTreeMap` key order, never insertion or hash order — this is what
/// lets the Priority Engine and Balance Optimizer satisfy the
/// determinism-under-permutation property.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub build_id: BuildId,

    pub accounts: BTreeMap<AccountId, Account>,
    pub reps: BTreeMap<RepId, Rep>,

    /// Opportunities grouped by account, already restricted to nothing
    /// in particular — filtering (e.g. renewals-only) happens at the
    /// point of use.
    pub opportunities_by_account: BTreeMap<AccountId, Vec<Opportunity>>,

    pub config: Configuration,

    /// `parent_id -> [child account_id]`, built once at load time.
    pub children_of: BTreeMap<AccountId, Vec<AccountId>>,

    /// Orphan children (pointed-at parent absent from the snapshot),
    /// kept in a side-table and excluded from balance math.
    pub virtual_parent_groups: BTreeMap<AccountId, Vec<AccountId>>,

    /// Precomputed population totals, consumed by the Calibrator.
    pub population_totals: totals::PopulationTotals,

    /// Non-fatal findings from hierarchy resolution (self-references
    /// cleared, orphans demoted to virtual-parent groups). Surfaced
    /// through `RunStatistics::snapshot_warnings`, never silently
    /// dropped.
    pub warnings: Vec<ValidationIssue>,
}

impl Snapshot {
    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn rep(&self, id: &str) -> Option<&Rep> {
        self.reps.get(id)
    }

    /// All parent accounts, in stable key order.
    pub fn parent_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values().filter(|a| a.is_parent() && !a.is_virtual_parent)
    }

    /// All reps counted toward the calibration population.
    pub fn calibration_reps(&self) -> impl Iterator<Item = &Rep> {
        self.reps.values().filter(|r| r.counts_toward_calibration())
    }

    /// Assignable reps (active + included), regardless of strategic
    /// status — the pool priorities P1-P4 draw from.
    pub fn assignable_reps(&self) -> impl Iterator<Item = &Rep> {
        self.reps.values().filter(|r| r.is_assignable())
    }
}
