//! Run statistics and conflict records.
//!
//! Written alongside proposals on every run, atomically replacing the
//! prior run's statistics for the same build.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationIssue;
use crate::priority::CapacityOverflow;
use crate::workflow::CrossBuildWarning;

/// A single conflict surfaced by a run: either a capacity-overflow
/// placement or a read-only cross-build reassignment warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub account_id: String,
    pub kind: ConflictKind,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConflictKind {
    CapacityOverflow { dimension: Option<String> },
    CrossBuild { build_name: String, count: usize },
    HierarchyWarning,
}

/// A rebalancing suggestion: a donor/receiver pair and the dimension
/// and direction the run's balance pass could not fully close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalancingSuggestion {
    pub dimension: String,
    pub donor_rep_id: String,
    pub receiver_rep_id: String,
    /// Positive: donor is over target relative to receiver, in the
    /// dimension's native units (minor-unit currency or count).
    pub magnitude: f64,
}

/// Per-geo or per-rep rollup of proposal counts and totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rollup {
    pub proposal_count: usize,
    pub total_arr: i64,
    pub total_atr: i64,
}

/// Aggregate statistics for a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    pub proposals: usize,
    pub conflicts: usize,
    pub unassigned_accounts: usize,
    pub by_region: BTreeMap<String, Rollup>,
    pub by_rep: BTreeMap<String, Rollup>,
    pub rebalance_warnings: Vec<String>,
    pub rebalancing_suggestions: Vec<RebalancingSuggestion>,
    pub degraded_to_waterfall: bool,
    /// Non-fatal findings from hierarchy resolution (self-references
    /// cleared, orphans demoted to virtual-parent groups) — surfaced
    /// here rather than dropped once the Snapshot Loader accumulates
    /// them into `Snapshot::warnings`.
    pub snapshot_warnings: Vec<String>,
}

/// Convert a run's capacity overflows, cross-build warnings, and
/// snapshot-hierarchy warnings into the flat `Conflict` list persisted
/// alongside proposals.
pub fn build_conflicts(
    overflows: &[CapacityOverflow],
    cross_build: &[CrossBuildWarning],
    snapshot_warnings: &[ValidationIssue],
) -> Vec<Conflict> {
    let mut conflicts: Vec<Conflict> = overflows
        .iter()
        .map(|o| Conflict {
            account_id: o.account_id.clone(),
            kind: ConflictKind::CapacityOverflow { dimension: o.dimension.map(|d| format!("{d:?}")) },
            detail: o.detail.clone(),
        })
        .collect();

    conflicts.extend(cross_build.iter().map(|w| Conflict {
        account_id: w.account_id.clone(),
        kind: ConflictKind::CrossBuild { build_name: w.build_name.clone(), count: w.count },
        detail: format!("{} non-terminal reassignment(s) pending in build {}", w.count, w.build_name),
    }));

    conflicts.extend(snapshot_warnings.iter().map(|w| Conflict {
        account_id: w.entity.clone(),
        kind: ConflictKind::HierarchyWarning,
        detail: w.detail.clone(),
    }));

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrator::Dimension;

    #[test]
    fn conflicts_combine_overflows_and_cross_build_warnings() {
        let overflows = vec![CapacityOverflow {
            account_id: "A1".to_string(),
            dimension: Some(Dimension::Cre),
            detail: "no room".to_string(),
        }];
        let cross_build = vec![CrossBuildWarning {
            account_id: "A2".to_string(),
            build_name: "Q3 Draft".to_string(),
            count: 2,
        }];
        let conflicts = build_conflicts(&overflows, &cross_build, &[]);
        assert_eq!(conflicts.len(), 2);
    }
}
