//! Cross-build conflict detection.
//!
//! For every account in the current snapshot, surface non-terminal
//! reassignment proposals filed against it in *other* builds as
//! read-only warnings. Detection only: this module never writes
//! anything in another build.

use std::collections::BTreeMap;

use crate::model::{AccountId, BuildId};
use crate::snapshot::Snapshot;
use crate::store::{Store, StoreError};

/// A row returned by `Store::read_cross_build_reassignments`: one
/// non-terminal reassignment proposal found in another build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossBuildReassignment {
    pub account_id: AccountId,
    pub build_id: BuildId,
    pub build_name: String,
    pub reassignment_id: String,
}

/// A read-only rollup surfaced to the reviewing manager: this many
/// non-terminal proposals exist for this account in that other build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossBuildWarning {
    pub account_id: AccountId,
    pub build_name: String,
    pub count: usize,
}

/// Detect cross-build conflicts for every account in `snapshot`.
pub fn detect<S: Store>(store: &S, snapshot: &Snapshot) -> Result<Vec<CrossBuildWarning>, StoreError> {
    let account_ids: Vec<AccountId> = snapshot.accounts.keys().cloned().collect();
    if account_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = store.read_cross_build_reassignments(&account_ids, &snapshot.build_id)?;

    let mut grouped: BTreeMap<(AccountId, String), usize> = BTreeMap::new();
    for row in rows {
        *grouped.entry((row.account_id, row.build_name)).or_insert(0) += 1;
    }

    Ok(grouped
        .into_iter()
        .map(|((account_id, build_name), count)| CrossBuildWarning { account_id, build_name, count })
        .collect())
}
