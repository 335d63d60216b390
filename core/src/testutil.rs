//! In-memory reference implementations of the external interfaces:
//! `Store`, `Notifier`, `IdentityResolver`. These exist for
//! integration tests and the CLI demo binary only — the library's
//! public API surface never depends on a concrete implementation of
//! any of the three traits, only on the traits themselves.

use std::collections::BTreeMap;

use crate::model::{
    AccountId, ApprovalStatus, ApprovalTarget, AssignmentProposal, BuildId, ManagerNote,
    ManagerReassignmentProposal, ReassignmentId,
};
use crate::orchestrator::stats::{Conflict, RunStatistics};
use crate::snapshot::loader::RawSnapshotData;
use crate::store::{IdentityResolver, Notifier, ResolvedRole, Store, StoreError};
use crate::workflow::CrossBuildReassignment;

/// Everything a single `write_proposals` call committed for a build.
#[derive(Debug, Clone, Default)]
pub struct WrittenBuild {
    pub proposals: Vec<AssignmentProposal>,
    pub conflicts: Vec<Conflict>,
    pub statistics: Option<RunStatistics>,
}

/// An in-process `Store`, backed by `BTreeMap`s so iteration order is
/// always reproducible. Cross-build detection treats `build_id` as its
/// own display name — a real Store would carry a separate build-name
/// column, which this reference implementation has no use for.
#[derive(Default)]
pub struct InMemoryStore {
    snapshots: BTreeMap<BuildId, RawSnapshotData>,
    writes: BTreeMap<BuildId, WrittenBuild>,
    reassignments: BTreeMap<ReassignmentId, ManagerReassignmentProposal>,
    notes: BTreeMap<(String, String, String), ManagerNote>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a build's raw rows, as if a prior ingestion step had
    /// already written them.
    pub fn seed_snapshot(&mut self, raw: RawSnapshotData) {
        self.snapshots.insert(raw.build_id.clone(), raw);
    }

    pub fn written(&self, build_id: &str) -> Option<&WrittenBuild> {
        self.writes.get(build_id)
    }

    pub fn notes_for(&self, build_id: &str) -> Vec<&ManagerNote> {
        self.notes.values().filter(|n| n.build_id == build_id).collect()
    }

    pub fn reassignment(&self, id: &str) -> Option<&ManagerReassignmentProposal> {
        self.reassignments.get(id)
    }
}

impl Store for InMemoryStore {
    fn read_snapshot(&self, build_id: &str) -> Result<RawSnapshotData, StoreError> {
        self.snapshots.get(build_id).cloned().ok_or_else(|| StoreError::NotFound(build_id.to_string()))
    }

    fn write_proposals(
        &mut self,
        build_id: &str,
        proposals: &[AssignmentProposal],
        conflicts: &[Conflict],
        statistics: &RunStatistics,
    ) -> Result<(), StoreError> {
        self.writes.insert(
            build_id.to_string(),
            WrittenBuild {
                proposals: proposals.to_vec(),
                conflicts: conflicts.to_vec(),
                statistics: Some(statistics.clone()),
            },
        );
        Ok(())
    }

    fn insert_reassignment(&mut self, r: ManagerReassignmentProposal) -> Result<ReassignmentId, StoreError> {
        if self.reassignments.contains_key(&r.id) {
            return Err(StoreError::Unavailable(format!("reassignment {} already exists", r.id)));
        }
        let id = r.id.clone();
        self.reassignments.insert(id.clone(), r);
        Ok(id)
    }

    fn transition_reassignment(
        &mut self,
        id: &str,
        new_state: ApprovalStatus,
        actor: &str,
        rationale: Option<&str>,
    ) -> Result<(), StoreError> {
        let r = self.reassignments.get_mut(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        r.approval_status = new_state;
        if let Some(reason) = rationale {
            r.rationale = format!("{} (by {actor}: {reason})", r.rationale);
        }
        Ok(())
    }

    fn bulk_reject_reassignments(
        &mut self,
        build_id: &str,
        account_id: &str,
        exclude_id: &str,
        _actor: &str,
        rationale: &str,
    ) -> Result<usize, StoreError> {
        let mut count = 0;
        for r in self.reassignments.values_mut() {
            if r.build_id == build_id && r.account_id == account_id && r.id != exclude_id && r.is_non_terminal() {
                r.approval_status = ApprovalStatus::Rejected;
                r.superseded_by = Some(exclude_id.to_string());
                r.rationale = rationale.to_string();
                count += 1;
            }
        }
        Ok(count)
    }

    fn upsert_note(&mut self, note: ManagerNote) -> Result<(), StoreError> {
        self.notes.insert(note.key(), note);
        Ok(())
    }

    fn delete_note(&mut self, build_id: &str, target: &ApprovalTarget, category: &str) -> Result<(), StoreError> {
        self.notes.remove(&(build_id.to_string(), target.encode(), category.to_string()));
        Ok(())
    }

    fn read_cross_build_reassignments(
        &self,
        account_ids: &[AccountId],
        exclude_build_id: &BuildId,
    ) -> Result<Vec<CrossBuildReassignment>, StoreError> {
        Ok(self
            .reassignments
            .values()
            .filter(|r| &r.build_id != exclude_build_id && r.is_non_terminal() && account_ids.contains(&r.account_id))
            .map(|r| CrossBuildReassignment {
                account_id: r.account_id.clone(),
                build_id: r.build_id.clone(),
                build_name: r.build_id.clone(),
                reassignment_id: r.id.clone(),
            })
            .collect())
    }
}

/// An in-process `Notifier` that records every call instead of sending
/// anything. Assertions in tests read the two logs directly.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    pub rejections: Vec<RejectionNotice>,
    pub supersessions: Vec<SupersessionNotice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionNotice {
    pub recipient: String,
    pub account_name: String,
    pub actor_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupersessionNotice {
    pub recipient: String,
    pub account_name: String,
    pub actor_name: String,
}

impl Notifier for InMemoryNotifier {
    fn notify_proposal_rejected(&mut self, recipient: &str, account_name: &str, actor_name: &str, reason: &str) {
        self.rejections.push(RejectionNotice {
            recipient: recipient.to_string(),
            account_name: account_name.to_string(),
            actor_name: actor_name.to_string(),
            reason: reason.to_string(),
        });
    }

    fn notify_superseded(&mut self, recipient: &str, account_name: &str, actor_name: &str) {
        self.supersessions.push(SupersessionNotice {
            recipient: recipient.to_string(),
            account_name: account_name.to_string(),
            actor_name: actor_name.to_string(),
        });
    }
}

/// An `IdentityResolver` backed by a fixed user-id -> role table.
#[derive(Debug, Default)]
pub struct StaticIdentityResolver {
    roles: BTreeMap<String, ResolvedRole>,
}

impl StaticIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, user_id: impl Into<String>, role: ResolvedRole) -> Self {
        self.roles.insert(user_id.into(), role);
        self
    }
}

impl IdentityResolver for StaticIdentityResolver {
    fn resolve_role(&self, user_id: &str) -> Result<ResolvedRole, StoreError> {
        self.roles.get(user_id).copied().ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Account, Configuration, OptimizationModel, BalanceIntensity};
    use std::collections::HashMap;

    fn config() -> Configuration {
        Configuration {
            customer_target_arr: 0,
            customer_min_arr: 0,
            customer_max_arr: 0,
            capacity_variance_percent: 0.2,
            customer_target_atr: 0,
            customer_min_atr: 0,
            customer_max_atr: 0,
            atr_variance: 0.2,
            atr_target: None,
            prospect_target_arr: 0,
            prospect_min_arr: 0,
            prospect_max_arr: 0,
            prospect_variance_percent: 0.2,
            max_cre_per_rep: 0,
            renewal_concentration_max: 0.0,
            territory_mappings: HashMap::new(),
            optimization_model: OptimizationModel::Waterfall,
            balance_intensity: BalanceIntensity::Normal,
            assignment_mode: "Default".to_string(),
            priority_config: Vec::new(),
            is_custom_priority: false,
            rs_arr_threshold: 0,
            overrides: HashMap::new(),
            relaxed_solver_enabled: true,
            wall_clock_budget_ms: 60_000,
        }
    }

    fn raw(build_id: &str) -> RawSnapshotData {
        RawSnapshotData {
            build_id: build_id.to_string(),
            accounts: Vec::<Account>::new(),
            reps: Vec::new(),
            opportunities: Vec::new(),
            config: config(),
        }
    }

    #[test]
    fn read_snapshot_round_trips_a_seeded_build() {
        let mut store = InMemoryStore::new();
        store.seed_snapshot(raw("B1"));
        let round_tripped = store.read_snapshot("B1").unwrap();
        assert_eq!(round_tripped.build_id, "B1");
    }

    #[test]
    fn reading_an_unseeded_build_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(store.read_snapshot("missing"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn bulk_reject_only_touches_non_terminal_proposals_for_the_same_account() {
        let mut store = InMemoryStore::new();
        let mut p1 = sample_reassignment("RP1", "A1", "B1");
        let p2 = sample_reassignment("RP2", "A2", "B1");
        p1.approval_status = ApprovalStatus::PendingRevops;
        store.insert_reassignment(p1).unwrap();
        store.insert_reassignment(p2).unwrap();

        let count = store.bulk_reject_reassignments("B1", "A1", "RP-NEW", "RevOps One", "superseded").unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.reassignment("RP1").unwrap().approval_status, ApprovalStatus::Rejected);
        assert_eq!(store.reassignment("RP2").unwrap().approval_status, ApprovalStatus::PendingSlm);
    }

    fn sample_reassignment(id: &str, account_id: &str, build_id: &str) -> ManagerReassignmentProposal {
        ManagerReassignmentProposal {
            id: id.to_string(),
            account_id: account_id.to_string(),
            build_id: build_id.to_string(),
            manager_user_id: "U1".to_string(),
            current_owner: "R1".to_string(),
            proposed_owner: "R2".to_string(),
            rationale: "test".to_string(),
            approval_status: ApprovalStatus::PendingSlm,
            is_late_submission: false,
            superseded_by: None,
            created_at: 0,
        }
    }

    #[test]
    fn identity_resolver_returns_not_found_for_unknown_user() {
        let resolver = StaticIdentityResolver::new().with_role("U1", ResolvedRole::Flm);
        assert!(matches!(resolver.resolve_role("U2"), Err(StoreError::NotFound(_))));
        assert_eq!(resolver.resolve_role("U1").unwrap(), ResolvedRole::Flm);
    }
}
