//! Manager notes and approval stamps.
//!
//! Approval stamps are a sum type over three target kinds, stored under a single
//! notes table keyed by an encoded form of the target.

use serde::{Deserialize, Serialize};

/// What an approval (or note) applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalTarget {
    Account(String),
    RepBook(String),
    FlmTeam(String),
}

impl ApprovalTarget {
    /// Encoded key used to index the notes table: `account_id`,
    /// `rep-book:{rep_id}`, or `flm-team:{flm_name_encoded}`.
    pub fn encode(&self) -> String {
        match self {
            ApprovalTarget::Account(id) => id.clone(),
            ApprovalTarget::RepBook(rep_id) => format!("rep-book:{rep_id}"),
            ApprovalTarget::FlmTeam(flm) => format!("flm-team:{}", encode_flm_name(flm)),
        }
    }
}

fn encode_flm_name(flm: &str) -> String {
    flm.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApproverRole {
    Flm,
    Slm,
    RevOps,
}

impl From<crate::model::ProposerRole> for ApproverRole {
    fn from(r: crate::model::ProposerRole) -> Self {
        match r {
            crate::model::ProposerRole::Flm => ApproverRole::Flm,
            crate::model::ProposerRole::Slm => ApproverRole::Slm,
            crate::model::ProposerRole::RevOps => ApproverRole::RevOps,
        }
    }
}

/// An approval stamp: idempotent, keyed by `(build_id, target, category)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalStamp {
    pub approver_id: String,
    pub approver_name: String,
    pub approver_role: ApproverRole,
    /// Logical clock, not wall-clock (see `ManagerReassignmentProposal::created_at`).
    pub approved_at: u64,
}

/// A manager note, keyed by `(build_id, target, category)`. The
/// `approval` category stores `ApprovalStamp` payloads; other
/// categories carry free-text manager commentary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerNote {
    pub build_id: String,
    pub target: ApprovalTarget,
    pub category: String,
    #[serde(default)]
    pub stamp: Option<ApprovalStamp>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ManagerNote {
    pub fn key(&self) -> (String, String, String) {
        (self.build_id.clone(), self.target.encode(), self.category.clone())
    }
}
