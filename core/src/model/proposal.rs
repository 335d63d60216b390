//! Assignment proposal — the Priority Engine's per-account output.

use serde::{Deserialize, Serialize};

/// The priority catalogue. Ordering here is the *default*
/// waterfall order (`assignment_mode != "Custom"`); the effective
/// order at runtime is driven by `Configuration::priority_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum RuleApplied {
    /// P0 — Strategic or Manual-Holdover accounts to their designated rep.
    Protected,
    /// P1 — prior owner, still eligible, region matches.
    ContinuityGeo,
    /// P2 — geography-only match, ranked by distance-to-target.
    Geography,
    /// P3 — prior owner still eligible, region does not matter.
    Continuity,
    /// P4 / RO — any eligible rep minimizing distance-to-target.
    ResidualBalance,
    /// Routed to the sales-tools pool because ARR is below threshold.
    SalesToolsBucket,
    /// No rep admitted the account under hard caps.
    CapacityOverflow,
    /// An orphan child whose ultimate parent is absent from this
    /// snapshot; display-only, excluded from balance math.
    VirtualParentDisplay,
}

impl RuleApplied {
    /// Stable catalogue id string, used for configuration and display.
    pub fn catalogue_id(self) -> &'static str {
        match self {
            RuleApplied::Protected => "P0",
            RuleApplied::ContinuityGeo => "P1",
            RuleApplied::Geography => "P2",
            RuleApplied::Continuity => "P3",
            RuleApplied::ResidualBalance => "P4",
            RuleApplied::SalesToolsBucket => "SALES-TOOLS",
            RuleApplied::CapacityOverflow => "CAPACITY-OVERFLOW",
            RuleApplied::VirtualParentDisplay => "VIRTUAL-PARENT-DISPLAY",
        }
    }
}

/// Confidence grading assigned after a proposal is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A per-account assignment proposal, keyed by `account_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentProposal {
    pub account_id: String,

    pub current_owner_id: Option<String>,
    pub current_owner_name: Option<String>,

    pub proposed_owner_id: Option<String>,
    pub proposed_owner_name: Option<String>,

    pub rule_applied: RuleApplied,
    pub confidence: Confidence,
    pub assignment_reason: String,

    #[serde(default)]
    pub warning_details: Vec<String>,
}

impl AssignmentProposal {
    /// Grade confidence from the warnings accumulated while forming
    /// this proposal:
    /// High = no warnings.
    /// Medium = geo mismatch / tier concentration / renewal concentration near ceiling.
    /// Low = capacity overridden / changing a current-customer owner / protected rule violated.
    pub fn grade_confidence(warnings: &[Warning]) -> Confidence {
        if warnings.is_empty() {
            return Confidence::High;
        }
        if warnings.iter().any(|w| w.is_low_confidence()) {
            Confidence::Low
        } else {
            Confidence::Medium
        }
    }
}

/// A structured warning raised while forming a proposal. Rendered into
/// `AssignmentProposal::warning_details` as human text, but kept
/// structured here so confidence grading never string-matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    GeoMismatch,
    TierConcentration,
    RenewalConcentrationNearCeiling,
    CapacityExceededOverridden,
    ChangingCurrentCustomerOwner,
    ProtectedRuleViolated,
    OrphanParentMissing,
}

impl Warning {
    fn is_low_confidence(&self) -> bool {
        matches!(
            self,
            Warning::CapacityExceededOverridden
                | Warning::ChangingCurrentCustomerOwner
                | Warning::ProtectedRuleViolated
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Warning::GeoMismatch => "proposed owner's region does not match the account's mapped region",
            Warning::TierConcentration => "proposed owner's tier-count distribution is concentrated",
            Warning::RenewalConcentrationNearCeiling => {
                "proposed owner's renewal-quarter concentration is near the configured ceiling"
            }
            Warning::CapacityExceededOverridden => {
                "capacity would be exceeded but the assignment was made anyway"
            }
            Warning::ChangingCurrentCustomerOwner => "this changes the owner of an existing customer",
            Warning::ProtectedRuleViolated => "a protected (P0) account was not routed to its designated rep",
            Warning::OrphanParentMissing => {
                "ultimate_parent_id does not resolve to any account in this snapshot"
            }
        }
    }
}
