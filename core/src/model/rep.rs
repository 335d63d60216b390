//! Rep (sales representative) model

use serde::{Deserialize, Serialize};

/// A sales rep as loaded from the Store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rep {
    pub rep_id: String,
    pub name: String,

    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub flm: Option<String>,
    #[serde(default)]
    pub slm: Option<String>,

    /// Authoritative rep-side region, matched against an account's
    /// mapped region by priorities P1/P2.
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub include_in_assignments: bool,
    #[serde(default)]
    pub is_strategic_rep: bool,

    #[serde(default)]
    pub is_backfill_source: bool,
    #[serde(default)]
    pub is_backfill_target: bool,
    #[serde(default)]
    pub is_placeholder: bool,
}

fn default_true() -> bool {
    true
}

impl Rep {
    /// Whether this rep counts toward threshold calibration's
    /// population `N`: active, included, non-strategic, and
    /// carrying a region.
    pub fn counts_toward_calibration(&self) -> bool {
        self.is_active
            && self.include_in_assignments
            && !self.is_strategic_rep
            && self.region.is_some()
    }

    /// Whether this rep is a candidate for any priority at all.
    pub fn is_assignable(&self) -> bool {
        self.is_active && self.include_in_assignments
    }

    /// A rep flagged as both a backfill source and a backfill target
    /// simultaneously is an `invalid_snapshot` condition — the loader
    /// never guesses a precedence between the two.
    pub fn has_ambiguous_backfill_flags(&self) -> bool {
        self.is_backfill_source && self.is_backfill_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Rep {
        Rep {
            rep_id: "R1".to_string(),
            name: "Rep One".to_string(),
            team: None,
            flm: None,
            slm: None,
            region: Some("AMER".to_string()),
            is_active: true,
            include_in_assignments: true,
            is_strategic_rep: false,
            is_backfill_source: false,
            is_backfill_target: false,
            is_placeholder: false,
        }
    }

    #[test]
    fn strategic_reps_are_excluded_from_calibration_population() {
        let mut r = sample();
        r.is_strategic_rep = true;
        assert!(!r.counts_toward_calibration());
    }

    #[test]
    fn inactive_reps_are_excluded_from_calibration_population() {
        let mut r = sample();
        r.is_active = false;
        assert!(!r.counts_toward_calibration());
    }

    #[test]
    fn reps_without_region_are_excluded_from_calibration_population() {
        let mut r = sample();
        r.region = None;
        assert!(!r.counts_toward_calibration());
    }

    #[test]
    fn simultaneous_backfill_flags_are_ambiguous() {
        let mut r = sample();
        r.is_backfill_source = true;
        r.is_backfill_target = true;
        assert!(r.has_ambiguous_backfill_flags());
    }
}
