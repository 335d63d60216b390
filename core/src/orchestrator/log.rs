//! Structured run event log, in place of a logging crate: an ordered,
//! serializable record of what happened during a run, owned by the
//! caller rather than written to a global sink.

use serde::{Deserialize, Serialize};

/// One notable event during a single engine run. Kept structured
/// (never a free-text log line) so a caller can filter or render it
/// without string-matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    SnapshotLoaded { build_id: String, account_count: usize, rep_count: usize },
    HierarchyWarningsFound { count: usize },
    BandsCalibrated,
    PriorityEngineCompleted { proposal_count: usize, overflow_count: usize },
    BalanceOptimizerCompleted { mode: &'static str, moves_performed: usize },
    RelaxedSolverDegraded { reason: &'static str },
    CrossBuildConflictsDetected { count: usize },
    RunCompleted { duration_ms: u64 },
}

/// An ordered log of events for a single run, in emission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunLog {
    events: Vec<RunEvent>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_preserve_emission_order() {
        let mut log = RunLog::new();
        log.push(RunEvent::BandsCalibrated);
        log.push(RunEvent::RunCompleted { duration_ms: 10 });
        assert_eq!(log.events().len(), 2);
        assert!(matches!(log.events()[0], RunEvent::BandsCalibrated));
    }
}
