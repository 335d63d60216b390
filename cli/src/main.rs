//! Batch demo runner for the territory assignment engine.
//!
//! Standing in for the external UI named out-of-scope by the core
//! (account/rep administration, the review queue, CSV ingestion):
//! reads one build's raw rows from a JSON file, runs the engine
//! against the core's in-memory reference `Store`, and prints the
//! resulting proposals, statistics, and conflicts as JSON.
//!
//! Usage:
//!
//! ```text
//! territory-assignment <snapshot.json>
//! ```
//!
//! `snapshot.json` deserializes directly into
//! `territory_assignment_core::snapshot::loader::RawSnapshotData`:
//!
//! ```json
//! {
//!   "build_id": "B1",
//!   "accounts": [ ... ],
//!   "reps": [ ... ],
//!   "opportunities": [ ... ],
//!   "config": { ... }
//! }
//! ```

use std::env;
use std::fs;
use std::process::ExitCode;

use territory_assignment_core::orchestrator::run_once;
use territory_assignment_core::snapshot::loader::RawSnapshotData;
use territory_assignment_core::testutil::{InMemoryNotifier, InMemoryStore};

fn main() -> ExitCode {
    let path = match env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: territory-assignment <snapshot.json>");
            return ExitCode::FAILURE;
        }
    };

    let raw = match read_snapshot(&path) {
        Ok(raw) => raw,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let build_id = raw.build_id.clone();
    let mut store = InMemoryStore::new();
    store.seed_snapshot(raw);
    let mut notifier = InMemoryNotifier::default();

    match run_once(&mut store, &mut notifier, &build_id) {
        Ok(outcome) => {
            let rendered = serde_json::to_string_pretty(&outcome).expect("RunOutcome fields are all serializable");
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("run failed ({}): {err}", if err.is_fatal() { "fatal" } else { "non-fatal" });
            ExitCode::FAILURE
        }
    }
}

fn read_snapshot(path: &str) -> Result<RawSnapshotData, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("failed to parse {path}: {e}"))
}
