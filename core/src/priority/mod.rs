//! C3 — Priority Engine.
//!
//! `catalogue` holds the priority records and the capability trait
//! they implement; `distance` holds the shared distance-to-target
//! math; `tie_break` holds the deterministic tie-break hash;
//! `engine` drives the waterfall over a whole snapshot.

pub mod catalogue;
pub mod distance;
pub mod engine;
pub mod tie_break;

pub use catalogue::{EngineContext, PriorityRule};
pub use distance::RepLoad;
pub use engine::{run, CapacityOverflow, EngineOutput};
