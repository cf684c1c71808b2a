//! # sift-evolution
//!
//! The control loop that closes the feedback cycle:
//! ingest → classify and flag → discover → retrain → compare → summarize.
//! Every stage returns a tagged outcome so one stage's failure never
//! prevents later stages from running with whatever state exists.

pub mod engine;
pub mod scheduler;
pub mod stage;

pub use engine::{accuracy_regressed, EvolutionEngine};
pub use scheduler::Scheduler;
pub use stage::StageOutcome;
