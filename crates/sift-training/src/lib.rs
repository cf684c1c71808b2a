//! # sift-training
//!
//! The model version manager: trains a TF-IDF + random-forest classifier from
//! labeled messages, evaluates it on a stratified held-out split, persists
//! versioned artifacts with an atomically replaced "latest" pointer, and
//! records lineage rows.

pub mod artifact;
pub mod engine;
pub mod evaluation;
pub mod forest;

pub use artifact::ModelArtifact;
pub use engine::{TrainingEngine, TrainingOutcome};
