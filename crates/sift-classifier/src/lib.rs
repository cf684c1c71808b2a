//! # sift-classifier
//!
//! The uncertainty-aware classification layer: scores unlabeled messages with
//! the latest trained model, persists every prediction as a label, and flags
//! the uncertain ones for the discovery pipeline. Also hosts the LLM
//! bootstrap labeler that seeds training data for a fresh taxonomy.

pub mod bootstrap;
pub mod engine;
pub mod uncertainty;

pub use bootstrap::{BootstrapLabeler, BootstrapReport};
pub use engine::{Classification, ClassifierEngine, ClassifyReport};
pub use uncertainty::UncertaintyScore;
