//! # sift-core
//!
//! Foundation crate for the Sift email evolution system.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod taxonomy;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SiftConfig;
pub use errors::{SiftError, SiftResult};
pub use models::{
    CategoryProposal, Confidence, CycleSummary, EmailMessage, Label, LabelSource, ModelScore,
    ModelVersion, NewMessage, ProposalStatus, TrainingTrigger,
};
pub use taxonomy::Taxonomy;
