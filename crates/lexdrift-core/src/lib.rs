//! # lexdrift-core
//!
//! Foundation types, errors, and branded IDs shared by all lexdrift crates:
//!
//! - **Branded IDs**: [`ids::SessionId`] as a newtype for type safety
//! - **Errors**: [`errors::DriftError`] taxonomy via `thiserror`
//! - **Types**: training settings, job snapshots, similarity records
//! - **Constants**: session TTL, hyperparameter bounds

#![deny(unsafe_code)]

pub mod constants;
pub mod errors;
pub mod ids;
pub mod types;

pub use errors::{DriftError, Result};
pub use ids::SessionId;
pub use types::{
    AlignmentMethod, CorpusStats, JobStatus, SimilarityRecord, TrainingJob, TrainingSettings,
    WipeCounts,
};
