//! # lexdrift-jobs
//!
//! Asynchronous training+alignment job execution.
//!
//! One cancellable background job per session runs the whole pipeline —
//! per-index training, then alignment — off the request path. Progress is
//! published as immutable [`lexdrift_core::types::TrainingJob`] snapshots
//! that status polling reads without ever blocking on the training thread.

#![deny(unsafe_code)]

mod engine;

pub use engine::{StartedTraining, TrainingJobEngine};
