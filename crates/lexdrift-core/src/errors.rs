//! Error taxonomy for lexdrift.
//!
//! A single flat [`DriftError`] enum covers all domains. Each variant maps
//! to a stable machine-readable code so callers can distinguish "system
//! occupied" (`CONFLICT`) from "stale session id" (`UNAUTHORIZED`) without
//! string matching.
//!
//! Synchronous operations return these errors directly. Training failures
//! are captured inside the job snapshot's `error` field instead — training
//! is asynchronous and its failures are observed via status polling only.

use thiserror::Error;

/// Errors raised by lexdrift operations.
#[derive(Debug, Error)]
pub enum DriftError {
    /// An exclusive resource is already taken: active session, running job,
    /// or duplicate index label.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Session id does not match the active session, or the session expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request validation failed (hyperparameters out of range, fewer than
    /// two indexes uploaded).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Alignment could not be fitted (insufficient shared vocabulary).
    #[error("Alignment failed: {0}")]
    Alignment(String),

    /// Analysis requested before any training generation completed.
    #[error("No trained models available: {0}")]
    NotReady(String),

    /// Training-stage failure, captured inside a failed job snapshot.
    #[error("Training failed: {0}")]
    Training(String),

    /// Entity lookup failed (topic or term id unknown).
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DriftError {
    /// Machine-readable error code, stable across releases.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "CONFLICT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Alignment(_) => "ALIGNMENT_ERROR",
            Self::NotReady(_) => "NOT_READY",
            Self::Training(_) => "TRAINING_FAILURE",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }

    /// Whether the caller can retry after external state changes (a session
    /// expiring, a job finishing) without modifying the request itself.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::NotReady(_))
    }
}

/// Result alias for lexdrift operations.
pub type Result<T> = std::result::Result<T, DriftError>;
