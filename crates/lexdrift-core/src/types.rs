//! Shared wire and domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{EPOCHS_RANGE, VECTOR_DIM_RANGE};
use crate::errors::{DriftError, Result};
use crate::ids::SessionId;

// ─────────────────────────────────────────────────────────────────────────────
// Training settings
// ─────────────────────────────────────────────────────────────────────────────

/// Alignment method selected per training run.
///
/// Modeled as a tagged variant, not inheritance: a single `align` entry
/// point dispatches to one of two independent pure paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMethod {
    /// Post-hoc orthogonal transformation fitted on shared vocabulary.
    Procrustes,
    /// Joint training against a shared frozen compass sub-space.
    Compass,
}

impl fmt::Display for AlignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Procrustes => write!(f, "procrustes"),
            Self::Compass => write!(f, "compass"),
        }
    }
}

/// Hyperparameters for one training+alignment run.
///
/// Shared by every per-index model of the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSettings {
    /// Embedding dimensionality.
    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,
    /// Context window radius in tokens.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Words occurring fewer times than this are dropped from the vocabulary.
    #[serde(default = "default_min_count")]
    pub min_count: usize,
    /// Number of passes over each index's tokens.
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// How the trained spaces are made comparable.
    #[serde(default = "default_alignment_method")]
    pub alignment_method: AlignmentMethod,
    /// RNG seed; `None` derives one per index from its label.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_vector_dim() -> usize {
    100
}
fn default_window() -> usize {
    20
}
fn default_min_count() -> usize {
    2
}
fn default_epochs() -> usize {
    20
}
fn default_alignment_method() -> AlignmentMethod {
    AlignmentMethod::Compass
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            vector_dim: default_vector_dim(),
            window: default_window(),
            min_count: default_min_count(),
            epochs: default_epochs(),
            alignment_method: default_alignment_method(),
            seed: None,
        }
    }
}

impl TrainingSettings {
    /// Validate hyperparameter ranges.
    pub fn validate(&self) -> Result<()> {
        let (dim_lo, dim_hi) = VECTOR_DIM_RANGE;
        if self.vector_dim < dim_lo || self.vector_dim > dim_hi {
            return Err(DriftError::InvalidInput(format!(
                "vector_dim must be in {dim_lo}..={dim_hi}, got {}",
                self.vector_dim
            )));
        }
        if self.window == 0 {
            return Err(DriftError::InvalidInput("window must be >= 1".into()));
        }
        if self.min_count == 0 {
            return Err(DriftError::InvalidInput("min_count must be >= 1".into()));
        }
        let (ep_lo, ep_hi) = EPOCHS_RANGE;
        if self.epochs < ep_lo || self.epochs > ep_hi {
            return Err(DriftError::InvalidInput(format!(
                "epochs must be in {ep_lo}..={ep_hi}, got {}",
                self.epochs
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Training job snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a training job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// No job was ever started for this session.
    NotFound,
    /// Training or alignment is in progress.
    Running,
    /// Training and alignment both committed successfully.
    Completed,
    /// Training or alignment raised; see `error`.
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl JobStatus {
    /// Whether the job has reached a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Immutable snapshot of a training job's progress.
///
/// Progress writes swap in a whole new snapshot; readers never observe a
/// half-written state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingJob {
    /// Owning session.
    pub session_id: SessionId,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Steps finished so far (one per index, plus one for alignment).
    pub current_step: usize,
    /// Total steps for this run.
    pub total_steps: usize,
    /// Human-readable progress message.
    pub message: String,
    /// Failure description when `status` is `failed`.
    pub error: Option<String>,
    /// When the job was started; absent for `not_found`.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

impl TrainingJob {
    /// Create a fresh `running` snapshot at step zero.
    #[must_use]
    pub fn started(session_id: SessionId, total_steps: usize, message: impl Into<String>) -> Self {
        Self {
            session_id,
            status: JobStatus::Running,
            current_step: 0,
            total_steps,
            message: message.into(),
            error: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        }
    }

    /// Placeholder snapshot for a session that never started a job.
    #[must_use]
    pub fn not_found(session_id: SessionId) -> Self {
        Self {
            session_id,
            status: JobStatus::NotFound,
            current_step: 0,
            total_steps: 0,
            message: "no training job found for this session".into(),
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Derive a new snapshot with updated progress.
    #[must_use]
    pub fn with_progress(&self, current_step: usize, message: impl Into<String>) -> Self {
        Self {
            current_step,
            message: message.into(),
            ..self.clone()
        }
    }

    /// Derive a terminal `completed` snapshot.
    #[must_use]
    pub fn completed(&self, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            current_step: self.total_steps,
            message: message.into(),
            finished_at: Some(Utc::now()),
            ..self.clone()
        }
    }

    /// Derive a terminal `failed` snapshot capturing the error.
    #[must_use]
    pub fn failed(&self, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            status: JobStatus::Failed,
            message: format!("Training and alignment failed: {error}"),
            error: Some(error),
            finished_at: Some(Utc::now()),
            ..self.clone()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Analysis records
// ─────────────────────────────────────────────────────────────────────────────

/// Cosine similarity between a topic and a related term within one index.
///
/// `similarity` is `None` exactly when either word is out-of-vocabulary for
/// that index — never zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    /// Topic name.
    pub topic: String,
    /// Related term.
    pub related_term: String,
    /// Index label.
    pub label: String,
    /// Cosine similarity in `[-1, 1]`, or `None` when OOV.
    pub similarity: Option<f32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Corpus statistics & wipe counts
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only statistics over the uploaded corpus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Number of distinct indexes.
    pub indexes: usize,
    /// Total token count across all indexes.
    pub tokens: usize,
    /// Total character count across all tokens.
    pub characters: usize,
}

/// Per-entity counts reported by a session wipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipeCounts {
    /// Corpus indexes removed.
    pub indexes: usize,
    /// Topics removed.
    pub topics: usize,
    /// Related terms removed.
    pub terms: usize,
}

impl WipeCounts {
    /// Whether anything was actually removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes == 0 && self.topics == 0 && self.terms == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- TrainingSettings --

    #[test]
    fn default_settings_are_valid() {
        let settings = TrainingSettings::default();
        settings.validate().unwrap();
        assert_eq!(settings.vector_dim, 100);
        assert_eq!(settings.window, 20);
        assert_eq!(settings.min_count, 2);
        assert_eq!(settings.epochs, 20);
        assert_eq!(settings.alignment_method, AlignmentMethod::Compass);
    }

    #[test]
    fn zero_vector_dim_rejected() {
        let settings = TrainingSettings {
            vector_dim: 0,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn oversized_vector_dim_rejected() {
        let settings = TrainingSettings {
            vector_dim: 4096,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let settings = TrainingSettings {
            window: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_min_count_rejected() {
        let settings = TrainingSettings {
            min_count: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_epochs_rejected() {
        let settings = TrainingSettings {
            epochs: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: TrainingSettings =
            serde_json::from_str(r#"{"alignment_method":"procrustes"}"#).unwrap();
        assert_eq!(settings.alignment_method, AlignmentMethod::Procrustes);
        assert_eq!(settings.vector_dim, 100);
    }

    #[test]
    fn alignment_method_serde() {
        assert_eq!(
            serde_json::to_string(&AlignmentMethod::Procrustes).unwrap(),
            "\"procrustes\""
        );
        assert_eq!(
            serde_json::to_string(&AlignmentMethod::Compass).unwrap(),
            "\"compass\""
        );
    }

    #[test]
    fn alignment_method_display() {
        assert_eq!(AlignmentMethod::Procrustes.to_string(), "procrustes");
        assert_eq!(AlignmentMethod::Compass.to_string(), "compass");
    }

    // -- JobStatus / TrainingJob --

    #[test]
    fn job_status_serde_values() {
        assert_eq!(
            serde_json::to_string(&JobStatus::NotFound).unwrap(),
            "\"not_found\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn job_status_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::NotFound.is_terminal());
    }

    #[test]
    fn job_started_snapshot() {
        let job = TrainingJob::started(SessionId::from("s1"), 3, "starting");
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.current_step, 0);
        assert_eq!(job.total_steps, 3);
        assert!(job.error.is_none());
        assert!(job.started_at.is_some());
        assert!(job.finished_at.is_none());
    }

    #[test]
    fn job_not_found_snapshot() {
        let job = TrainingJob::not_found(SessionId::from("s1"));
        assert_eq!(job.status, JobStatus::NotFound);
        assert!(job.started_at.is_none());
        assert_eq!(job.total_steps, 0);
    }

    #[test]
    fn job_progress_derives_new_snapshot() {
        let job = TrainingJob::started(SessionId::from("s1"), 3, "starting");
        let next = job.with_progress(1, "trained 1990");
        assert_eq!(job.current_step, 0, "original untouched");
        assert_eq!(next.current_step, 1);
        assert_eq!(next.message, "trained 1990");
        assert_eq!(next.status, JobStatus::Running);
    }

    #[test]
    fn job_completed_fills_steps_and_time() {
        let job = TrainingJob::started(SessionId::from("s1"), 3, "starting");
        let done = job.completed("all done");
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.current_step, 3);
        assert!(done.finished_at.is_some());
        assert!(done.error.is_none());
    }

    #[test]
    fn job_failed_captures_error() {
        let job = TrainingJob::started(SessionId::from("s1"), 3, "starting");
        let failed = job.failed("index 2010 is empty");
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("index 2010 is empty"));
        assert!(failed.message.contains("index 2010 is empty"));
        assert!(failed.finished_at.is_some());
    }

    // -- Records --

    #[test]
    fn similarity_record_none_serializes_as_null() {
        let record = SimilarityRecord {
            topic: "healthcare".into(),
            related_term: "technology".into(),
            label: "1990".into(),
            similarity: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["similarity"].is_null());
    }

    #[test]
    fn wipe_counts_empty() {
        assert!(WipeCounts::default().is_empty());
        assert!(
            !WipeCounts {
                indexes: 1,
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn corpus_stats_default_is_zero() {
        let stats = CorpusStats::default();
        assert_eq!(stats.indexes, 0);
        assert_eq!(stats.tokens, 0);
        assert_eq!(stats.characters, 0);
    }
}
