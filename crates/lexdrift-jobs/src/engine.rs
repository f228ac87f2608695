//! Training job engine — validation, background execution, snapshots.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use lexdrift_align::align;
use lexdrift_align::compass::CompassSpace;
use lexdrift_core::constants::MIN_INDEXES;
use lexdrift_core::errors::{DriftError, Result};
use lexdrift_core::ids::SessionId;
use lexdrift_core::types::{AlignmentMethod, JobStatus, TrainingJob, TrainingSettings};
use lexdrift_corpus::{CorpusStore, IndexedTokens};
use lexdrift_embeddings::model::{Generation, TrainedModel, WordSpace};
use lexdrift_embeddings::sgns::{self, Hooks, SgnsParams};
use lexdrift_embeddings::store::GenerationStore;
use lexdrift_embeddings::vocab::Vocabulary;

/// Acknowledgement returned by a successful `start`.
#[derive(Clone, Debug, Serialize)]
pub struct StartedTraining {
    /// Index labels included in the run, in upload order.
    pub labels: Vec<String>,
    /// The settings the job runs with.
    pub settings: TrainingSettings,
}

/// Shared state between the engine and its background task.
struct JobState {
    snapshot: RwLock<Option<Arc<TrainingJob>>>,
    cancel: Mutex<Option<CancellationToken>>,
}

/// Runs one training+alignment job per session in the background.
pub struct TrainingJobEngine {
    corpus: Arc<CorpusStore>,
    generations: Arc<GenerationStore>,
    state: Arc<JobState>,
}

impl TrainingJobEngine {
    /// Create an engine over the session's corpus and generation store.
    #[must_use]
    pub fn new(corpus: Arc<CorpusStore>, generations: Arc<GenerationStore>) -> Self {
        Self {
            corpus,
            generations,
            state: Arc::new(JobState {
                snapshot: RwLock::new(None),
                cancel: Mutex::new(None),
            }),
        }
    }

    /// Start a training+alignment job for the session.
    ///
    /// Validates hyperparameters and index count synchronously, then spawns
    /// the CPU-bound pipeline on a blocking thread. The result is observed
    /// via [`Self::status`] polling; failures never surface here.
    pub fn start(
        &self,
        session_id: SessionId,
        settings: TrainingSettings,
    ) -> Result<StartedTraining> {
        settings.validate()?;

        let corpora = self.corpus.all();
        if corpora.len() < MIN_INDEXES {
            return Err(DriftError::InvalidInput(format!(
                "alignment requires at least {MIN_INDEXES} indexes, found {}",
                corpora.len()
            )));
        }

        let cancel = {
            let mut snapshot = self.state.snapshot.write();
            if let Some(job) = snapshot.as_ref() {
                if job.status == JobStatus::Running {
                    return Err(DriftError::Conflict(
                        "a training job is already running for this session".into(),
                    ));
                }
            }

            // Per-index training steps plus one alignment step. For the
            // compass method the extra step is the compass itself, trained
            // before the slices.
            let total_steps = corpora.len() + 1;
            let job = TrainingJob::started(
                session_id,
                total_steps,
                format!(
                    "training and alignment started using {} method",
                    settings.alignment_method
                ),
            );
            *snapshot = Some(Arc::new(job));

            let cancel = CancellationToken::new();
            *self.state.cancel.lock() = Some(cancel.clone());
            cancel
        };

        let labels: Vec<String> = corpora.iter().map(|ix| ix.label.clone()).collect();
        info!(indexes = labels.len(), method = %settings.alignment_method, "training job started");

        let state = Arc::clone(&self.state);
        let generations = Arc::clone(&self.generations);
        let job_settings = settings.clone();
        let _handle = tokio::task::spawn_blocking(move || {
            run_pipeline(&state, &generations, &corpora, &job_settings, &cancel);
        });

        Ok(StartedTraining { labels, settings })
    }

    /// Current job snapshot for the session; `not_found` when no job was
    /// ever started (or the session's job was cancelled by termination).
    #[must_use]
    pub fn status(&self, session_id: &SessionId) -> TrainingJob {
        let snapshot = self.state.snapshot.read();
        match snapshot.as_ref() {
            Some(job) if &job.session_id == session_id => (**job).clone(),
            _ => TrainingJob::not_found(session_id.clone()),
        }
    }

    /// Cancel any in-flight job and forget its snapshot.
    ///
    /// Called by session teardown; subsequent status queries report
    /// `not_found` and the job stops publishing once it observes the
    /// cancellation.
    pub fn cancel_and_clear(&self) {
        if let Some(cancel) = self.state.cancel.lock().take() {
            cancel.cancel();
        }
        let had_job = self.state.snapshot.write().take().is_some();
        if had_job {
            info!("training job cancelled and cleared");
        }
    }

    /// Whether a job is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state
            .snapshot
            .read()
            .as_ref()
            .is_some_and(|job| job.status == JobStatus::Running)
    }
}

/// Derive the next snapshot from the current one and swap it in, unless the
/// job has been cancelled or cleared.
fn publish_with(
    state: &JobState,
    cancel: &CancellationToken,
    next: impl FnOnce(&TrainingJob) -> TrainingJob,
) {
    if cancel.is_cancelled() {
        return;
    }
    let mut snapshot = state.snapshot.write();
    if let Some(job) = snapshot.as_ref() {
        *snapshot = Some(Arc::new(next(job)));
    }
}

/// The blocking pipeline: train every index, align, commit, publish.
fn run_pipeline(
    state: &JobState,
    generations: &GenerationStore,
    corpora: &[IndexedTokens],
    settings: &TrainingSettings,
    cancel: &CancellationToken,
) {
    let outcome = match settings.alignment_method {
        AlignmentMethod::Procrustes => train_procrustes(state, corpora, settings, cancel),
        AlignmentMethod::Compass => train_compass(state, corpora, settings, cancel),
    };

    match outcome {
        Ok(generation) => {
            if cancel.is_cancelled() {
                warn!("training finished after cancellation; discarding results");
                return;
            }
            // Commit before the completed snapshot: a `completed` status is
            // only observable once the generation is readable.
            generations.commit(generation);
            publish_with(state, cancel, |job| {
                job.completed("training and alignment completed successfully")
            });
            info!("training job completed");
        }
        Err(err) => {
            if cancel.is_cancelled() {
                return;
            }
            error!(error = %err, "training job failed");
            publish_with(state, cancel, |job| job.failed(err.to_string()));
        }
    }
}

/// Independent per-index training followed by Procrustes rotation.
fn train_procrustes(
    state: &JobState,
    corpora: &[IndexedTokens],
    settings: &TrainingSettings,
    cancel: &CancellationToken,
) -> Result<Generation> {
    let params = sgns_params(settings);
    let total = corpora.len();
    let mut models = Vec::with_capacity(total);

    for (i, index) in corpora.iter().enumerate() {
        let model = train_one(state, index, settings, &params, cancel, i, total)?;
        models.push(model);
        publish_with(state, cancel, |job| {
            job.with_progress(
                i + 1,
                format!("trained model {}/{total} ('{}')", i + 1, index.label),
            )
        });
    }

    publish_with(state, cancel, |job| {
        job.with_progress(total, "aligning models with procrustes")
    });
    let aligned = align(&models, AlignmentMethod::Procrustes)?;
    Ok(Generation::new(models, aligned, AlignmentMethod::Procrustes))
}

/// Compass training: pooled compass first, then one anchored slice per index.
fn train_compass(
    state: &JobState,
    corpora: &[IndexedTokens],
    settings: &TrainingSettings,
    cancel: &CancellationToken,
) -> Result<Generation> {
    let params = sgns_params(settings);
    let total = corpora.len();

    publish_with(state, cancel, |job| {
        job.with_progress(0, "training compass over pooled corpus")
    });

    let pooled: Vec<String> = corpora
        .iter()
        .flat_map(|ix| ix.tokens.iter().cloned())
        .collect();
    let is_cancelled = || cancel.is_cancelled();
    let hooks = Hooks {
        on_epoch: None,
        is_cancelled: Some(&is_cancelled),
    };
    let compass = CompassSpace::build(
        &pooled,
        &params,
        settings.min_count,
        derive_seed(settings.seed, "compass"),
        &hooks,
    )?;

    publish_with(state, cancel, |job| {
        job.with_progress(1, format!("compass trained ({} words)", compass.vocab_size()))
    });

    let mut models = Vec::with_capacity(total);
    for (i, index) in corpora.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(DriftError::Training("training cancelled".into()));
        }
        let seed = derive_seed(settings.seed, &index.label);
        let model = compass.train_slice(
            &index.label,
            &index.tokens,
            &params,
            settings.min_count,
            seed,
            &hooks,
        )?;
        models.push(model);
        publish_with(state, cancel, |job| {
            job.with_progress(
                i + 2,
                format!("trained slice {}/{total} ('{}')", i + 1, index.label),
            )
        });
    }

    let aligned = align(&models, AlignmentMethod::Compass)?;
    Ok(Generation::new(models, aligned, AlignmentMethod::Compass))
}

/// Train one index independently, publishing per-epoch progress.
fn train_one(
    state: &JobState,
    index: &IndexedTokens,
    settings: &TrainingSettings,
    params: &SgnsParams,
    cancel: &CancellationToken,
    position: usize,
    n_models: usize,
) -> Result<TrainedModel> {
    let vocab = Vocabulary::build(&index.tokens, settings.min_count);
    let label = index.label.clone();

    // Epoch ticks refine the message but keep the step counter at the
    // number of fully trained indexes.
    let on_epoch = move |epoch: usize, total_epochs: usize| {
        let message = format!(
            "training model {}/{n_models} ('{label}'): epoch {epoch}/{total_epochs}",
            position + 1
        );
        publish_with(state, cancel, |job| job.with_progress(position, message.clone()));
    };
    let is_cancelled = || cancel.is_cancelled();
    let hooks = Hooks {
        on_epoch: Some(&on_epoch),
        is_cancelled: Some(&is_cancelled),
    };

    let seed = derive_seed(settings.seed, &index.label);
    let outcome = sgns::train_independent(&index.tokens, &vocab, params, seed, &hooks)
        .map_err(|e| DriftError::Training(format!("index '{}': {e}", index.label)))?;

    Ok(TrainedModel::new(
        index.label.clone(),
        WordSpace::new(vocab, outcome.input),
    ))
}

fn sgns_params(settings: &TrainingSettings) -> SgnsParams {
    SgnsParams {
        vector_dim: settings.vector_dim,
        window: settings.window,
        epochs: settings.epochs,
    }
}

/// FNV-1a over the label, folded with the optional base seed, so every
/// index trains deterministically yet differently.
fn derive_seed(base: Option<u64>, label: &str) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64 ^ base.unwrap_or(0x9e37_79b9_7f4a_7c15);
    for byte in label.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
