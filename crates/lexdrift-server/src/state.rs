//! Shared application state and session teardown wiring.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lexdrift_analysis::{SimilarityAnalyzer, TermStore};
use lexdrift_core::types::WipeCounts;
use lexdrift_corpus::CorpusStore;
use lexdrift_embeddings::GenerationStore;
use lexdrift_jobs::TrainingJobEngine;
use lexdrift_session::{SessionArbiter, Teardown};
use lexdrift_settings::AppSettings;

/// Tears down everything scoped to the session: cancels the training job,
/// then wipes corpus, topics/terms, and committed models.
pub struct SessionTeardown {
    corpus: Arc<CorpusStore>,
    terms: Arc<TermStore>,
    generations: Arc<GenerationStore>,
    jobs: Arc<TrainingJobEngine>,
}

impl Teardown for SessionTeardown {
    fn wipe(&self) -> WipeCounts {
        self.jobs.cancel_and_clear();
        let _ = self.generations.clear();
        let indexes = self.corpus.clear();
        let (topics, terms) = self.terms.clear();
        WipeCounts {
            indexes,
            topics,
            terms,
        }
    }
}

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session arbiter.
    pub arbiter: Arc<SessionArbiter>,
    /// Corpus store.
    pub corpus: Arc<CorpusStore>,
    /// Topic / related-term store.
    pub terms: Arc<TermStore>,
    /// Training job engine.
    pub jobs: Arc<TrainingJobEngine>,
    /// Similarity analyzer.
    pub analyzer: Arc<SimilarityAnalyzer>,
    /// Training defaults from settings.
    pub settings: Arc<AppSettings>,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    /// Wire up all engine components from settings.
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        let corpus = Arc::new(CorpusStore::new());
        let terms = Arc::new(TermStore::new());
        let generations = Arc::new(GenerationStore::new());
        let jobs = Arc::new(TrainingJobEngine::new(
            Arc::clone(&corpus),
            Arc::clone(&generations),
        ));
        let analyzer = Arc::new(SimilarityAnalyzer::new(Arc::clone(&generations)));

        let teardown = Arc::new(SessionTeardown {
            corpus: Arc::clone(&corpus),
            terms: Arc::clone(&terms),
            generations,
            jobs: Arc::clone(&jobs),
        });
        let arbiter = Arc::new(SessionArbiter::new(
            Duration::from_secs(settings.session.ttl_secs),
            teardown,
        ));

        Self {
            arbiter,
            corpus,
            terms,
            jobs,
            analyzer,
            settings: Arc::new(settings),
            start_time: Instant::now(),
        }
    }
}
