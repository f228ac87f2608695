//! Trained and aligned model wrappers.

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView1};

use lexdrift_core::types::AlignmentMethod;

use crate::math::cosine_similarity;
use crate::vocab::Vocabulary;

/// A vocabulary paired with its word vectors.
///
/// Shared by trained and aligned models; all similarity queries go through
/// this type.
#[derive(Clone, Debug)]
pub struct WordSpace {
    vocab: Vocabulary,
    vectors: Array2<f32>,
}

impl WordSpace {
    /// Pair a vocabulary with its vector matrix (rows indexed by word id).
    #[must_use]
    pub fn new(vocab: Vocabulary, vectors: Array2<f32>) -> Self {
        debug_assert_eq!(vocab.len(), vectors.nrows());
        Self { vocab, vectors }
    }

    /// Embedding dimensionality.
    #[must_use]
    pub fn vector_dim(&self) -> usize {
        self.vectors.ncols()
    }

    /// Number of words.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// The vocabulary.
    #[must_use]
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The raw vector matrix.
    #[must_use]
    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }

    /// Vector for a word, if in vocabulary.
    #[must_use]
    pub fn vector(&self, word: &str) -> Option<ArrayView1<'_, f32>> {
        self.vocab.get(word).map(|id| self.vectors.row(id))
    }

    /// Cosine similarity between two words; `None` when either is OOV.
    #[must_use]
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let va = self.vector(a)?;
        let vb = self.vector(b)?;
        Some(cosine_similarity(
            va.as_slice().expect("contiguous row"),
            vb.as_slice().expect("contiguous row"),
        ))
    }

    /// Top-`n` most similar words, descending by cosine similarity.
    ///
    /// The query word itself is excluded. Ties keep vocabulary insertion
    /// order (the sort is stable over insertion-ordered candidates).
    /// Returns `None` when the word is OOV.
    #[must_use]
    pub fn most_similar(&self, word: &str, n: usize) -> Option<Vec<(String, f32)>> {
        let query_id = self.vocab.get(word)?;
        let query = self.vectors.row(query_id);
        let query_slice = query.as_slice().expect("contiguous row");

        let mut scored: Vec<(usize, f32)> = (0..self.vocab.len())
            .filter(|&id| id != query_id)
            .map(|id| {
                let candidate = self.vectors.row(id);
                (
                    id,
                    cosine_similarity(
                        query_slice,
                        candidate.as_slice().expect("contiguous row"),
                    ),
                )
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(n);

        Some(
            scored
                .into_iter()
                .map(|(id, sim)| (self.vocab.word(id).to_owned(), sim))
                .collect(),
        )
    }
}

/// One index's independently trained embedding space.
///
/// Superseded, never mutated, by a new training run.
#[derive(Clone, Debug)]
pub struct TrainedModel {
    /// Index label.
    pub label: String,
    /// Vocabulary and vectors.
    pub space: WordSpace,
    /// When training finished.
    pub created_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Wrap a freshly trained space.
    #[must_use]
    pub fn new(label: impl Into<String>, space: WordSpace) -> Self {
        Self {
            label: label.into(),
            space,
            created_at: Utc::now(),
        }
    }
}

/// One index's space after alignment into the shared coordinate frame.
#[derive(Clone, Debug)]
pub struct AlignedModel {
    /// Index label.
    pub label: String,
    /// Vocabulary and aligned vectors.
    pub space: WordSpace,
}

impl AlignedModel {
    /// Wrap an aligned space.
    #[must_use]
    pub fn new(label: impl Into<String>, space: WordSpace) -> Self {
        Self {
            label: label.into(),
            space,
        }
    }
}

/// One committed training+alignment generation.
///
/// Valid only as a whole: the aligned models are derived from exactly these
/// trained models. A new run replaces the generation atomically.
#[derive(Clone, Debug)]
pub struct Generation {
    /// Per-index trained models, in upload order.
    pub models: Vec<TrainedModel>,
    /// Per-index aligned models, in upload order.
    pub aligned: Vec<AlignedModel>,
    /// Method that produced the shared coordinate frame.
    pub method: AlignmentMethod,
    /// When the generation was committed.
    pub created_at: DateTime<Utc>,
}

impl Generation {
    /// Assemble a generation; stamps the commit time.
    #[must_use]
    pub fn new(
        models: Vec<TrainedModel>,
        aligned: Vec<AlignedModel>,
        method: AlignmentMethod,
    ) -> Self {
        Self {
            models,
            aligned,
            method,
            created_at: Utc::now(),
        }
    }

    /// Aligned model for a label, if present.
    #[must_use]
    pub fn aligned_for(&self, label: &str) -> Option<&AlignedModel> {
        self.aligned.iter().find(|m| m.label == label)
    }
}
