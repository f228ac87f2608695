//! Similarity and neighbor analysis over the committed generation.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use lexdrift_core::errors::{DriftError, Result};
use lexdrift_core::types::SimilarityRecord;
use lexdrift_embeddings::store::GenerationStore;

use crate::terms::TopicWithTerms;

/// Full set of topic/term/index similarity records.
#[derive(Clone, Debug, Serialize)]
pub struct SimilarityReport {
    /// One record per (topic, related term, index) triple.
    pub similarities: Vec<SimilarityRecord>,
    /// Total record count.
    pub total: usize,
}

/// A single ranked neighbor.
#[derive(Clone, Debug, Serialize)]
pub struct Neighbor {
    /// The neighboring word.
    pub word: String,
    /// Cosine similarity to the query word.
    pub similarity: f32,
    /// 1-based rank, descending by similarity.
    pub rank: usize,
}

/// Neighbors of the query word within one index.
///
/// `found` distinguishes an out-of-vocabulary word from a word with an
/// empty neighbor list; the two must never be conflated.
#[derive(Clone, Debug, Serialize)]
pub struct NeighborEntry {
    /// Index label.
    pub label: String,
    /// Whether the query word exists in this index's vocabulary.
    pub found: bool,
    /// Ranked neighbors; empty when `found` is false.
    pub neighbors: Vec<Neighbor>,
    /// Vocabulary size of this index's model.
    pub vocab_size: usize,
}

/// Per-index neighbor lists for one query word.
#[derive(Clone, Debug, Serialize)]
pub struct NeighborReport {
    /// The query word.
    pub word: String,
    /// One entry per index, in upload order.
    pub entries: Vec<NeighborEntry>,
    /// Number of indexes whose vocabulary contains the word.
    pub models_with_word: usize,
}

/// Computes similarity matrices and neighbor lists from aligned spaces.
pub struct SimilarityAnalyzer {
    generations: Arc<GenerationStore>,
}

impl SimilarityAnalyzer {
    /// Create an analyzer over the generation store.
    #[must_use]
    pub fn new(generations: Arc<GenerationStore>) -> Self {
        Self { generations }
    }

    /// Cosine similarity for every (topic, related term, index) triple.
    ///
    /// A record's similarity is `None` exactly when either word is missing
    /// from that index's aligned vocabulary. Fails with `NotReady` until a
    /// training generation has completed.
    pub fn cosine_similarities(&self, topics: &[TopicWithTerms]) -> Result<SimilarityReport> {
        let generation = self.generations.current().ok_or_else(|| {
            DriftError::NotReady("no trained models; run training first".into())
        })?;

        let mut similarities = Vec::new();
        for entry in topics {
            for related in &entry.related_terms {
                for model in &generation.aligned {
                    let similarity = model.space.similarity(&entry.topic.name, &related.term);
                    similarities.push(SimilarityRecord {
                        topic: entry.topic.name.clone(),
                        related_term: related.term.clone(),
                        label: model.label.clone(),
                        similarity,
                    });
                }
            }
        }

        debug!(records = similarities.len(), "similarity matrix computed");
        let total = similarities.len();
        Ok(SimilarityReport {
            similarities,
            total,
        })
    }

    /// Top-`topn` neighbors of `word` in every index.
    ///
    /// Indexes whose vocabulary lacks the word get a not-found entry;
    /// partial availability never aborts the query.
    pub fn neighbors(&self, word: &str, topn: usize) -> Result<NeighborReport> {
        let generation = self.generations.current().ok_or_else(|| {
            DriftError::NotReady("no trained models; run training first".into())
        })?;

        let mut entries = Vec::with_capacity(generation.aligned.len());
        let mut models_with_word = 0;

        for model in &generation.aligned {
            match model.space.most_similar(word, topn) {
                Some(ranked) => {
                    models_with_word += 1;
                    let neighbors = ranked
                        .into_iter()
                        .enumerate()
                        .map(|(i, (neighbor, similarity))| Neighbor {
                            word: neighbor,
                            similarity,
                            rank: i + 1,
                        })
                        .collect();
                    entries.push(NeighborEntry {
                        label: model.label.clone(),
                        found: true,
                        neighbors,
                        vocab_size: model.space.vocab_size(),
                    });
                }
                None => entries.push(NeighborEntry {
                    label: model.label.clone(),
                    found: false,
                    neighbors: Vec::new(),
                    vocab_size: model.space.vocab_size(),
                }),
            }
        }

        Ok(NeighborReport {
            word: word.to_owned(),
            entries,
            models_with_word,
        })
    }
}
