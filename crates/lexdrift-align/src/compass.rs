//! Compass (shared-anchor) joint training.
//!
//! A compass model is trained once over the pooled text of every index.
//! Each index is then trained as a slice with the compass's context matrix
//! frozen and its word vectors seeded from the compass, so all slices share
//! the compass coordinate frame by construction — no post-hoc rotation.

use ndarray::Array2;
use tracing::info;

use lexdrift_core::errors::Result;
use lexdrift_embeddings::model::{TrainedModel, WordSpace};
use lexdrift_embeddings::sgns::{self, FrozenCompass, Hooks, SgnsParams};
use lexdrift_embeddings::vocab::Vocabulary;

/// The shared frozen sub-space every slice trains against.
pub struct CompassSpace {
    vocab: Vocabulary,
    input: Array2<f32>,
    output: Array2<f32>,
}

impl CompassSpace {
    /// Train the compass over the pooled tokens of all indexes.
    ///
    /// `min_count` must match the per-slice value so every slice vocabulary
    /// is a subset of the compass vocabulary.
    pub fn build(
        pooled_tokens: &[String],
        params: &SgnsParams,
        min_count: usize,
        seed: u64,
        hooks: &Hooks<'_>,
    ) -> Result<Self> {
        let vocab = Vocabulary::build(pooled_tokens, min_count);
        info!(vocab = vocab.len(), "training compass over pooled corpus");
        let outcome = sgns::train_independent(pooled_tokens, &vocab, params, seed, hooks)?;
        Ok(Self {
            vocab,
            input: outcome.input,
            output: outcome.output,
        })
    }

    /// Compass vocabulary size.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Train one index as a slice anchored to this compass.
    pub fn train_slice(
        &self,
        label: &str,
        tokens: &[String],
        params: &SgnsParams,
        min_count: usize,
        seed: u64,
        hooks: &Hooks<'_>,
    ) -> Result<TrainedModel> {
        let vocab = Vocabulary::build(tokens, min_count);
        let frozen = FrozenCompass {
            vocab: &self.vocab,
            output: &self.output,
            input: &self.input,
        };
        let vectors = sgns::train_slice(tokens, &vocab, &frozen, params, seed, hooks)?;
        Ok(TrainedModel::new(label, WordSpace::new(vocab, vectors)))
    }
}
