//! Skip-gram negative-sampling training.
//!
//! Two entry points share one inner loop:
//!
//! - [`train_independent`] trains input and output matrices for a single
//!   index (the Procrustes path trains each index this way, then rotates).
//! - [`train_slice`] trains only input vectors against a frozen compass
//!   output matrix, seeding input rows from the compass, so slices are
//!   comparable by construction.
//!
//! Training is CPU-bound and synchronous; callers run it on a blocking
//! thread and drive cancellation and progress through [`Hooks`].

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use lexdrift_core::errors::{DriftError, Result};

use crate::vocab::{NegativeSampler, Vocabulary};

/// Number of negative samples per positive pair.
const NEGATIVE_SAMPLES: usize = 5;

/// Initial learning rate (word2vec skip-gram default).
const INITIAL_LR: f32 = 0.025;

/// Floor the learning rate never decays below.
const MIN_LR: f32 = 0.0001;

/// SGNS hyperparameters for one run.
#[derive(Clone, Copy, Debug)]
pub struct SgnsParams {
    /// Embedding dimensionality.
    pub vector_dim: usize,
    /// Context window radius; the effective radius is sampled uniformly
    /// from `1..=window` per position, as word2vec does.
    pub window: usize,
    /// Passes over the token stream.
    pub epochs: usize,
}

/// Caller-provided training hooks.
///
/// `on_epoch(finished, total)` fires after each epoch; `is_cancelled` is
/// polled between epochs and training stops writing once it returns true.
#[derive(Default)]
pub struct Hooks<'a> {
    /// Progress callback.
    pub on_epoch: Option<&'a (dyn Fn(usize, usize) + Send + Sync)>,
    /// Cancellation probe.
    pub is_cancelled: Option<&'a (dyn Fn() -> bool + Send + Sync)>,
}

impl Hooks<'_> {
    fn cancelled(&self) -> bool {
        self.is_cancelled.is_some_and(|f| f())
    }

    fn epoch_done(&self, finished: usize, total: usize) {
        if let Some(f) = self.on_epoch {
            f(finished, total);
        }
    }
}

/// Input and output matrices produced by independent training.
#[derive(Clone, Debug)]
pub struct SgnsOutcome {
    /// Word vectors (rows indexed by vocabulary id).
    pub input: Array2<f32>,
    /// Context vectors, kept so a compass can freeze them.
    pub output: Array2<f32>,
}

/// Frozen compass sub-space for slice training.
pub struct FrozenCompass<'a> {
    /// Compass vocabulary (context word ids).
    pub vocab: &'a Vocabulary,
    /// Frozen context matrix.
    pub output: &'a Array2<f32>,
    /// Compass word vectors used to seed slice input rows.
    pub input: &'a Array2<f32>,
}

/// Train an independent SGNS model over one index's tokens.
pub fn train_independent(
    tokens: &[String],
    vocab: &Vocabulary,
    params: &SgnsParams,
    seed: u64,
    hooks: &Hooks<'_>,
) -> Result<SgnsOutcome> {
    if vocab.is_empty() {
        return Err(DriftError::Training(
            "vocabulary is empty after min_count filtering".into(),
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut input = init_input(vocab.len(), params.vector_dim, &mut rng);
    let mut output = Array2::<f32>::zeros((vocab.len(), params.vector_dim));
    let sampler = vocab.sampler();

    let centers = vocab.encode(tokens);
    let contexts = centers.clone();
    run_epochs(EpochRun {
        centers: &centers,
        contexts: &contexts,
        input: &mut input,
        output: &mut output,
        freeze_output: false,
        sampler: &sampler,
        params,
        rng: &mut rng,
        hooks,
    })?;

    Ok(SgnsOutcome { input, output })
}

/// Train one slice's input vectors against a frozen compass.
///
/// The slice vocabulary must be a subset of the compass vocabulary (both
/// are built with the same min-count, and slice counts never exceed pooled
/// counts).
pub fn train_slice(
    tokens: &[String],
    vocab: &Vocabulary,
    compass: &FrozenCompass<'_>,
    params: &SgnsParams,
    seed: u64,
    hooks: &Hooks<'_>,
) -> Result<Array2<f32>> {
    if vocab.is_empty() {
        return Err(DriftError::Training(
            "slice vocabulary is empty after min_count filtering".into(),
        ));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut input = init_input(vocab.len(), params.vector_dim, &mut rng);

    // Seed slice rows from the compass so slices start in its frame.
    for (id, word) in vocab.words().iter().enumerate() {
        let Some(compass_id) = compass.vocab.get(word) else {
            return Err(DriftError::Training(format!(
                "slice word '{word}' missing from compass vocabulary"
            )));
        };
        input.row_mut(id).assign(&compass.input.row(compass_id));
    }

    let retained: Vec<&String> = tokens.iter().filter(|t| vocab.contains(t)).collect();
    let centers: Vec<usize> = retained
        .iter()
        .map(|t| vocab.get(t).expect("retained token"))
        .collect();
    let contexts: Vec<usize> = retained
        .iter()
        .map(|t| compass.vocab.get(t).expect("subset of compass vocab"))
        .collect();

    let sampler = compass.vocab.sampler();
    let mut frozen = compass.output.clone();
    run_epochs(EpochRun {
        centers: &centers,
        contexts: &contexts,
        input: &mut input,
        output: &mut frozen,
        freeze_output: true,
        sampler: &sampler,
        params,
        rng: &mut rng,
        hooks,
    })?;

    Ok(input)
}

/// Uniform init in `[-0.5/dim, 0.5/dim)`, the word2vec convention.
fn init_input(rows: usize, dim: usize, rng: &mut StdRng) -> Array2<f32> {
    #[allow(clippy::cast_precision_loss)]
    let bound = 0.5 / dim as f32;
    Array2::from_shape_fn((rows, dim), |_| rng.random_range(-bound..bound))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Borrowed state for one training run.
///
/// `centers[i]` indexes the input matrix; `contexts[i]` indexes the output
/// matrix (they differ only for slice training, where the output side uses
/// compass ids). With `freeze_output` set, the context matrix participates
/// in dot products but receives no updates.
struct EpochRun<'a, 'h> {
    centers: &'a [usize],
    contexts: &'a [usize],
    input: &'a mut Array2<f32>,
    output: &'a mut Array2<f32>,
    freeze_output: bool,
    sampler: &'a NegativeSampler,
    params: &'a SgnsParams,
    rng: &'a mut StdRng,
    hooks: &'a Hooks<'h>,
}

fn run_epochs(run: EpochRun<'_, '_>) -> Result<()> {
    let EpochRun {
        centers,
        contexts,
        input,
        output,
        freeze_output,
        sampler,
        params,
        rng,
        hooks,
    } = run;
    debug_assert_eq!(centers.len(), contexts.len());
    if centers.len() < 2 {
        return Err(DriftError::Training(
            "not enough in-vocabulary tokens to form context pairs".into(),
        ));
    }

    let dim = params.vector_dim;
    #[allow(clippy::cast_precision_loss)]
    let total_positions = (params.epochs * centers.len()) as f32;
    let mut seen = 0.0_f32;
    let mut gradient = Array1::<f32>::zeros(dim);

    for epoch in 0..params.epochs {
        if hooks.cancelled() {
            return Err(DriftError::Training("training cancelled".into()));
        }

        for i in 0..centers.len() {
            seen += 1.0;
            let lr = (INITIAL_LR * (1.0 - seen / total_positions)).max(MIN_LR);
            let center = centers[i];
            let radius = rng.random_range(1..=params.window);
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(centers.len() - 1);

            for j in lo..=hi {
                if j == i {
                    continue;
                }
                let positive = contexts[j];
                gradient.fill(0.0);

                for k in 0..=NEGATIVE_SAMPLES {
                    let (target, label) = if k == 0 {
                        (positive, 1.0_f32)
                    } else {
                        (sampler.sample(rng), 0.0_f32)
                    };
                    // A negative draw that hits the positive word is skipped.
                    if k > 0 && target == positive {
                        continue;
                    }
                    let dot = input.row(center).dot(&output.row(target));
                    let g = (label - sigmoid(dot)) * lr;
                    gradient.scaled_add(g, &output.row(target));
                    if !freeze_output {
                        let center_row = input.row(center).to_owned();
                        output.row_mut(target).scaled_add(g, &center_row);
                    }
                }
                input.row_mut(center).scaled_add(1.0, &gradient);
            }
        }
        hooks.epoch_done(epoch + 1, params.epochs);
    }
    debug!(
        epochs = params.epochs,
        positions = centers.len(),
        "sgns training finished"
    );
    Ok(())
}
