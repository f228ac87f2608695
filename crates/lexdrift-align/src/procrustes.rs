//! Orthogonal Procrustes alignment onto a reference index.
//!
//! The first model (upload order) is the reference. For every other model,
//! the rotation/reflection minimizing the squared distance between shared-
//! vocabulary vectors is fitted via SVD of the cross-covariance matrix and
//! then applied to the model's entire vocabulary, so words outside the
//! intersection land in the shared frame too.

use ndarray::{Array2, Axis};
use tracing::{debug, info};

use lexdrift_core::constants::MIN_SHARED_VOCAB;
use lexdrift_core::errors::{DriftError, Result};
use lexdrift_embeddings::model::{AlignedModel, TrainedModel, WordSpace};

use crate::svd::svd_jacobi;

/// Align every model onto the first model's coordinate frame.
pub fn align_to_reference(models: &[TrainedModel]) -> Result<Vec<AlignedModel>> {
    let Some(reference) = models.first() else {
        return Err(DriftError::Alignment("no models to align".into()));
    };

    let dim = reference.space.vector_dim();
    if let Some(odd) = models.iter().find(|m| m.space.vector_dim() != dim) {
        return Err(DriftError::Alignment(format!(
            "index '{}' has vector_dim {} but reference has {dim}",
            odd.label,
            odd.space.vector_dim()
        )));
    }

    info!(
        reference = reference.label,
        models = models.len(),
        "procrustes alignment started"
    );

    let mut aligned = Vec::with_capacity(models.len());
    // The reference defines the frame; its vectors pass through unchanged.
    aligned.push(AlignedModel::new(
        reference.label.clone(),
        reference.space.clone(),
    ));

    for model in &models[1..] {
        aligned.push(align_single(model, reference)?);
    }
    Ok(aligned)
}

/// Fit a rotation on the vocabulary shared with the reference and apply it
/// to the model's full vocabulary.
#[allow(clippy::cast_possible_truncation)]
fn align_single(model: &TrainedModel, reference: &TrainedModel) -> Result<AlignedModel> {
    let shared: Vec<&str> = model
        .space
        .vocab()
        .words()
        .iter()
        .map(String::as_str)
        .filter(|w| reference.space.vocab().contains(w))
        .collect();

    if shared.len() < MIN_SHARED_VOCAB {
        return Err(DriftError::Alignment(format!(
            "index '{}' shares only {} words with reference '{}' (minimum {MIN_SHARED_VOCAB})",
            model.label,
            shared.len(),
            reference.label
        )));
    }
    debug!(
        label = model.label,
        shared = shared.len(),
        "fitting orthogonal transform"
    );

    let source = gather(&model.space, &shared);
    let target = gather(&reference.space, &shared);

    let source_mean = source.mean_axis(Axis(0)).expect("non-empty shared set");
    let target_mean = target.mean_axis(Axis(0)).expect("non-empty shared set");
    let source_centered = &source - &source_mean;
    let target_centered = &target - &target_mean;

    // M = Yc^T Xc; the polar factor U V^T of M is the optimal rotation.
    let cross = target_centered.t().dot(&source_centered);
    let (u, _, vt) = svd_jacobi(&cross);
    let rotation = u.dot(&vt);

    // Apply to the entire vocabulary: rotate about the shared-set means.
    let all = model.space.vectors().mapv(f64::from);
    let transformed = (&all - &source_mean).dot(&rotation.t()) + &target_mean;

    let vectors = transformed.mapv(|x| x as f32);
    Ok(AlignedModel::new(
        model.label.clone(),
        WordSpace::new(model.space.vocab().clone(), vectors),
    ))
}

/// Stack the f64 vectors of the given words, in order.
fn gather(space: &WordSpace, words: &[&str]) -> Array2<f64> {
    let dim = space.vector_dim();
    let mut out = Array2::<f64>::zeros((words.len(), dim));
    for (row, word) in words.iter().enumerate() {
        let v = space.vector(word).expect("word from this vocabulary");
        let mut target = out.row_mut(row);
        for (j, &x) in v.iter().enumerate() {
            target[j] = f64::from(x);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexdrift_embeddings::math::cosine_similarity;
    use lexdrift_embeddings::vocab::Vocabulary;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Build a model whose words get the given vectors.
    fn model_from(label: &str, entries: &[(&str, Vec<f32>)]) -> TrainedModel {
        let tokens: Vec<String> = entries.iter().map(|(w, _)| (*w).to_owned()).collect();
        let vocab = Vocabulary::build(&tokens, 1);
        let dim = entries[0].1.len();
        let mut vectors = Array2::<f32>::zeros((entries.len(), dim));
        for (i, (_, v)) in entries.iter().enumerate() {
            for (j, &x) in v.iter().enumerate() {
                vectors[[i, j]] = x;
            }
        }
        TrainedModel::new(label, WordSpace::new(vocab, vectors))
    }

    /// 2-D rotation by `theta` applied to a vector.
    fn rotate(v: &[f32], theta: f32) -> Vec<f32> {
        let (s, c) = theta.sin_cos();
        vec![c * v[0] - s * v[1], s * v[0] + c * v[1]]
    }

    /// A reference space plus a copy rotated by `theta`, sharing all words.
    fn rotated_pair(theta: f32, extra_word: Option<&str>) -> (TrainedModel, TrainedModel) {
        let mut rng = StdRng::seed_from_u64(11);
        let words = [
            "technology",
            "cost",
            "health",
            "care",
            "policy",
            "market",
            "research",
            "growth",
            "data",
            "model",
            "trend",
            "value",
        ];
        let entries: Vec<(&str, Vec<f32>)> = words
            .iter()
            .map(|w| {
                let v: Vec<f32> = (0..2).map(|_| rng.random_range(-1.0..1.0)).collect();
                (*w, v)
            })
            .collect();

        let reference = model_from("1990", &entries);

        let mut rotated_entries: Vec<(&str, Vec<f32>)> = entries
            .iter()
            .map(|(w, v)| (*w, rotate(v, theta)))
            .collect();
        if let Some(w) = extra_word {
            rotated_entries.push((w, rotate(&[0.3, -0.4], theta)));
        }
        let other = model_from("2010", &rotated_entries);
        (reference, other)
    }

    #[test]
    fn recovers_a_pure_rotation() {
        let (reference, other) = rotated_pair(0.9, None);
        let aligned = align_to_reference(&[reference.clone(), other]).unwrap();

        for word in reference.space.vocab().words() {
            let ref_vec = reference.space.vector(word).unwrap().to_vec();
            let aligned_vec = aligned[1].space.vector(word).unwrap().to_vec();
            let sim = cosine_similarity(&ref_vec, &aligned_vec);
            assert!(
                sim > 0.99,
                "word '{word}' should align with reference, cosine {sim}"
            );
        }
    }

    #[test]
    fn alignment_improves_over_unaligned() {
        let (reference, other) = rotated_pair(1.4, None);
        let word = "technology";
        let ref_vec = reference.space.vector(word).unwrap().to_vec();
        let before = cosine_similarity(&ref_vec, &other.space.vector(word).unwrap().to_vec());

        let aligned = align_to_reference(&[reference.clone(), other]).unwrap();
        let after = cosine_similarity(&ref_vec, &aligned[1].space.vector(word).unwrap().to_vec());
        assert!(after > before, "cosine {before} -> {after} should improve");
    }

    #[test]
    fn non_shared_words_receive_the_transform_too() {
        let (reference, other) = rotated_pair(0.7, Some("cryptocurrency"));
        let aligned = align_to_reference(&[reference, other]).unwrap();

        // The word absent from the reference still moved into the frame:
        // its aligned vector differs from its raw trained vector.
        let raw = rotate(&[0.3, -0.4], 0.7);
        let transformed = aligned[1]
            .space
            .vector("cryptocurrency")
            .unwrap()
            .to_vec();
        let moved = raw
            .iter()
            .zip(&transformed)
            .any(|(a, b)| (a - b).abs() > 1e-4);
        assert!(moved, "out-of-intersection word must still be transformed");
    }

    #[test]
    fn reference_passes_through_unchanged() {
        let (reference, other) = rotated_pair(0.5, None);
        let aligned = align_to_reference(&[reference.clone(), other]).unwrap();
        assert_eq!(aligned[0].space.vectors(), reference.space.vectors());
    }

    #[test]
    fn too_few_shared_words_is_alignment_error() {
        let a = model_from(
            "1990",
            &[("one", vec![1.0, 0.0]), ("two", vec![0.0, 1.0])],
        );
        let b = model_from(
            "2010",
            &[("one", vec![0.5, 0.5]), ("three", vec![0.2, 0.8])],
        );
        let err = align_to_reference(&[a, b]).unwrap_err();
        assert_eq!(err.code(), "ALIGNMENT_ERROR");
        assert!(err.to_string().contains("shares only"));
    }

    #[test]
    fn mismatched_dims_rejected() {
        let a = model_from("1990", &[("one", vec![1.0, 0.0])]);
        let b = model_from("2010", &[("one", vec![1.0, 0.0, 0.0])]);
        let err = align_to_reference(&[a, b]).unwrap_err();
        assert_eq!(err.code(), "ALIGNMENT_ERROR");
        assert!(err.to_string().contains("vector_dim"));
    }

    #[test]
    fn empty_model_list_rejected() {
        let err = align_to_reference(&[]).unwrap_err();
        assert_eq!(err.code(), "ALIGNMENT_ERROR");
    }

    #[test]
    fn all_dims_equal_after_alignment() {
        let (reference, other) = rotated_pair(0.3, Some("solar"));
        let aligned = align_to_reference(&[reference, other]).unwrap();
        let dims: Vec<usize> = aligned.iter().map(|m| m.space.vector_dim()).collect();
        assert!(dims.windows(2).all(|w| w[0] == w[1]));
    }
}
