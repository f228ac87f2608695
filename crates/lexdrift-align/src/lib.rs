//! # lexdrift-align
//!
//! Transforms independently trained vector spaces into one comparable
//! coordinate system.
//!
//! Two interchangeable methods, selected per training run as a tagged
//! variant and dispatched from the single [`align`] entry point:
//!
//! - **Procrustes**: post-hoc orthogonal rotation of each space onto the
//!   first-uploaded reference, fitted on the shared vocabulary.
//! - **Compass**: slices are trained against a shared frozen compass
//!   sub-space ([`compass::CompassSpace`]), so their vectors already share
//!   a frame and alignment is the identity.

#![deny(unsafe_code)]

pub mod compass;
pub mod procrustes;
mod svd;

use lexdrift_core::errors::Result;
use lexdrift_core::types::AlignmentMethod;
use lexdrift_embeddings::model::{AlignedModel, TrainedModel};

/// Produce one aligned model per trained model, all sharing one coordinate
/// frame.
///
/// For `Compass`, the trained models must have been produced by
/// [`compass::CompassSpace::train_slice`]; their vectors are comparable by
/// construction and pass through unchanged.
pub fn align(models: &[TrainedModel], method: AlignmentMethod) -> Result<Vec<AlignedModel>> {
    match method {
        AlignmentMethod::Procrustes => procrustes::align_to_reference(models),
        AlignmentMethod::Compass => Ok(models
            .iter()
            .map(|m| AlignedModel::new(m.label.clone(), m.space.clone()))
            .collect()),
    }
}
