//! Committed-generation store.
//!
//! Holds at most one [`Generation`] behind an `RwLock<Option<Arc<_>>>`.
//! A training run commits a complete generation in one swap; readers hold
//! an `Arc` to whichever generation was current when they looked, so a
//! concurrent commit never exposes a half-written state.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::model::Generation;

/// Stores the current committed training generation.
#[derive(Debug, Default)]
pub struct GenerationStore {
    current: RwLock<Option<Arc<Generation>>>,
}

impl GenerationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the current generation.
    pub fn commit(&self, generation: Generation) {
        debug!(
            models = generation.models.len(),
            method = %generation.method,
            "generation committed"
        );
        *self.current.write() = Some(Arc::new(generation));
    }

    /// The current generation, if any run has completed.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Generation>> {
        self.current.read().clone()
    }

    /// Whether a generation has been committed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.current.read().is_some()
    }

    /// Drop the current generation; returns whether one existed.
    pub fn clear(&self) -> bool {
        self.current.write().take().is_some()
    }
}
