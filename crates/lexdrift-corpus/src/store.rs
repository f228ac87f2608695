//! Corpus store with interior locking.

use parking_lot::RwLock;
use tracing::debug;

use lexdrift_core::errors::{DriftError, Result};
use lexdrift_core::types::CorpusStats;

/// One index's label and token sequence, in upload order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedTokens {
    /// Unique index label (a year, a decade, a publisher id).
    pub label: String,
    /// Tokenized text for this index.
    pub tokens: Vec<String>,
}

/// Session-scoped store of tokenized indexes.
///
/// Insertion order is preserved: the first uploaded index becomes the
/// Procrustes reference, and `all()` returns indexes in upload order.
#[derive(Debug, Default)]
pub struct CorpusStore {
    indexes: RwLock<Vec<IndexedTokens>>,
}

impl CorpusStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new index.
    ///
    /// Duplicate labels are rejected with `Conflict`; an index is immutable
    /// once created within a session.
    pub fn put(&self, label: impl Into<String>, tokens: Vec<String>) -> Result<()> {
        let label = label.into();
        let mut indexes = self.indexes.write();
        if indexes.iter().any(|ix| ix.label == label) {
            return Err(DriftError::Conflict(format!(
                "index '{label}' already exists"
            )));
        }
        debug!(label, tokens = tokens.len(), "corpus index stored");
        indexes.push(IndexedTokens { label, tokens });
        Ok(())
    }

    /// All indexes in upload order.
    #[must_use]
    pub fn all(&self) -> Vec<IndexedTokens> {
        self.indexes.read().clone()
    }

    /// Labels in upload order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.indexes
            .read()
            .iter()
            .map(|ix| ix.label.clone())
            .collect()
    }

    /// Number of stored indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.read().len()
    }

    /// Whether the store holds no indexes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.read().is_empty()
    }

    /// Remove everything, returning the number of removed indexes.
    pub fn clear(&self) -> usize {
        let mut indexes = self.indexes.write();
        let removed = indexes.len();
        indexes.clear();
        removed
    }

    /// Read-only statistics; no side effects.
    #[must_use]
    pub fn stats(&self) -> CorpusStats {
        let indexes = self.indexes.read();
        let tokens = indexes.iter().map(|ix| ix.tokens.len()).sum();
        let characters = indexes
            .iter()
            .flat_map(|ix| ix.tokens.iter())
            .map(String::len)
            .sum();
        CorpusStats {
            indexes: indexes.len(),
            tokens,
            characters,
        }
    }
}
