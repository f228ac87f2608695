//! Topic and related-term store.
//!
//! The vocabulary-of-interest definitions live outside the analysis core;
//! this in-memory store implements that collaborator. The analyzer reads
//! topics by reference and never mutates them. Wiped with the session.

use parking_lot::RwLock;
use serde::Serialize;

use lexdrift_core::errors::{DriftError, Result};
use lexdrift_core::ids::{TermId, TopicId};

/// A topic whose meaning shift is being tracked.
#[derive(Clone, Debug, Serialize)]
pub struct Topic {
    /// Topic identifier.
    pub id: TopicId,
    /// Topic word, as it appears in corpus vocabularies.
    pub name: String,
}

/// A term whose similarity to its topic is measured per index.
#[derive(Clone, Debug, Serialize)]
pub struct RelatedTerm {
    /// Term identifier.
    pub id: TermId,
    /// Owning topic.
    pub topic_id: TopicId,
    /// The term word.
    pub term: String,
}

/// A topic together with its related terms.
#[derive(Clone, Debug, Serialize)]
pub struct TopicWithTerms {
    /// The topic.
    #[serde(flatten)]
    pub topic: Topic,
    /// Its related terms, in insertion order.
    pub related_terms: Vec<RelatedTerm>,
}

/// In-memory topic / related-term store.
#[derive(Debug, Default)]
pub struct TermStore {
    topics: RwLock<Vec<TopicWithTerms>>,
}

impl TermStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a topic.
    pub fn create_topic(&self, name: impl Into<String>) -> Result<Topic> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DriftError::InvalidInput("topic name is required".into()));
        }
        let topic = Topic {
            id: TopicId::new(),
            name,
        };
        self.topics.write().push(TopicWithTerms {
            topic: topic.clone(),
            related_terms: Vec::new(),
        });
        Ok(topic)
    }

    /// All topics with their terms, in insertion order.
    #[must_use]
    pub fn topics(&self) -> Vec<TopicWithTerms> {
        self.topics.read().clone()
    }

    /// Delete a topic and all its related terms.
    pub fn delete_topic(&self, id: &TopicId) -> Result<()> {
        let mut topics = self.topics.write();
        let before = topics.len();
        topics.retain(|t| &t.topic.id != id);
        if topics.len() == before {
            return Err(DriftError::NotFound(format!("topic '{id}'")));
        }
        Ok(())
    }

    /// Add a related term to a topic.
    pub fn add_term(&self, topic_id: &TopicId, term: impl Into<String>) -> Result<RelatedTerm> {
        let term = term.into();
        if term.trim().is_empty() {
            return Err(DriftError::InvalidInput("term is required".into()));
        }
        let mut topics = self.topics.write();
        let topic = topics
            .iter_mut()
            .find(|t| &t.topic.id == topic_id)
            .ok_or_else(|| DriftError::NotFound(format!("topic '{topic_id}'")))?;
        let related = RelatedTerm {
            id: TermId::new(),
            topic_id: topic_id.clone(),
            term,
        };
        topic.related_terms.push(related.clone());
        Ok(related)
    }

    /// Remove a related term by id.
    pub fn delete_term(&self, id: &TermId) -> Result<()> {
        let mut topics = self.topics.write();
        for topic in topics.iter_mut() {
            let before = topic.related_terms.len();
            topic.related_terms.retain(|t| &t.id != id);
            if topic.related_terms.len() != before {
                return Ok(());
            }
        }
        Err(DriftError::NotFound(format!("term '{id}'")))
    }

    /// Remove everything; returns `(topics, terms)` counts.
    pub fn clear(&self) -> (usize, usize) {
        let mut topics = self.topics.write();
        let topic_count = topics.len();
        let term_count = topics.iter().map(|t| t.related_terms.len()).sum();
        topics.clear();
        (topic_count, term_count)
    }
}
