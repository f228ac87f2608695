//! # lexdrift-analysis
//!
//! Semantic-shift analysis over the committed training generation:
//!
//! - [`analyzer::SimilarityAnalyzer`] computes topic/related-term cosine
//!   similarity matrices and per-index nearest-neighbor lists
//! - [`terms::TermStore`] is the in-memory topic / related-term collaborator
//!   the analyzer reads from

#![deny(unsafe_code)]

pub mod analyzer;
pub mod terms;

pub use analyzer::{NeighborEntry, NeighborReport, SimilarityAnalyzer, SimilarityReport};
pub use terms::{RelatedTerm, TermStore, Topic, TopicWithTerms};
