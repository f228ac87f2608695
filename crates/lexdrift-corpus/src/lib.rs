//! # lexdrift-corpus
//!
//! In-memory store for per-index tokenized text.
//!
//! Holds one token sequence per unique index label for the current session.
//! Read-only for training; wiped by the session arbiter on create/terminate.

#![deny(unsafe_code)]

mod store;

pub use store::{CorpusStore, IndexedTokens};
