//! # lexdrift-server
//!
//! Axum HTTP surface over the lexdrift engine:
//!
//! - Session lifecycle (create / status / info / terminate)
//! - Corpus ingestion and statistics
//! - Training start and status polling
//! - Similarity matrices, neighbor analysis, and topic/term CRUD
//!
//! All engine state is wired into one [`state::AppState`]; request handlers
//! never block on training.

#![deny(unsafe_code)]

pub mod error;
pub mod health;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
