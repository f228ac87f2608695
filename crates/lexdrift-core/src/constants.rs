//! Package-level constants.

/// Current version of lexdrift (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "lexdrift";

/// Default session time-to-live in seconds (30 minutes).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Minimum number of shared vocabulary words required to fit a Procrustes
/// transform between an index and the reference.
pub const MIN_SHARED_VOCAB: usize = 10;

/// Minimum number of indexes required for a training run (alignment needs
/// at least two comparable spaces).
pub const MIN_INDEXES: usize = 2;

/// Inclusive bounds on the embedding dimensionality.
pub const VECTOR_DIM_RANGE: (usize, usize) = (1, 1024);

/// Inclusive bounds on the number of training epochs.
pub const EPOCHS_RANGE: (usize, usize) = (1, 200);
