//! Error types for variant loading, sweeping, and launching.

use armkit_env::error::EnvError;
use armkit_policy::error::RolloutError;
use thiserror::Error;

/// Errors from loading variants, expanding sweeps, or running experiments.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse variant TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize variant: {0}")]
    Json(#[from] serde_json::Error),

    /// A sweep path names a field the variant does not have.
    #[error("sweep path {path:?} does not exist in the variant")]
    BadSweepPath { path: String },

    /// A sweep value has a different JSON kind than the field it replaces.
    #[error("sweep path {path:?} expects a {expected} value, got {got}")]
    InvalidValue {
        path: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error(transparent)]
    Env(#[from] EnvError),
}

impl From<RolloutError> for LaunchError {
    fn from(err: RolloutError) -> Self {
        match err {
            RolloutError::Env(e) => Self::Env(e),
            RolloutError::Record(e) => Self::Io(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
