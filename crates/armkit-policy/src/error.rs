use thiserror::Error;

use armkit_env::EnvError;

/// Failures while driving a rollout.
#[derive(Debug, Error)]
pub enum RolloutError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("failed to write rollout record: {0}")]
    Record(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::other("disk full");
        let err: RolloutError = io.into();
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn env_error_is_transparent() {
        let err: RolloutError = EnvError::EmptyPrimitiveSet.into();
        assert_eq!(err.to_string(), EnvError::EmptyPrimitiveSet.to_string());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn rollout_error_is_send_sync() {
        assert_send_sync::<RolloutError>();
    }
}
