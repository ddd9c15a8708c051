use thiserror::Error;

/// Space definition errors.
///
/// Copy + static shape so construction is free in hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpaceError {
    #[error("Mismatched low/high dimensions: low={low}, high={high}")]
    DimensionMismatch { low: usize, high: usize },

    #[error("Inverted bounds on axis {axis}: low > high")]
    InvertedBounds { axis: usize },
}

/// Action validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Action dimension mismatch: expected {expected}, got {got}")]
    ActionDimMismatch { expected: usize, got: usize },

    #[error("Action contains NaN")]
    ActionContainsNan,

    #[error("Action contains Inf")]
    ActionContainsInf,
}
