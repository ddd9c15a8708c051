use thiserror::Error;

use armkit_core::error::ValidationError;
use armkit_driver::DriverError;

use crate::dispatch::DispatchPhase;
use crate::episode::EpisodeState;

/// Errors surfaced by environment construction, reset, and stepping.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Fault from the arm or camera driver.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Action vector failed numeric validation.
    #[error(transparent)]
    Action(#[from] ValidationError),

    /// Action vector has the wrong length for the control mode.
    #[error("action has dimension {got}, expected {expected}")]
    ActionDimension { expected: usize, got: usize },

    /// Selected primitive index is outside the configured set.
    #[error("unknown primitive index {index} (set has {len})")]
    UnknownPrimitive { index: usize, len: usize },

    /// Primitive set construction failed: no primitives given.
    #[error("primitive set is empty")]
    EmptyPrimitiveSet,

    /// Primitive set construction failed: argument slices collide.
    #[error("primitives `{first}` and `{second}` have overlapping argument slices")]
    OverlappingArgs {
        first: &'static str,
        second: &'static str,
    },

    /// Dispatch cycle driven out of order.
    #[error("dispatch phase is {got:?}, expected {expected:?}")]
    Phase {
        expected: DispatchPhase,
        got: DispatchPhase,
    },

    /// `step` called before `reset` or after the episode ended.
    #[error("episode is not running (state {state:?})")]
    NotRunning { state: EpisodeState },

    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from loading or validating an environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
