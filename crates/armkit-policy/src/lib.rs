// armkit-policy: Policies and rollout drivers for armkit environments.

pub mod error;
pub mod policies;
pub mod record;
pub mod rollout;

pub use error::RolloutError;
pub use policies::{ConstantPolicy, Policy, RandomPolicy, ScriptedPolicy, ZeroPolicy};
pub use record::{EpisodeRecorder, StepRecord};
pub use rollout::{run_recorded_rollout, run_rollout, Rollout, RolloutStats};
