//! The environment contract consumed by rollout runners and wrappers.

use armkit_core::types::{Action, ActionSpace, ObservationSpace, ResetResult, StepResult};

use crate::error::EnvError;

/// Gym-style environment: reset, step, and space descriptors.
///
/// Implementations drive hardware (or a simulator) through blocking calls,
/// so every operation returns a `Result`; driver faults propagate uncaught.
/// `step` on a finished episode is an error — callers reset explicitly.
pub trait Env {
    /// Observation space descriptor.
    fn observation_space(&self) -> &ObservationSpace;

    /// Action space descriptor.
    fn action_space(&self) -> &ActionSpace;

    /// Begin a new episode, returning the initial observation.
    fn reset(&mut self, seed: Option<u64>) -> Result<ResetResult, EnvError>;

    /// Take one step with the given action.
    fn step(&mut self, action: &Action) -> Result<StepResult, EnvError>;

    /// Human-readable environment name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn observation_space(&self) -> &ObservationSpace {
        (**self).observation_space()
    }

    fn action_space(&self) -> &ActionSpace {
        (**self).action_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<ResetResult, EnvError> {
        (**self).reset(seed)
    }

    fn step(&mut self, action: &Action) -> Result<StepResult, EnvError> {
        (**self).step(action)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use armkit_core::types::{Observation, ResetInfo, StepInfo};

    struct NullEnv {
        obs_space: ObservationSpace,
        act_space: ActionSpace,
    }

    impl NullEnv {
        fn new() -> Self {
            Self {
                obs_space: ObservationSpace::Box {
                    low: vec![0.0],
                    high: vec![1.0],
                },
                act_space: ActionSpace::uniform(1, -1.0, 1.0),
            }
        }
    }

    impl Env for NullEnv {
        fn observation_space(&self) -> &ObservationSpace {
            &self.obs_space
        }

        fn action_space(&self) -> &ActionSpace {
            &self.act_space
        }

        fn reset(&mut self, _seed: Option<u64>) -> Result<ResetResult, EnvError> {
            Ok(ResetResult {
                observation: Observation::zeros(1),
                info: ResetInfo::default(),
            })
        }

        fn step(&mut self, _action: &Action) -> Result<StepResult, EnvError> {
            Ok(StepResult {
                observation: Observation::zeros(1),
                reward: 0.0,
                terminated: false,
                truncated: false,
                info: StepInfo::default(),
            })
        }

        #[allow(clippy::unnecessary_literal_bound)]
        fn name(&self) -> &str {
            "NullEnv"
        }
    }

    #[test]
    fn trait_is_object_safe() {
        let mut env: Box<dyn Env> = Box::new(NullEnv::new());
        let reset = env.reset(Some(1)).unwrap();
        assert_eq!(reset.observation.len(), 1);
        assert_eq!(env.name(), "NullEnv");
    }

    #[test]
    fn boxed_env_implements_env() {
        fn drive(env: &mut impl Env) -> StepResult {
            env.reset(None).unwrap();
            env.step(&Action::zeros(1)).unwrap()
        }
        let mut boxed: Box<dyn Env> = Box::new(NullEnv::new());
        let result = drive(&mut boxed);
        assert!(!result.done());
    }
}
