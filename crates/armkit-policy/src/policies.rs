//! Policy trait and basic implementations.

use std::sync::Mutex;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use armkit_core::types::{Action, ActionSpace, Observation};

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Maps observations to actions.
///
/// Policies are shared across rollout drivers, so action selection takes
/// `&self`; stateful policies keep their mutability behind a [`Mutex`].
pub trait Policy: Send + Sync {
    /// Select an action for the given observation.
    fn get_action(&self, obs: &Observation) -> Action;

    /// Human-readable name for this policy.
    fn name(&self) -> &str;

    /// Whether the same observation always yields the same action.
    fn is_deterministic(&self) -> bool;
}

// ---------------------------------------------------------------------------
// ZeroPolicy
// ---------------------------------------------------------------------------

/// Policy that always returns a zero-valued continuous action.
pub struct ZeroPolicy {
    dim: usize,
}

impl ZeroPolicy {
    pub const fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Policy for ZeroPolicy {
    fn get_action(&self, _obs: &Observation) -> Action {
        Action::zeros(self.dim)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ZeroPolicy"
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// ConstantPolicy
// ---------------------------------------------------------------------------

/// Policy that always returns the same fixed action.
pub struct ConstantPolicy {
    action: Action,
}

impl ConstantPolicy {
    pub const fn new(action: Action) -> Self {
        Self { action }
    }
}

impl Policy for ConstantPolicy {
    fn get_action(&self, _obs: &Observation) -> Action {
        self.action.clone()
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ConstantPolicy"
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// RandomPolicy
// ---------------------------------------------------------------------------

/// Policy that samples uniform random actions from the action space.
///
/// Uses a seeded RNG for determinism. Thread-safe via [`Mutex`].
pub struct RandomPolicy {
    space: ActionSpace,
    rng: Mutex<ChaCha8Rng>,
}

impl RandomPolicy {
    /// Create a random policy for the given action space and seed.
    pub fn new(space: ActionSpace, seed: u64) -> Self {
        Self {
            space,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Policy for RandomPolicy {
    fn get_action(&self, _obs: &Observation) -> Action {
        let mut rng = self.rng.lock().unwrap();
        self.space.sample(&mut *rng)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "RandomPolicy"
    }

    fn is_deterministic(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// ScriptedPolicy
// ---------------------------------------------------------------------------

/// Policy that replays a fixed sequence of actions, cycling when exhausted.
pub struct ScriptedPolicy {
    actions: Vec<Action>,
    index: Mutex<usize>,
}

impl ScriptedPolicy {
    /// Create a scripted policy from a sequence of actions.
    ///
    /// # Panics
    ///
    /// Panics if `actions` is empty.
    pub fn new(actions: Vec<Action>) -> Self {
        assert!(
            !actions.is_empty(),
            "ScriptedPolicy requires at least one action"
        );
        Self {
            actions,
            index: Mutex::new(0),
        }
    }
}

impl Policy for ScriptedPolicy {
    fn get_action(&self, _obs: &Observation) -> Action {
        let mut idx = self.index.lock().unwrap();
        let action = self.actions[*idx].clone();
        *idx = (*idx + 1) % self.actions.len();
        action
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ScriptedPolicy"
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
