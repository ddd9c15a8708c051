//! Rollout drivers and timing stats.
//!
//! [`run_rollout`] drives one episode end to end and times it;
//! [`RolloutStats`] aggregates a batch. The mean episode duration skips
//! the first episode, which pays the one-off connection and cache costs
//! on real hardware.

use std::time::{Duration, Instant};

use tracing::debug;

use armkit_env::{Env, EnvError};

use crate::error::RolloutError;
use crate::policies::Policy;
use crate::record::{EpisodeRecorder, StepRecord};

// ---------------------------------------------------------------------------
// Rollout
// ---------------------------------------------------------------------------

/// One completed episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollout {
    pub steps: u32,
    pub total_reward: f32,
    pub duration: Duration,
}

/// Reset the environment and step it with `policy` until the episode
/// ends or `max_steps` is reached.
pub fn run_rollout(
    env: &mut dyn Env,
    policy: &dyn Policy,
    seed: Option<u64>,
    max_steps: u32,
) -> Result<Rollout, EnvError> {
    let start = Instant::now();
    let mut obs = env.reset(seed)?.observation;
    let mut steps = 0;
    let mut total_reward = 0.0;

    while steps < max_steps {
        let action = policy.get_action(&obs);
        let result = env.step(&action)?;
        steps += 1;
        total_reward += result.reward;
        obs = result.observation;
        if result.done() {
            break;
        }
    }

    let duration = start.elapsed();
    debug!(
        steps,
        total_reward,
        ?duration,
        policy = policy.name(),
        "rollout finished"
    );
    Ok(Rollout {
        steps,
        total_reward,
        duration,
    })
}

/// [`run_rollout`] variant that appends one [`StepRecord`] per step.
pub fn run_recorded_rollout(
    env: &mut dyn Env,
    policy: &dyn Policy,
    seed: Option<u64>,
    max_steps: u32,
    episode: u32,
    recorder: &mut EpisodeRecorder,
) -> Result<Rollout, RolloutError> {
    let start = Instant::now();
    let mut obs = env.reset(seed)?.observation;
    let mut steps = 0;
    let mut total_reward = 0.0;

    while steps < max_steps {
        let action = policy.get_action(&obs);
        let result = env.step(&action)?;
        steps += 1;
        total_reward += result.reward;
        recorder.record(&StepRecord {
            episode,
            step: steps,
            reward: result.reward,
            terminated: result.terminated,
            truncated: result.truncated,
            primitive: result.info.primitive.clone(),
        })?;
        obs = result.observation;
        if result.done() {
            break;
        }
    }
    recorder.flush()?;

    Ok(Rollout {
        steps,
        total_reward,
        duration: start.elapsed(),
    })
}

// ---------------------------------------------------------------------------
// RolloutStats
// ---------------------------------------------------------------------------

/// Aggregates a batch of rollouts.
#[derive(Debug, Clone, Default)]
pub struct RolloutStats {
    rollouts: Vec<Rollout>,
}

impl RolloutStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rollouts: Vec::new(),
        }
    }

    pub fn push(&mut self, rollout: Rollout) {
        self.rollouts.push(rollout);
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rollouts.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rollouts.is_empty()
    }

    #[must_use]
    pub fn rollouts(&self) -> &[Rollout] {
        &self.rollouts
    }

    #[must_use]
    pub fn total_steps(&self) -> u64 {
        self.rollouts.iter().map(|r| u64::from(r.steps)).sum()
    }

    /// Mean episode reward; 0.0 for an empty batch.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_reward(&self) -> f32 {
        if self.rollouts.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.rollouts.iter().map(|r| r.total_reward).sum();
        sum / self.rollouts.len() as f32
    }

    /// Mean episode duration over all but the first episode. `None`
    /// until at least two episodes have run.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn mean_duration_skipping_first(&self) -> Option<Duration> {
        let rest = self.rollouts.get(1..)?;
        if rest.is_empty() {
            return None;
        }
        let sum: Duration = rest.iter().map(|r| r.duration).sum();
        Some(sum / rest.len() as u32)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
