//! Episode lifecycle tracking.
//!
//! An episode is a single rollout from reset to termination or truncation.
//! [`Episode`] owns the step counter and accumulated reward; the step limit
//! itself lives in [`EnvConfig`](crate::config::EnvConfig).

// ---------------------------------------------------------------------------
// EpisodeState
// ---------------------------------------------------------------------------

/// Lifecycle state of an episode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EpisodeState {
    /// Before the first reset.
    #[default]
    Idle,
    /// Actively stepping.
    Running,
    /// Ended due to task success or failure.
    Done,
    /// Ended due to the step limit.
    Truncated,
}

impl EpisodeState {
    /// Returns `true` if the episode is finished (Done or Truncated).
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Truncated)
    }

    /// Returns `true` if the episode is active.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

// ---------------------------------------------------------------------------
// Episode
// ---------------------------------------------------------------------------

/// Tracks the current episode's state, step count, and reward.
#[derive(Clone, Debug, Default)]
pub struct Episode {
    /// Current lifecycle state.
    pub state: EpisodeState,
    /// Number of steps taken this episode.
    pub step_count: u32,
    /// Total accumulated reward this episode.
    pub total_reward: f32,
    /// Seed used for this episode (set on reset).
    pub seed: Option<u64>,
    /// Number of resets since construction.
    pub episode_number: u32,
}

impl Episode {
    /// Reset to `Running` with an optional seed, zeroing the counter.
    pub const fn reset(&mut self, seed: Option<u64>) {
        self.state = EpisodeState::Running;
        self.step_count = 0;
        self.total_reward = 0.0;
        self.seed = seed;
        self.episode_number += 1;
    }

    /// Advance one step, accumulating reward, then apply the step limit.
    ///
    /// The counter increments before the limit check, so an episode lasts
    /// exactly `episode_len` steps. `episode_len == 0` disables the limit.
    /// Returns the state after the check; `Running` is left untouched when
    /// the episode already ended.
    pub fn advance(&mut self, reward: f32, episode_len: u32) -> EpisodeState {
        if self.state != EpisodeState::Running {
            return self.state;
        }
        self.step_count += 1;
        self.total_reward += reward;
        if episode_len > 0 && self.step_count >= episode_len {
            self.state = EpisodeState::Truncated;
        }
        self.state
    }

    /// Mark the episode as done (task success or failure).
    pub const fn terminate(&mut self) {
        self.state = EpisodeState::Done;
    }

    /// Whether the episode is in a terminal state.
    pub const fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether the episode is actively running.
    pub const fn is_running(&self) -> bool {
        self.state.is_running()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
