//! Side-switch reward wrapper.
//!
//! [`SideSwitchWrapper`] watches the table through its own camera and
//! pays a binary reward when the tracked object ends the episode on the
//! opposite side of a vertical divider from where it started. The
//! divider and all centers are in the detector's resized coordinates.
//!
//! The wrapper records the reference side at reset and never resets the
//! inner environment on its own; the caller owns the episode loop.

use tracing::debug;

use armkit_core::types::{Action, ActionSpace, ObservationSpace, ResetResult, StepResult};
use armkit_driver::Camera;
use armkit_vision::BlobDetector;

use crate::error::EnvError;
use crate::traits::Env;

/// Divider column for the rig's table, in resized coordinates.
pub const DEFAULT_DIVIDER_X: f32 = 175.0;

/// Wraps an environment with a camera-judged side-switch reward.
pub struct SideSwitchWrapper<E> {
    env: E,
    camera: Box<dyn Camera>,
    detector: BlobDetector,
    divider_x: f32,
    reference_center: Option<f32>,
}

impl<E: Env> SideSwitchWrapper<E> {
    pub fn new(env: E, camera: Box<dyn Camera>, detector: BlobDetector, divider_x: f32) -> Self {
        Self {
            env,
            camera,
            detector,
            divider_x,
            reference_center: None,
        }
    }

    /// Standard rig setup: magenta-die detector and the default divider.
    pub fn with_defaults(env: E, camera: Box<dyn Camera>) -> Self {
        Self::new(env, camera, BlobDetector::default(), DEFAULT_DIVIDER_X)
    }

    #[must_use]
    pub const fn divider_x(&self) -> f32 {
        self.divider_x
    }

    /// Center recorded at the last reset, if any.
    #[must_use]
    pub const fn reference_center(&self) -> Option<f32> {
        self.reference_center
    }

    #[must_use]
    pub const fn inner(&self) -> &E {
        &self.env
    }

    #[must_use]
    pub const fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Current blob center; 0.0 when nothing matches.
    fn center(&mut self) -> Result<f32, EnvError> {
        let frame = self.camera.capture()?;
        Ok(self.detector.center_x(&frame).unwrap_or(0.0))
    }
}

impl<E: Env> Env for SideSwitchWrapper<E> {
    fn observation_space(&self) -> &ObservationSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> &ActionSpace {
        self.env.action_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<ResetResult, EnvError> {
        let mut result = self.env.reset(seed)?;
        let reference = self.center()?;
        self.reference_center = Some(reference);
        debug!(reference, divider = self.divider_x, "reference side recorded");
        result
            .info
            .custom
            .insert("reference_center".to_string(), reference);
        Ok(result)
    }

    fn step(&mut self, action: &Action) -> Result<StepResult, EnvError> {
        let mut result = self.env.step(action)?;
        let center = self.center()?;
        let reference = self.reference_center.unwrap_or(center);

        if result.done() {
            let switched = (reference > self.divider_x) != (center > self.divider_x);
            let reward = f32::from(switched);
            result.reward += reward;
            result.info.episode_reward += reward;
            debug!(reference, center, reward, "episode judged");
        }
        result
            .info
            .custom
            .insert("reference_center".to_string(), reference);
        result.info.custom.insert("center".to_string(), center);
        Ok(result)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "SideSwitchWrapper"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
