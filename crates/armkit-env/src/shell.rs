//! Arm environment shell.
//!
//! [`ArmEnv`] owns the driver, the camera, and the episode bookkeeping.
//! On its own it is the raw-mode environment: a 6-dim action whose first
//! three channels command a scaled end-effector translation. The
//! primitive environment wraps the same shell and drives it through the
//! crate-internal helpers.

use std::collections::HashMap;

use nalgebra::Vector3;
use tracing::{debug, warn};

use armkit_core::pose::{Pose, Workspace};
use armkit_core::types::{
    Action, ActionSpace, Observation, ObservationSpace, ResetInfo, ResetResult, StepInfo,
    StepResult,
};
use armkit_driver::{ArmDriver, Camera, GripperCommand, MotionParams};

use crate::config::EnvConfig;
use crate::episode::{Episode, EpisodeState};
use crate::error::EnvError;
use crate::traits::Env;

/// Raw action layout: translation deltas then reserved rotation channels.
pub const RAW_ACTION_DIM: usize = 6;

/// Meters of translation commanded by a full-scale raw action channel.
pub const RAW_TRANSLATION_SCALE: f32 = 0.1;

// ---------------------------------------------------------------------------
// ArmEnv
// ---------------------------------------------------------------------------

/// Camera-observed arm environment with raw end-effector control.
pub struct ArmEnv {
    driver: Box<dyn ArmDriver>,
    camera: Box<dyn Camera>,
    workspace: Workspace,
    obs_space: ObservationSpace,
    act_space: ActionSpace,
    episode: Episode,
    config: EnvConfig,
}

impl ArmEnv {
    /// Build the environment over a driver and a camera.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Config`] when the configuration fails
    /// validation.
    pub fn new(
        config: EnvConfig,
        driver: Box<dyn ArmDriver>,
        camera: Box<dyn Camera>,
    ) -> Result<Self, EnvError> {
        config.validate()?;
        let workspace = config.workspace()?;
        let obs_space = ObservationSpace::rgb(config.image_height, config.image_width);
        let act_space = ActionSpace::uniform(RAW_ACTION_DIM, -1.0, 1.0);
        Ok(Self {
            driver,
            camera,
            workspace,
            obs_space,
            act_space,
            episode: Episode::default(),
            config,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &EnvConfig {
        &self.config
    }

    #[must_use]
    pub const fn workspace(&self) -> Workspace {
        self.workspace
    }

    #[must_use]
    pub const fn episode(&self) -> &Episode {
        &self.episode
    }

    fn motion_params(&self) -> MotionParams {
        MotionParams::default().with_duration(self.config.motion_duration_s)
    }

    pub(crate) fn current_pose(&mut self) -> Result<Pose, EnvError> {
        self.driver.pose().map_err(Into::into)
    }

    pub(crate) fn gripper_width(&mut self) -> Result<f32, EnvError> {
        self.driver.gripper_width().map_err(Into::into)
    }

    /// Clamp `position` into the workspace and run a blocking move,
    /// holding the current orientation.
    pub(crate) fn move_to(&mut self, position: Vector3<f32>) -> Result<(), EnvError> {
        let params = self.motion_params();
        self.move_with(position, &params)
    }

    fn move_with(&mut self, position: Vector3<f32>, params: &MotionParams) -> Result<(), EnvError> {
        let clamped = self.workspace.clamp(position);
        let pose = self.current_pose()?.with_position(clamped);
        self.driver.goto_pose(&pose, params)?;
        Ok(())
    }

    /// Forward a gripper command. A failure is swallowed with a warning
    /// when the command is marked `ignore_errors`.
    pub(crate) fn send_gripper(&mut self, cmd: &GripperCommand) -> Result<(), EnvError> {
        match self.driver.goto_gripper(cmd) {
            Ok(()) => Ok(()),
            Err(err) if cmd.ignore_errors => {
                warn!(error = %err, width = cmd.width(), "gripper command failed, continuing");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Capture a frame and flatten it to the configured observation shape.
    pub(crate) fn observe(&mut self) -> Result<Observation, EnvError> {
        let frame = self.camera.capture()?;
        let resized = frame.resize(self.config.image_width, self.config.image_height);
        Ok(Observation::new(resized.to_chw_f32()))
    }

    /// Close out a step: observe, advance the episode, assemble the result.
    pub(crate) fn finish_step(
        &mut self,
        reward: f32,
        primitive: Option<&str>,
    ) -> Result<StepResult, EnvError> {
        let observation = self.observe()?;
        let state = self.episode.advance(reward, self.config.episode_len);
        Ok(StepResult {
            observation,
            reward,
            terminated: state == EpisodeState::Done,
            truncated: state == EpisodeState::Truncated,
            info: StepInfo {
                episode_length: self.episode.step_count,
                episode_reward: self.episode.total_reward,
                primitive: primitive.map(str::to_owned),
                custom: HashMap::new(),
            },
        })
    }

    /// Rig reset sequence: release the gripper, lift clear of the table,
    /// home the joints, then start a fresh episode.
    pub(crate) fn reset_arm(&mut self, seed: Option<u64>) -> Result<ResetResult, EnvError> {
        self.send_gripper(&GripperCommand::open().non_blocking().ignoring_errors())?;

        let lifted =
            self.current_pose()?.position + Vector3::new(0.0, 0.0, self.config.reset_lift);
        // Tight force thresholds on all six axes while moving blind.
        let params = self.motion_params().with_force_thresholds([15.0; 6]);
        self.move_with(lifted, &params)?;
        self.driver.reset_joints()?;

        self.episode.reset(seed);
        debug!(
            ?seed,
            episode = self.episode.episode_number,
            driver = self.driver.name(),
            "arm reset"
        );
        let observation = self.observe()?;
        Ok(ResetResult {
            observation,
            info: ResetInfo {
                seed,
                custom: HashMap::new(),
            },
        })
    }

    pub(crate) fn ensure_running(&self) -> Result<(), EnvError> {
        if self.episode.is_running() {
            Ok(())
        } else {
            Err(EnvError::NotRunning {
                state: self.episode.state,
            })
        }
    }
}

impl Env for ArmEnv {
    fn observation_space(&self) -> &ObservationSpace {
        &self.obs_space
    }

    fn action_space(&self) -> &ActionSpace {
        &self.act_space
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<ResetResult, EnvError> {
        self.reset_arm(seed)
    }

    fn step(&mut self, action: &Action) -> Result<StepResult, EnvError> {
        self.ensure_running()?;
        if action.len() != RAW_ACTION_DIM {
            return Err(EnvError::ActionDimension {
                expected: RAW_ACTION_DIM,
                got: action.len(),
            });
        }
        action.validate()?;

        let mut action = action.clone();
        action.clip_normalized();
        // Only the translation channels drive the arm.
        let delta = Vector3::new(action[0], action[1], action[2]) * RAW_TRANSLATION_SCALE;
        let target = self.current_pose()?.position + delta;
        self.move_to(target)?;
        self.finish_step(0.0, None)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ArmEnv"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
