//! Primitive-action environment.
//!
//! [`PrimitiveEnv`] wraps the arm shell behind a
//! `[logits | args]` action vector: the incoming action is clamped to the
//! space, scaled, arg-maxed into a [`Primitive`], and executed as a short
//! open-loop skill. One step equals one full primitive, so episodes are a
//! handful of steps where the raw environment needs hundreds.

use nalgebra::Vector3;
use tracing::debug;

use armkit_core::types::{Action, ActionSpace, ObservationSpace, ResetResult, StepResult};
use armkit_driver::{ArmDriver, Camera, GripperCommand, MAX_GRIPPER_WIDTH};

use crate::config::EnvConfig;
use crate::dispatch::Dispatcher;
use crate::error::EnvError;
use crate::primitives::{Primitive, PrimitiveSet};
use crate::shell::ArmEnv;
use crate::traits::Env;

/// Arm environment driven by parameterized manipulation primitives.
pub struct PrimitiveEnv {
    shell: ArmEnv,
    set: PrimitiveSet,
    dispatcher: Dispatcher,
    act_space: ActionSpace,
}

impl PrimitiveEnv {
    /// Environment over the full standard primitive set.
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
        Self::with_primitives(config, driver, camera, PrimitiveSet::standard())
    }

    /// Environment over a custom primitive set.
    pub fn with_primitives(
        config: EnvConfig,
        driver: Box<dyn ArmDriver>,
        camera: Box<dyn Camera>,
        set: PrimitiveSet,
    ) -> Result<Self, EnvError> {
        let shell = ArmEnv::new(config, driver, camera)?;
        let act_space = set.action_space();
        Ok(Self {
            shell,
            set,
            dispatcher: Dispatcher::new(),
            act_space,
        })
    }

    #[must_use]
    pub const fn primitives(&self) -> &PrimitiveSet {
        &self.set
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub const fn config(&self) -> &EnvConfig {
        self.shell.config()
    }

    #[must_use]
    pub const fn episode(&self) -> &crate::episode::Episode {
        self.shell.episode()
    }

    /// Run one primitive. `args` has exactly the length of the
    /// primitive's argument slice.
    fn execute(&mut self, primitive: Primitive, args: &[f32]) -> Result<(), EnvError> {
        match primitive {
            Primitive::MoveDeltaEePose => {
                self.goto_relative(Vector3::new(args[0], args[1], args[2]), true)
            }
            Primitive::TopGrasp => self.top_grasp(args[0], args[1]),
            Primitive::Lift => self.axis_move(Vector3::z(), args[0]),
            Primitive::Drop => self.axis_move(-Vector3::z(), args[0]),
            Primitive::MoveLeft => self.axis_move(-Vector3::y(), args[0]),
            Primitive::MoveRight => self.axis_move(Vector3::y(), args[0]),
            Primitive::MoveForward => self.axis_move(Vector3::x(), args[0]),
            Primitive::MoveBackward => self.axis_move(-Vector3::x(), args[0]),
            Primitive::CloseGripper => self.close_gripper(args[0]),
            Primitive::OpenGripper => self.open_gripper(args[0]),
        }
    }

    /// Relative move with a gripper pre-command so the fingers are never
    /// in an unknown state while the arm travels: squeeze shut when
    /// `holding`, otherwise open fully.
    fn goto_relative(&mut self, delta: Vector3<f32>, holding: bool) -> Result<(), EnvError> {
        let pre = if holding {
            GripperCommand::new(0.0)
        } else {
            GripperCommand::open()
        };
        self.shell
            .send_gripper(&pre.non_blocking().ignoring_errors())?;
        let target = self.shell.current_pose()?.position + delta;
        self.shell.move_to(target)
    }

    /// Directional nudge. Negative distances are treated as zero, and a
    /// zero-distance move skips the arm entirely.
    fn axis_move(&mut self, direction: Vector3<f32>, dist: f32) -> Result<(), EnvError> {
        let dist = dist.max(0.0);
        if dist > 0.0 {
            self.goto_relative(direction * dist, true)?;
        }
        Ok(())
    }

    /// Descend open-handed by `|z_down|`, then squeeze by `d`.
    fn top_grasp(&mut self, z_down: f32, d: f32) -> Result<(), EnvError> {
        self.goto_relative(Vector3::new(0.0, 0.0, -z_down.abs()), false)?;
        self.close_gripper(d)
    }

    /// Narrow the gripper by `d` of the full opening, floored at closed.
    fn close_gripper(&mut self, d: f32) -> Result<(), EnvError> {
        let delta = (d * MAX_GRIPPER_WIDTH).clamp(0.0, MAX_GRIPPER_WIDTH);
        let desired = (self.shell.gripper_width()? - delta).max(0.0);
        self.shell
            .send_gripper(&GripperCommand::new(desired).ignoring_errors())
    }

    /// Widen the gripper by `d` of the full opening, capped at open.
    fn open_gripper(&mut self, d: f32) -> Result<(), EnvError> {
        let delta = (d * MAX_GRIPPER_WIDTH).clamp(0.0, MAX_GRIPPER_WIDTH);
        let desired = (self.shell.gripper_width()? + delta).min(MAX_GRIPPER_WIDTH);
        self.shell
            .send_gripper(&GripperCommand::new(desired).ignoring_errors())
    }
}

impl Env for PrimitiveEnv {
    fn observation_space(&self) -> &ObservationSpace {
        self.shell.observation_space()
    }

    fn action_space(&self) -> &ActionSpace {
        &self.act_space
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<ResetResult, EnvError> {
        self.dispatcher.reset();
        self.shell.reset_arm(seed)
    }

    fn step(&mut self, action: &Action) -> Result<StepResult, EnvError> {
        self.shell.ensure_running()?;
        if action.len() != self.set.action_dim() {
            return Err(EnvError::ActionDimension {
                expected: self.set.action_dim(),
                got: action.len(),
            });
        }
        action.validate()?;
        self.dispatcher.begin()?;

        let mut scaled = action.clone();
        self.act_space.clamp(&mut scaled);
        let scale = self.shell.config().action_scale;
        for v in scaled.as_mut_slice() {
            *v *= scale;
        }

        let (primitive, args) = self.set.select(&scaled)?;
        self.dispatcher.selected(primitive, args.clone())?;
        debug!(primitive = %primitive, ?args, "dispatching");
        self.execute(primitive, &args)?;
        self.dispatcher.executed()?;

        let result = self.shell.finish_step(0.0, Some(primitive.name()))?;
        self.dispatcher.observed(result.done())?;
        Ok(result)
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "PrimitiveEnv"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use armkit_core::pose::Pose;
    use armkit_driver::error::DriverError;
    use armkit_driver::MotionParams;
    use armkit_vision::Frame;

    use crate::dispatch::DispatchPhase;
    use crate::episode::EpisodeState;

    use super::*;

    #[derive(Default)]
    struct ProbeLog {
        targets: Vec<Vector3<f32>>,
        grippers: Vec<GripperCommand>,
    }

    struct ProbeArm {
        pose: Pose,
        home: Pose,
        width: f32,
        log: Arc<Mutex<ProbeLog>>,
    }

    impl ArmDriver for ProbeArm {
        fn pose(&mut self) -> Result<Pose, DriverError> {
            Ok(self.pose)
        }

        fn goto_pose(&mut self, target: &Pose, _params: &MotionParams) -> Result<(), DriverError> {
            self.log.lock().unwrap().targets.push(target.position);
            self.pose = *target;
            Ok(())
        }

        fn goto_gripper(&mut self, cmd: &GripperCommand) -> Result<(), DriverError> {
            self.log.lock().unwrap().grippers.push(*cmd);
            self.width = cmd.width();
            Ok(())
        }

        fn gripper_width(&mut self) -> Result<f32, DriverError> {
            Ok(self.width)
        }

        fn reset_joints(&mut self) -> Result<(), DriverError> {
            self.pose = self.home;
            Ok(())
        }
    }

    struct FlatCamera;

    impl Camera for FlatCamera {
        fn capture(&mut self) -> Result<Frame, DriverError> {
            Ok(Frame::filled(8, 8, [10, 20, 30]))
        }
    }

    const HOME: Vector3<f32> = Vector3::new(0.3, 0.0, 0.3);

    fn test_config() -> EnvConfig {
        EnvConfig {
            image_width: 4,
            image_height: 4,
            ..EnvConfig::default()
        }
    }

    fn probe_env(config: EnvConfig) -> (PrimitiveEnv, Arc<Mutex<ProbeLog>>) {
        let log = Arc::new(Mutex::new(ProbeLog::default()));
        let arm = ProbeArm {
            pose: Pose::from_position(HOME),
            home: Pose::from_position(HOME),
            width: MAX_GRIPPER_WIDTH,
            log: Arc::clone(&log),
        };
        let env = PrimitiveEnv::new(config, Box::new(arm), Box::new(FlatCamera)).unwrap();
        (env, log)
    }

    fn one_hot(env: &PrimitiveEnv, index: usize, args: &[f32]) -> Action {
        env.primitives().primitive_action(index, args).unwrap()
    }

    #[test]
    fn spaces_cover_standard_set() {
        let (env, _) = probe_env(test_config());
        assert_eq!(env.action_space().dim(), 23);
        assert_eq!(env.observation_space().size(), 3 * 4 * 4);
    }

    #[test]
    fn move_right_holds_and_translates() {
        let (mut env, log) = probe_env(test_config());
        env.reset(None).unwrap();

        let result = env.step(&one_hot(&env, 5, &[0.2])).unwrap();
        assert_eq!(result.info.primitive.as_deref(), Some("move_right"));

        let log = log.lock().unwrap();
        // Reset logged one open command and the lift target first.
        let pre = log.grippers[1];
        assert!((pre.width() - 0.0).abs() < f32::EPSILON);
        assert!(!pre.blocking);
        assert!(pre.ignore_errors);

        let target = *log.targets.last().unwrap();
        assert!((target.x - 0.3).abs() < 1e-6);
        assert!((target.y - 0.2).abs() < 1e-6);
        assert!((target.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn directional_moves_follow_axes() {
        let (mut env, log) = probe_env(test_config());
        env.reset(None).unwrap();

        // move_left, then lift, then drop, each from the reached pose.
        env.step(&one_hot(&env, 4, &[0.1])).unwrap();
        env.step(&one_hot(&env, 2, &[0.2])).unwrap();
        env.step(&one_hot(&env, 3, &[0.05])).unwrap();

        let targets = log.lock().unwrap().targets.clone();
        let after_left = targets[1];
        assert!((after_left.y + 0.1).abs() < 1e-6);
        let after_lift = targets[2];
        assert!((after_lift.z - 0.5).abs() < 1e-6);
        let after_drop = targets[3];
        assert!((after_drop.z - 0.45).abs() < 1e-6);
    }

    #[test]
    fn non_positive_distance_skips_motion() {
        let (mut env, log) = probe_env(test_config());
        env.reset(None).unwrap();
        let motions_after_reset = log.lock().unwrap().targets.len();

        let result = env.step(&one_hot(&env, 4, &[0.0])).unwrap();
        assert_eq!(result.info.episode_length, 1);
        env.step(&one_hot(&env, 6, &[-0.7])).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.targets.len(), motions_after_reset);
        // No gripper pre-command either; only the reset open is logged.
        assert_eq!(log.grippers.len(), 1);
    }

    #[test]
    fn move_delta_translates_all_axes() {
        let (mut env, log) = probe_env(test_config());
        env.reset(None).unwrap();

        env.step(&one_hot(&env, 0, &[0.05, -0.05, 0.02])).unwrap();
        let target = *log.lock().unwrap().targets.last().unwrap();
        assert!((target.x - 0.35).abs() < 1e-6);
        assert!((target.y + 0.05).abs() < 1e-6);
        assert!((target.z - 0.32).abs() < 1e-6);
    }

    #[test]
    fn top_grasp_descends_open_then_squeezes() {
        let (mut env, log) = probe_env(test_config());
        env.reset(None).unwrap();

        env.step(&one_hot(&env, 1, &[0.15, 0.5])).unwrap();

        let log = log.lock().unwrap();
        let target = *log.targets.last().unwrap();
        assert!((target.z - 0.15).abs() < 1e-6);

        // Pre-command opens fully, the squeeze then blocks.
        let pre = log.grippers[1];
        assert!((pre.width() - MAX_GRIPPER_WIDTH).abs() < f32::EPSILON);
        assert!(!pre.blocking);
        let squeeze = log.grippers[2];
        assert!((squeeze.width() - 0.04).abs() < 1e-6);
        assert!(squeeze.blocking);
        assert!(squeeze.ignore_errors);
    }

    #[test]
    fn gripper_deltas_are_relative_and_saturate() {
        let (mut env, log) = probe_env(test_config());
        env.reset(None).unwrap();

        // Full squeeze from open lands at closed.
        env.step(&one_hot(&env, 8, &[1.0])).unwrap();
        assert!((log.lock().unwrap().grippers.last().unwrap().width() - 0.0).abs() < 1e-6);

        // Quarter release from closed.
        env.step(&one_hot(&env, 9, &[0.25])).unwrap();
        assert!((log.lock().unwrap().grippers.last().unwrap().width() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn argmax_picks_largest_logit() {
        let (mut env, _) = probe_env(test_config());
        env.reset(None).unwrap();

        let mut data = vec![0.0; 23];
        data[8] = 0.3;
        data[2] = 0.1;
        env.step(&Action::new(data)).unwrap();

        let record = env.dispatcher().last().unwrap();
        assert_eq!(record.primitive, Primitive::CloseGripper);
    }

    #[test]
    fn action_scale_multiplies_args() {
        let mut config = test_config();
        config.action_scale = 2.0;
        let (mut env, log) = probe_env(config);
        env.reset(None).unwrap();

        env.step(&one_hot(&env, 5, &[0.1])).unwrap();
        let target = *log.lock().unwrap().targets.last().unwrap();
        assert!((target.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn step_rejects_wrong_dimension() {
        let (mut env, _) = probe_env(test_config());
        env.reset(None).unwrap();
        let err = env.step(&Action::zeros(6)).unwrap_err();
        assert!(matches!(
            err,
            EnvError::ActionDimension {
                expected: 23,
                got: 6,
            }
        ));
    }

    #[test]
    fn step_before_reset_is_rejected() {
        let (mut env, _) = probe_env(test_config());
        let err = env.step(&Action::zeros(23)).unwrap_err();
        assert!(matches!(
            err,
            EnvError::NotRunning {
                state: EpisodeState::Idle,
            }
        ));
    }

    #[test]
    fn truncation_closes_dispatcher_until_reset() {
        let mut config = test_config();
        config.episode_len = 2;
        let (mut env, _) = probe_env(config);
        env.reset(None).unwrap();

        env.step(&one_hot(&env, 2, &[0.01])).unwrap();
        let last = env.step(&one_hot(&env, 2, &[0.01])).unwrap();
        assert!(last.truncated);
        assert_eq!(env.dispatcher().phase(), DispatchPhase::Closed);

        let err = env.step(&one_hot(&env, 2, &[0.01])).unwrap_err();
        assert!(matches!(err, EnvError::NotRunning { .. }));

        env.reset(None).unwrap();
        assert_eq!(env.dispatcher().phase(), DispatchPhase::Idle);
        assert!(env.step(&one_hot(&env, 2, &[0.01])).is_ok());
    }

    #[test]
    fn custom_set_dispatches_with_fixed_offsets() {
        let log = Arc::new(Mutex::new(ProbeLog::default()));
        let arm = ProbeArm {
            pose: Pose::from_position(HOME),
            home: Pose::from_position(HOME),
            width: MAX_GRIPPER_WIDTH,
            log: Arc::clone(&log),
        };
        let set = PrimitiveSet::new(vec![Primitive::Lift, Primitive::CloseGripper]).unwrap();
        let mut env =
            PrimitiveEnv::with_primitives(test_config(), Box::new(arm), Box::new(FlatCamera), set)
                .unwrap();
        assert_eq!(env.action_space().dim(), 15);

        env.reset(None).unwrap();
        let action = env.primitives().primitive_action(0, &[0.2]).unwrap();
        env.step(&action).unwrap();
        let target = *log.lock().unwrap().targets.last().unwrap();
        assert!((target.z - 0.5).abs() < 1e-6);
    }
}
