//! Kinematic sim backend.
//!
//! [`SimArm`] teleports between commanded poses with optional Gaussian
//! positioning noise; there is no dynamics model. [`SimScene`] is a
//! synthetic top-down tabletop with a single magenta die, shared with any
//! number of [`SceneCamera`] views. Together they stand in for the rig in
//! tests and smoke runs.

use std::sync::{Arc, Mutex};

use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use armkit_core::pose::Pose;
use armkit_vision::Frame;

use crate::command::{GripperCommand, MotionParams, MAX_GRIPPER_WIDTH};
use crate::error::DriverError;
use crate::traits::{ArmDriver, Camera};

// ---------------------------------------------------------------------------
// SimArm
// ---------------------------------------------------------------------------

/// Kinematic arm: commanded poses are reached instantly, optionally
/// perturbed by zero-mean Gaussian noise on each position axis.
pub struct SimArm {
    pose: Pose,
    gripper_width: f32,
    home: Pose,
    noise_std: f32,
    rng: ChaCha8Rng,
    motions: u64,
}

impl SimArm {
    /// Arm parked at `home` with the gripper open.
    #[must_use]
    pub fn new(home: Pose) -> Self {
        Self {
            pose: home,
            gripper_width: MAX_GRIPPER_WIDTH,
            home,
            noise_std: 0.0,
            rng: ChaCha8Rng::seed_from_u64(0),
            motions: 0,
        }
    }

    /// Enable positioning noise.
    ///
    /// # Panics
    ///
    /// Panics if `std` is negative, NaN, or infinite.
    #[must_use]
    pub fn with_noise(mut self, std: f32) -> Self {
        assert!(
            std.is_finite() && std >= 0.0,
            "noise std must be finite and >= 0, got {std}"
        );
        self.noise_std = std;
        self
    }

    /// Reseed the noise RNG.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Number of pose motions executed since creation.
    #[must_use]
    pub const fn motions(&self) -> u64 {
        self.motions
    }

    #[allow(clippy::cast_possible_truncation)]
    fn perturb(&mut self, position: Vector3<f32>) -> Vector3<f32> {
        if self.noise_std == 0.0 {
            return position;
        }
        let dist = Normal::new(0.0, f64::from(self.noise_std)).expect("validated in with_noise");
        Vector3::new(
            position.x + dist.sample(&mut self.rng) as f32,
            position.y + dist.sample(&mut self.rng) as f32,
            position.z + dist.sample(&mut self.rng) as f32,
        )
    }
}

impl Default for SimArm {
    /// Parked at the rig's ready pose, centered over the table.
    fn default() -> Self {
        Self::new(Pose::from_position(Vector3::new(0.307, 0.0, 0.487)))
    }
}

impl ArmDriver for SimArm {
    fn pose(&mut self) -> Result<Pose, DriverError> {
        Ok(self.pose)
    }

    fn goto_pose(&mut self, target: &Pose, params: &MotionParams) -> Result<(), DriverError> {
        let reached = self.perturb(target.position);
        self.pose = target.with_position(reached);
        self.motions += 1;
        debug!(
            x = target.position.x,
            y = target.position.y,
            z = target.position.z,
            duration_s = params.duration_s,
            blocking = params.blocking,
            motions = self.motions,
            "sim arm moved"
        );
        Ok(())
    }

    fn goto_gripper(&mut self, cmd: &GripperCommand) -> Result<(), DriverError> {
        self.gripper_width = cmd.width();
        debug!(width = cmd.width(), grasp = cmd.grasp, "sim gripper moved");
        Ok(())
    }

    fn gripper_width(&mut self) -> Result<f32, DriverError> {
        Ok(self.gripper_width)
    }

    fn reset_joints(&mut self) -> Result<(), DriverError> {
        self.pose = self.home;
        debug!("sim arm homed");
        Ok(())
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "SimArm"
    }
}

// ---------------------------------------------------------------------------
// SimScene
// ---------------------------------------------------------------------------

/// Die color painted by the scene; sits inside the magenta HSV window.
pub const DIE_COLOR: [u8; 3] = [255, 0, 128];

/// Table color; unsaturated, so the blob pipeline never matches it.
pub const TABLE_COLOR: [u8; 3] = [90, 90, 90];

struct SceneState {
    width: u32,
    height: u32,
    /// Die center as fractions of frame width/height.
    die_frac: (f32, f32),
    /// Die side length as a fraction of frame width.
    die_frac_size: f32,
}

impl SceneState {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn render(&self) -> Frame {
        let mut frame = Frame::filled(self.width, self.height, TABLE_COLOR);
        let size = ((self.die_frac_size * self.width as f32) as u32).max(1);
        let cx = self.die_frac.0 * self.width as f32;
        let cy = self.die_frac.1 * self.height as f32;
        let x0 = (cx - size as f32 / 2.0).max(0.0) as u32;
        let y0 = (cy - size as f32 / 2.0).max(0.0) as u32;
        frame.fill_rect(x0, y0, size, size, DIE_COLOR);
        frame
    }
}

/// Synthetic top-down tabletop scene holding one die.
///
/// The scene is shared: [`camera`](Self::camera) hands out views backed by
/// the same state, so a test can move the die and every camera sees it.
pub struct SimScene {
    state: Arc<Mutex<SceneState>>,
}

impl SimScene {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SceneState {
                width,
                height,
                die_frac: (0.25, 0.5),
                die_frac_size: 0.12,
            })),
        }
    }

    /// Move the die. Coordinates are fractions of the frame, clamped to
    /// [0, 1].
    pub fn place_die(&self, x: f32, y: f32) {
        let mut state = self.state.lock().unwrap();
        state.die_frac = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
    }

    /// Current die center as fractions of the frame.
    #[must_use]
    pub fn die_position(&self) -> (f32, f32) {
        self.state.lock().unwrap().die_frac
    }

    /// A camera viewing this scene.
    #[must_use]
    pub fn camera(&self) -> SceneCamera {
        SceneCamera {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for SimScene {
    /// 640x480, the resolution the rig cameras deliver.
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// Camera view into a [`SimScene`].
pub struct SceneCamera {
    state: Arc<Mutex<SceneState>>,
}

impl Camera for SceneCamera {
    fn capture(&mut self) -> Result<Frame, DriverError> {
        Ok(self.state.lock().unwrap().render())
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "SceneCamera"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
