//! Motion and gripper command payloads.
//!
//! [`MotionParams`] carries the duration and the collision thresholds a
//! pose move runs under. [`GripperCommand`] is the full gripper request;
//! its width is clamped into `[0, MAX_GRIPPER_WIDTH]` at construction so
//! out-of-range targets can never reach the hardware.

use serde::{Deserialize, Serialize};

/// Maximum gripper opening in meters.
pub const MAX_GRIPPER_WIDTH: f32 = 0.08;

/// Parameters for a pose move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Trajectory duration in seconds.
    pub duration_s: f32,
    /// Cartesian force reflex thresholds, N then Nm: [fx, fy, fz, tx, ty, tz].
    pub force_thresholds: [f32; 6],
    /// Per-joint torque reflex thresholds in Nm.
    pub torque_thresholds: [f32; 7],
    /// Wait for the trajectory to finish before returning.
    pub blocking: bool,
}

impl MotionParams {
    #[must_use]
    pub const fn with_duration(mut self, duration_s: f32) -> Self {
        self.duration_s = duration_s;
        self
    }

    #[must_use]
    pub const fn with_force_thresholds(mut self, thresholds: [f32; 6]) -> Self {
        self.force_thresholds = thresholds;
        self
    }

    #[must_use]
    pub const fn with_torque_thresholds(mut self, thresholds: [f32; 7]) -> Self {
        self.torque_thresholds = thresholds;
        self
    }

    #[must_use]
    pub const fn non_blocking(mut self) -> Self {
        self.blocking = false;
        self
    }
}

impl Default for MotionParams {
    /// The rig defaults: 5 s blocking trajectories, light translational
    /// reflexes, loose rotational ones.
    fn default() -> Self {
        Self {
            duration_s: 5.0,
            force_thresholds: [15.0, 15.0, 15.0, 100.0, 100.0, 100.0],
            torque_thresholds: [1.0; 7],
            blocking: true,
        }
    }
}

/// A gripper width request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GripperCommand {
    width: f32,
    /// Engage grasp mode: the fingers keep squeezing after contact.
    pub grasp: bool,
    /// Finger speed in m/s.
    pub speed: f32,
    /// Continuous grasp force in N; 0 leaves force control off.
    pub force: f32,
    /// Allowed undershoot of the target width.
    pub epsilon_inner: f32,
    /// Allowed overshoot of the target width.
    pub epsilon_outer: f32,
    /// Wait for the motion to finish before returning.
    pub blocking: bool,
    /// Treat a failed command as advisory: log and continue.
    pub ignore_errors: bool,
}

impl GripperCommand {
    /// Request the given width, clamped into `[0, MAX_GRIPPER_WIDTH]`.
    ///
    /// Epsilons default to the full width range, so width mismatches never
    /// fail the move.
    #[must_use]
    pub fn new(width: f32) -> Self {
        Self {
            width: width.clamp(0.0, MAX_GRIPPER_WIDTH),
            grasp: false,
            speed: 0.1,
            force: 0.0,
            epsilon_inner: MAX_GRIPPER_WIDTH,
            epsilon_outer: MAX_GRIPPER_WIDTH,
            blocking: true,
            ignore_errors: false,
        }
    }

    /// Fully open.
    #[must_use]
    pub fn open() -> Self {
        Self::new(MAX_GRIPPER_WIDTH)
    }

    /// Fully closed, in grasp mode.
    #[must_use]
    pub fn close() -> Self {
        Self::new(0.0).with_grasp(true)
    }

    /// Clamped target width in meters.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    #[must_use]
    pub const fn with_grasp(mut self, grasp: bool) -> Self {
        self.grasp = grasp;
        self
    }

    #[must_use]
    pub const fn non_blocking(mut self) -> Self {
        self.blocking = false;
        self
    }

    #[must_use]
    pub const fn ignoring_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
