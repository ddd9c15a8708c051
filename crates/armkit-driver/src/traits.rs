use armkit_core::pose::Pose;
use armkit_vision::Frame;

use crate::command::{GripperCommand, MotionParams};
use crate::error::DriverError;

// ---------------------------------------------------------------------------
// ArmDriver
// ---------------------------------------------------------------------------

/// Contract between the environment and an arm backend.
///
/// When a motion method returns `Ok` and the command was blocking, the arm
/// has finished moving; for a non-blocking command the motion has been
/// accepted. Implementations own their connection state, hence `&mut self`
/// throughout.
pub trait ArmDriver: Send + 'static {
    /// Current end-effector pose in the base frame.
    fn pose(&mut self) -> Result<Pose, DriverError>;

    /// Move the end-effector to `target`.
    fn goto_pose(&mut self, target: &Pose, params: &MotionParams) -> Result<(), DriverError>;

    /// Drive the gripper to the commanded width.
    fn goto_gripper(&mut self, cmd: &GripperCommand) -> Result<(), DriverError>;

    /// Current gripper opening in meters.
    fn gripper_width(&mut self) -> Result<f32, DriverError>;

    /// Run the joint-space homing routine.
    fn reset_joints(&mut self) -> Result<(), DriverError>;

    /// Human-readable name for this driver.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// A camera that produces RGB frames on demand.
pub trait Camera: Send + 'static {
    /// Grab one frame.
    fn capture(&mut self) -> Result<Frame, DriverError>;

    /// Human-readable name for this camera.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct NullArm;

    impl ArmDriver for NullArm {
        fn pose(&mut self) -> Result<Pose, DriverError> {
            Ok(Pose::identity())
        }

        fn goto_pose(&mut self, _target: &Pose, _params: &MotionParams) -> Result<(), DriverError> {
            Ok(())
        }

        fn goto_gripper(&mut self, _cmd: &GripperCommand) -> Result<(), DriverError> {
            Ok(())
        }

        fn gripper_width(&mut self) -> Result<f32, DriverError> {
            Ok(0.0)
        }

        fn reset_joints(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    struct NullCamera;

    impl Camera for NullCamera {
        fn capture(&mut self) -> Result<Frame, DriverError> {
            Ok(Frame::new(2, 2))
        }
    }

    #[test]
    fn default_names_use_type_name() {
        let arm = NullArm;
        assert!(arm.name().contains("NullArm"));
        let cam = NullCamera;
        assert!(cam.name().contains("NullCamera"));
    }

    #[test]
    fn drivers_are_boxable() {
        let mut arm: Box<dyn ArmDriver> = Box::new(NullArm);
        assert!(arm.reset_joints().is_ok());
        let mut cam: Box<dyn Camera> = Box::new(NullCamera);
        assert_eq!(cam.capture().unwrap().width(), 2);
    }
}
