// armkit-driver: Hardware contracts for the arm and cameras, plus a kinematic sim backend.

pub mod command;
pub mod error;
pub mod sim;
pub mod traits;

pub use command::{GripperCommand, MotionParams, MAX_GRIPPER_WIDTH};
pub use error::DriverError;
pub use sim::{SceneCamera, SimArm, SimScene};
pub use traits::{ArmDriver, Camera};
