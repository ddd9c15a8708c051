use thiserror::Error;

/// Errors surfaced by arm and camera drivers.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Connection to arm lost: {0}")]
    Connection(String),

    #[error("Motion aborted: {0}")]
    MotionAborted(String),

    #[error("Gripper command failed: {0}")]
    Gripper(String),

    #[error("Joint reset failed: {0}")]
    ResetFailed(String),

    #[error("Camera capture failed: {0}")]
    Capture(String),
}
