// armkit-vision: RGB frames, HSV masking, and blob detection for camera-based rewards.

pub mod blob;
pub mod error;
pub mod frame;

pub use blob::{BlobDetector, HsvRange, Mask, Rect};
pub use error::VisionError;
pub use frame::Frame;
