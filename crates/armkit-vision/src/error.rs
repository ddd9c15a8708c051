use thiserror::Error;

/// Vision pipeline errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VisionError {
    #[error("Frame data length {got} does not match expected {expected}")]
    FrameSizeMismatch { expected: usize, got: usize },

    #[error("Frame dimensions must be non-zero, got {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("Invalid HSV bound: {field} low {low} > high {high}")]
    InvalidHsvBound {
        field: &'static str,
        low: u8,
        high: u8,
    },

    #[error("Hue bound {value} exceeds 179")]
    HueOutOfRange { value: u8 },

    #[error("Morphology kernel must be >= 1, got {size}")]
    InvalidKernel { size: u32 },
}
