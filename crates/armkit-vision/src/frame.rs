//! Raw RGB frame storage.
//!
//! [`Frame`] holds a single row-major RGB8 image. Frames come out of a
//! camera and flow into the blob pipeline or into flattened pixel
//! observations; all operations are CPU-side on the raw byte buffer.

use crate::error::VisionError;

/// Bytes per RGB8 pixel.
pub const BYTES_PER_PIXEL: usize = 3;

/// A single row-major RGB8 image.
///
/// # Example
///
/// ```
/// use armkit_vision::Frame;
///
/// let mut frame = Frame::new(4, 2);
/// frame.set_pixel(1, 0, [255, 0, 128]);
/// assert_eq!(frame.pixel(1, 0), [255, 0, 128]);
/// assert_eq!(frame.data().len(), 4 * 2 * 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Create a zero-filled (black) frame.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * BYTES_PER_PIXEL],
        }
    }

    /// Create a frame filled with a single color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut frame = Self::new(width, height);
        for chunk in frame.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&rgb);
        }
        frame
    }

    /// Wrap existing pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::FrameSizeMismatch`] when `data.len()` is not
    /// `width * height * 3`, or [`VisionError::EmptyFrame`] for zero
    /// dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, VisionError> {
        if width == 0 || height == 0 {
            return Err(VisionError::EmptyFrame { width, height });
        }
        let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(VisionError::FrameSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel data as a byte slice (row-major RGB).
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        assert!(x < self.width, "x={x} out of bounds (width={})", self.width);
        assert!(
            y < self.height,
            "y={y} out of bounds (height={})",
            self.height
        );
        let offset = ((y * self.width + x) as usize) * BYTES_PER_PIXEL;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }

    /// Write a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        assert!(x < self.width, "x={x} out of bounds (width={})", self.width);
        assert!(
            y < self.height,
            "y={y} out of bounds (height={})",
            self.height
        );
        let offset = ((y * self.width + x) as usize) * BYTES_PER_PIXEL;
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgb);
    }

    /// Fill an axis-aligned rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, rgb: [u8; 3]) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for py in y..y_end {
            for px in x..x_end {
                self.set_pixel(px, py, rgb);
            }
        }
    }

    /// Resample to a new resolution by box averaging.
    ///
    /// Each destination pixel averages the source pixels its footprint
    /// covers. Footprints smaller than one pixel fall back to the nearest
    /// source pixel, so upscaling is well-defined too.
    ///
    /// # Panics
    ///
    /// Panics if the source frame has zero dimensions.
    #[must_use]
    pub fn resize(&self, new_width: u32, new_height: u32) -> Self {
        assert!(
            self.width > 0 && self.height > 0,
            "cannot resize an empty frame"
        );
        if new_width == self.width && new_height == self.height {
            return self.clone();
        }
        let mut out = Self::new(new_width, new_height);
        for dy in 0..new_height {
            let (y0, y1) = source_span(dy, new_height, self.height);
            for dx in 0..new_width {
                let (x0, x1) = source_span(dx, new_width, self.width);
                let mut sums = [0u64; 3];
                let mut count = 0u64;
                for sy in y0..y1 {
                    for sx in x0..x1 {
                        let p = self.pixel(sx, sy);
                        sums[0] += u64::from(p[0]);
                        sums[1] += u64::from(p[1]);
                        sums[2] += u64::from(p[2]);
                        count += 1;
                    }
                }
                #[allow(clippy::cast_possible_truncation)]
                let rgb = [
                    (sums[0] / count) as u8,
                    (sums[1] / count) as u8,
                    (sums[2] / count) as u8,
                ];
                out.set_pixel(dx, dy, rgb);
            }
        }
        out
    }

    /// Flatten channel-first (CHW) with values in [0, 255].
    ///
    /// Output length is `3 * height * width`, ordered R-plane, G-plane,
    /// B-plane.
    #[must_use]
    pub fn to_chw_f32(&self) -> Vec<f32> {
        let plane = (self.width as usize) * (self.height as usize);
        let mut out = vec![0.0_f32; 3 * plane];
        for (i, chunk) in self.data.chunks_exact(BYTES_PER_PIXEL).enumerate() {
            out[i] = f32::from(chunk[0]);
            out[plane + i] = f32::from(chunk[1]);
            out[2 * plane + i] = f32::from(chunk[2]);
        }
        out
    }
}

/// Half-open source pixel span covered by destination index `d`.
///
/// Guaranteed non-empty for any `src >= 1`.
fn source_span(d: u32, dst: u32, src: u32) -> (u32, u32) {
    let lo = (u64::from(d) * u64::from(src)) / u64::from(dst);
    let hi = (u64::from(d + 1) * u64::from(src)).div_ceil(u64::from(dst));
    #[allow(clippy::cast_possible_truncation)]
    let (mut lo, mut hi) = (lo as u32, (hi as u32).min(src));
    if hi <= lo {
        lo = lo.min(src - 1);
        hi = lo + 1;
    }
    (lo, hi)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
