//! Color-blob detection.
//!
//! The pipeline mirrors a classic tabletop tracking setup: downscale the
//! camera frame, threshold in HSV, clean the mask with a morphological
//! open then close, and take the bounding box of the largest connected
//! region. [`BlobDetector::center_x`] returns that box's horizontal
//! center in resized-image coordinates.
//!
//! Hue uses the half-degree convention (0..=179) so thresholds stay in a
//! single byte; saturation and value span 0..=255.

use crate::error::VisionError;
use crate::frame::Frame;

// ---------------------------------------------------------------------------
// HSV conversion
// ---------------------------------------------------------------------------

/// Convert one RGB pixel to HSV with H in 0..=179 and S, V in 0..=255.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = f32::from(rgb[0]);
    let g = f32::from(rgb[1]);
    let b = f32::from(rgb[2]);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = max;
    let saturation = if max > 0.0 { 255.0 * delta / max } else { 0.0 };
    let hue_degrees = if delta > 0.0 {
        let h = if (max - r).abs() < f32::EPSILON {
            60.0 * (g - b) / delta
        } else if (max - g).abs() < f32::EPSILON {
            120.0 + 60.0 * (b - r) / delta
        } else {
            240.0 + 60.0 * (r - g) / delta
        };
        if h < 0.0 { h + 360.0 } else { h }
    } else {
        0.0
    };

    [
        ((hue_degrees / 2.0).round() as u32).min(179) as u8,
        (saturation.round() as u32).min(255) as u8,
        (value.round() as u32).min(255) as u8,
    ]
}

// ---------------------------------------------------------------------------
// HsvRange
// ---------------------------------------------------------------------------

/// Inclusive HSV threshold window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    hue: (u8, u8),
    sat: (u8, u8),
    val: (u8, u8),
}

impl HsvRange {
    /// Create a threshold window from inclusive (low, high) pairs.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::HueOutOfRange`] for hue bounds above 179 and
    /// [`VisionError::InvalidHsvBound`] when any low exceeds its high.
    pub fn new(hue: (u8, u8), sat: (u8, u8), val: (u8, u8)) -> Result<Self, VisionError> {
        for bound in [hue.0, hue.1] {
            if bound > 179 {
                return Err(VisionError::HueOutOfRange { value: bound });
            }
        }
        for (field, (lo, hi)) in [("hue", hue), ("sat", sat), ("val", val)] {
            if lo > hi {
                return Err(VisionError::InvalidHsvBound {
                    field,
                    low: lo,
                    high: hi,
                });
            }
        }
        Ok(Self { hue, sat, val })
    }

    /// Threshold window for the magenta die used on the rig.
    #[must_use]
    pub const fn magenta_die() -> Self {
        Self {
            hue: (155, 179),
            sat: (25, 255),
            val: (0, 255),
        }
    }

    /// Whether an HSV pixel falls inside the window.
    #[must_use]
    pub const fn contains(&self, hsv: [u8; 3]) -> bool {
        hsv[0] >= self.hue.0
            && hsv[0] <= self.hue.1
            && hsv[1] >= self.sat.0
            && hsv[1] <= self.sat.1
            && hsv[2] >= self.val.0
            && hsv[2] <= self.val.1
    }
}

impl Default for HsvRange {
    fn default() -> Self {
        Self::magenta_die()
    }
}

// ---------------------------------------------------------------------------
// Mask
// ---------------------------------------------------------------------------

/// Binary image produced by thresholding a [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// Threshold a frame: a mask pixel is set when the HSV-converted
    /// source pixel falls inside `range`.
    #[must_use]
    pub fn in_range(frame: &Frame, range: &HsvRange) -> Self {
        let width = frame.width();
        let height = frame.height();
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                data.push(range.contains(rgb_to_hsv(frame.pixel(x, y))));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[(y * self.width + x) as usize]
    }

    /// Number of set pixels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Erosion with a square kernel: a pixel survives only when every
    /// in-bounds pixel under the kernel is set.
    #[must_use]
    pub fn eroded(&self, kernel: u32) -> Self {
        self.morph(kernel, true)
    }

    /// Dilation with a square kernel: a pixel is set when any in-bounds
    /// pixel under the kernel is set.
    #[must_use]
    pub fn dilated(&self, kernel: u32) -> Self {
        self.morph(kernel, false)
    }

    /// Morphological open (erode then dilate). Removes speckles smaller
    /// than the kernel.
    #[must_use]
    pub fn opened(&self, kernel: u32) -> Self {
        self.eroded(kernel).dilated(kernel)
    }

    /// Morphological close (dilate then erode). Fills holes smaller than
    /// the kernel.
    #[must_use]
    pub fn closed(&self, kernel: u32) -> Self {
        self.dilated(kernel).eroded(kernel)
    }

    fn morph(&self, kernel: u32, require_all: bool) -> Self {
        let anchor = i64::from(kernel / 2);
        let k = i64::from(kernel);
        let mut out = vec![false; self.data.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                let mut acc = require_all;
                'window: for dy in 0..k {
                    for dx in 0..k {
                        let sx = i64::from(x) + dx - anchor;
                        let sy = i64::from(y) + dy - anchor;
                        if sx < 0
                            || sy < 0
                            || sx >= i64::from(self.width)
                            || sy >= i64::from(self.height)
                        {
                            continue;
                        }
                        #[allow(clippy::cast_sign_loss)]
                        let v = self.get(sx as u32, sy as u32);
                        if require_all && !v {
                            acc = false;
                            break 'window;
                        }
                        if !require_all && v {
                            acc = true;
                            break 'window;
                        }
                    }
                }
                out[(y * self.width + x) as usize] = acc;
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data: out,
        }
    }

    /// Bounding box of the largest 4-connected region of set pixels, by
    /// pixel count. `None` when the mask is empty.
    #[must_use]
    pub fn largest_component(&self) -> Option<Rect> {
        let mut visited = vec![false; self.data.len()];
        let mut best: Option<(usize, Rect)> = None;
        let mut stack: Vec<(u32, u32)> = Vec::new();

        for start_y in 0..self.height {
            for start_x in 0..self.width {
                let idx = (start_y * self.width + start_x) as usize;
                if visited[idx] || !self.data[idx] {
                    continue;
                }
                // Flood fill one component
                let mut area = 0usize;
                let (mut min_x, mut max_x) = (start_x, start_x);
                let (mut min_y, mut max_y) = (start_y, start_y);
                visited[idx] = true;
                stack.push((start_x, start_y));
                while let Some((x, y)) = stack.pop() {
                    area += 1;
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_y = min_y.min(y);
                    max_y = max_y.max(y);
                    let mut try_push = |nx: u32, ny: u32| {
                        let nidx = (ny * self.width + nx) as usize;
                        if !visited[nidx] && self.data[nidx] {
                            visited[nidx] = true;
                            stack.push((nx, ny));
                        }
                    };
                    if x > 0 {
                        try_push(x - 1, y);
                    }
                    if x + 1 < self.width {
                        try_push(x + 1, y);
                    }
                    if y > 0 {
                        try_push(x, y - 1);
                    }
                    if y + 1 < self.height {
                        try_push(x, y + 1);
                    }
                }
                let rect = Rect {
                    x: min_x,
                    y: min_y,
                    width: max_x - min_x + 1,
                    height: max_y - min_y + 1,
                };
                if best.as_ref().is_none_or(|(a, _)| area > *a) {
                    best = Some((area, rect));
                }
            }
        }
        best.map(|(_, rect)| rect)
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Horizontal center, `x + width / 2`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center_x(&self) -> f32 {
        self.x as f32 + self.width as f32 / 2.0
    }
}

// ---------------------------------------------------------------------------
// BlobDetector
// ---------------------------------------------------------------------------

/// Full detection pipeline: resize, threshold, open, close, largest box.
#[derive(Debug, Clone)]
pub struct BlobDetector {
    resize_width: u32,
    resize_height: u32,
    range: HsvRange,
    open_kernel: u32,
    close_kernel: u32,
}

impl BlobDetector {
    /// Build a detector.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::EmptyFrame`] for zero resize dimensions or
    /// [`VisionError::InvalidKernel`] for zero kernels.
    pub fn new(
        resize_width: u32,
        resize_height: u32,
        range: HsvRange,
        open_kernel: u32,
        close_kernel: u32,
    ) -> Result<Self, VisionError> {
        if resize_width == 0 || resize_height == 0 {
            return Err(VisionError::EmptyFrame {
                width: resize_width,
                height: resize_height,
            });
        }
        for size in [open_kernel, close_kernel] {
            if size == 0 {
                return Err(VisionError::InvalidKernel { size });
            }
        }
        Ok(Self {
            resize_width,
            resize_height,
            range,
            open_kernel,
            close_kernel,
        })
    }

    /// Width frames are resized to before detection.
    #[must_use]
    pub const fn resize_width(&self) -> u32 {
        self.resize_width
    }

    /// Height frames are resized to before detection.
    #[must_use]
    pub const fn resize_height(&self) -> u32 {
        self.resize_height
    }

    /// Horizontal center of the largest matching blob, in resized
    /// coordinates. `None` when nothing matches.
    #[must_use]
    pub fn center_x(&self, frame: &Frame) -> Option<f32> {
        self.detect(frame).map(|rect| rect.center_x())
    }

    /// Bounding box of the largest matching blob, in resized coordinates.
    #[must_use]
    pub fn detect(&self, frame: &Frame) -> Option<Rect> {
        let resized = frame.resize(self.resize_width, self.resize_height);
        let mask = Mask::in_range(&resized, &self.range)
            .opened(self.open_kernel)
            .closed(self.close_kernel);
        mask.largest_component()
    }
}

impl Default for BlobDetector {
    /// The rig defaults: 340x220 working resolution, magenta window,
    /// 5px open and 20px close.
    fn default() -> Self {
        Self {
            resize_width: 340,
            resize_height: 220,
            range: HsvRange::magenta_die(),
            open_kernel: 5,
            close_kernel: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Saturated magenta, hue 165 in half-degrees.
    const MAGENTA: [u8; 3] = [255, 0, 128];

    // ---- rgb_to_hsv ----

    #[test]
    fn hsv_primary_colors() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]); // red
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]); // green
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]); // blue
    }

    #[test]
    fn hsv_grays_have_zero_saturation() {
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([255, 255, 255]), [0, 0, 255]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn hsv_magenta_hue_wraps_high() {
        let hsv = rgb_to_hsv(MAGENTA);
        assert_eq!(hsv[0], 165);
        assert_eq!(hsv[1], 255);
        assert_eq!(hsv[2], 255);
    }

    #[test]
    fn hsv_dark_magenta_keeps_hue() {
        let hsv = rgb_to_hsv([128, 0, 64]);
        assert_eq!(hsv[0], 165);
        assert_eq!(hsv[2], 128);
    }

    // ---- HsvRange ----

    #[test]
    fn range_rejects_hue_above_179() {
        let err = HsvRange::new((0, 200), (0, 255), (0, 255)).unwrap_err();
        assert_eq!(err, VisionError::HueOutOfRange { value: 200 });
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let err = HsvRange::new((10, 5), (0, 255), (0, 255)).unwrap_err();
        assert_eq!(
            err,
            VisionError::InvalidHsvBound {
                field: "hue",
                low: 10,
                high: 5
            }
        );
    }

    #[test]
    fn magenta_die_range_matches_die_color() {
        let range = HsvRange::magenta_die();
        assert!(range.contains(rgb_to_hsv(MAGENTA)));
        assert!(!range.contains(rgb_to_hsv([0, 255, 0])));
        assert!(!range.contains(rgb_to_hsv([255, 255, 255]))); // unsaturated
    }

    // ---- Mask ----

    fn mask_from_bits(width: u32, height: u32, bits: &[u8]) -> Mask {
        let mut frame = Frame::new(width, height);
        for (i, &b) in bits.iter().enumerate() {
            if b != 0 {
                let x = (i as u32) % width;
                let y = (i as u32) / width;
                frame.set_pixel(x, y, MAGENTA);
            }
        }
        Mask::in_range(&frame, &HsvRange::magenta_die())
    }

    #[test]
    fn in_range_thresholds_pixels() {
        let mut frame = Frame::new(3, 1);
        frame.set_pixel(1, 0, MAGENTA);
        let mask = Mask::in_range(&frame, &HsvRange::magenta_die());
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(2, 0));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn erode_removes_isolated_pixel() {
        let mask = mask_from_bits(5, 5, &[
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 1, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
        ]);
        assert_eq!(mask.eroded(3).count(), 0);
    }

    #[test]
    fn erode_keeps_solid_interior() {
        let mask = mask_from_bits(5, 5, &[1; 25]);
        let eroded = mask.eroded(3);
        // Border treated as neutral, so the full block survives
        assert_eq!(eroded.count(), 25);
    }

    #[test]
    fn dilate_grows_single_pixel() {
        let mask = mask_from_bits(5, 5, &[
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 1, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
        ]);
        let dilated = mask.dilated(3);
        assert_eq!(dilated.count(), 9);
        assert!(dilated.get(1, 1));
        assert!(dilated.get(3, 3));
        assert!(!dilated.get(0, 0));
    }

    #[test]
    fn open_removes_speckle_keeps_block() {
        let mask = mask_from_bits(8, 5, &[
            1, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 1, 1, 1, 0, 0,
            0, 0, 0, 1, 1, 1, 0, 0,
            0, 0, 0, 1, 1, 1, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0,
        ]);
        let opened = mask.opened(3);
        assert!(!opened.get(0, 0), "speckle should be removed");
        assert!(opened.get(4, 2), "block interior should survive");
    }

    #[test]
    fn close_fills_hole() {
        let mask = mask_from_bits(5, 5, &[
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 0, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
        ]);
        let closed = mask.closed(3);
        assert!(closed.get(2, 2), "hole should be filled");
        assert_eq!(closed.count(), 25);
    }

    // ---- largest_component ----

    #[test]
    fn largest_component_empty_mask() {
        let mask = mask_from_bits(4, 4, &[0; 16]);
        assert_eq!(mask.largest_component(), None);
    }

    #[test]
    fn largest_component_single_blob() {
        let mask = mask_from_bits(6, 4, &[
            0, 0, 0, 0, 0, 0,
            0, 1, 1, 1, 0, 0,
            0, 1, 1, 1, 0, 0,
            0, 0, 0, 0, 0, 0,
        ]);
        let rect = mask.largest_component().unwrap();
        assert_eq!(
            rect,
            Rect {
                x: 1,
                y: 1,
                width: 3,
                height: 2
            }
        );
    }

    #[test]
    fn largest_component_picks_bigger_blob() {
        let mask = mask_from_bits(8, 3, &[
            1, 1, 0, 0, 1, 1, 1, 0,
            1, 0, 0, 0, 1, 1, 1, 0,
            0, 0, 0, 0, 0, 0, 0, 0,
        ]);
        let rect = mask.largest_component().unwrap();
        assert_eq!(rect.x, 4);
        assert_eq!(rect.width, 3);
    }

    #[test]
    fn diagonal_pixels_are_separate_components() {
        let mask = mask_from_bits(4, 4, &[
            1, 0, 0, 0,
            0, 1, 0, 0,
            0, 0, 1, 1,
            0, 0, 1, 1,
        ]);
        // 4-connectivity: the 2x2 block wins over the two singletons
        let rect = mask.largest_component().unwrap();
        assert_eq!(
            rect,
            Rect {
                x: 2,
                y: 2,
                width: 2,
                height: 2
            }
        );
    }

    #[test]
    fn rect_center_x() {
        let rect = Rect {
            x: 10,
            y: 0,
            width: 5,
            height: 3,
        };
        assert!((rect.center_x() - 12.5).abs() < f32::EPSILON);
    }

    // ---- BlobDetector ----

    #[test]
    fn detector_new_validates() {
        assert!(BlobDetector::new(0, 10, HsvRange::magenta_die(), 3, 3).is_err());
        assert!(BlobDetector::new(10, 10, HsvRange::magenta_die(), 0, 3).is_err());
    }

    #[test]
    fn detector_finds_die_center() {
        // Working at detection resolution directly keeps the geometry exact.
        let mut frame = Frame::new(340, 220);
        frame.fill_rect(60, 90, 40, 40, MAGENTA);
        let detector = BlobDetector::default();
        let center = detector.center_x(&frame).unwrap();
        assert!((center - 80.0).abs() <= 2.0, "center {center} not near 80");
    }

    #[test]
    fn detector_empty_frame_returns_none() {
        let frame = Frame::new(340, 220);
        let detector = BlobDetector::default();
        assert_eq!(detector.center_x(&frame), None);
    }

    #[test]
    fn detector_ignores_speckle_noise() {
        let mut frame = Frame::new(340, 220);
        frame.fill_rect(200, 100, 50, 50, MAGENTA);
        // Single-pixel speckles far to the left
        frame.set_pixel(5, 5, MAGENTA);
        frame.set_pixel(12, 30, MAGENTA);
        let detector = BlobDetector::default();
        let center = detector.center_x(&frame).unwrap();
        assert!((center - 225.0).abs() <= 2.0, "center {center} not near 225");
    }

    #[test]
    fn detector_downscales_input() {
        // Die painted on a full-resolution frame still lands in resized coords
        let mut frame = Frame::new(680, 440);
        frame.fill_rect(120, 180, 80, 80, MAGENTA);
        let detector = BlobDetector::default();
        let center = detector.center_x(&frame).unwrap();
        // 2x downscale: center (120 + 40) / 2 = 80
        assert!((center - 80.0).abs() <= 3.0, "center {center} not near 80");
    }

    #[test]
    fn detector_picks_largest_blob() {
        let mut frame = Frame::new(340, 220);
        frame.fill_rect(30, 30, 20, 20, MAGENTA);
        frame.fill_rect(250, 120, 60, 60, MAGENTA);
        let detector = BlobDetector::default();
        let center = detector.center_x(&frame).unwrap();
        assert!((center - 280.0).abs() <= 2.0, "center {center} not near 280");
    }
}
