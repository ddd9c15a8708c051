//! End-effector pose and workspace bounds.
//!
//! A [`Pose`] is a position plus orientation in the robot base frame.
//! A [`Workspace`] is the axis-aligned box that every commanded position
//! is clamped into before being sent to the arm.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::SpaceError;

/// End-effector pose in the robot base frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Pose {
    #[must_use]
    pub const fn new(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Identity orientation at the origin.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Pose at `position` with identity orientation.
    #[must_use]
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Same orientation, position shifted by `delta`.
    #[must_use]
    pub fn translated(&self, delta: Vector3<f32>) -> Self {
        Self {
            position: self.position + delta,
            orientation: self.orientation,
        }
    }

    /// Same orientation, position replaced.
    #[must_use]
    pub fn with_position(&self, position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: self.orientation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned box bounding reachable end-effector positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    low: Vector3<f32>,
    high: Vector3<f32>,
}

impl Workspace {
    /// Create a workspace box.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvertedBounds`] when any axis has
    /// `low > high`.
    pub fn new(low: Vector3<f32>, high: Vector3<f32>) -> Result<Self, SpaceError> {
        for axis in 0..3 {
            if low[axis] > high[axis] {
                return Err(SpaceError::InvertedBounds { axis });
            }
        }
        Ok(Self { low, high })
    }

    #[must_use]
    pub const fn low(&self) -> Vector3<f32> {
        self.low
    }

    #[must_use]
    pub const fn high(&self) -> Vector3<f32> {
        self.high
    }

    /// Clamp a position into the box, per axis.
    #[must_use]
    pub fn clamp(&self, position: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            position.x.clamp(self.low.x, self.high.x),
            position.y.clamp(self.low.y, self.high.y),
            position.z.clamp(self.low.z, self.high.z),
        )
    }

    #[must_use]
    pub fn contains(&self, position: Vector3<f32>) -> bool {
        (0..3).all(|axis| position[axis] >= self.low[axis] && position[axis] <= self.high[axis])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_identity() {
        let pose = Pose::identity();
        assert_eq!(pose.position, Vector3::zeros());
        assert_eq!(pose.orientation, UnitQuaternion::identity());
    }

    #[test]
    fn pose_from_position() {
        let pose = Pose::from_position(Vector3::new(0.3, 0.0, 0.5));
        assert!((pose.position.x - 0.3).abs() < f32::EPSILON);
        assert_eq!(pose.orientation, UnitQuaternion::identity());
    }

    #[test]
    fn pose_translated_keeps_orientation() {
        let rot = UnitQuaternion::from_euler_angles(0.0, 0.0, 1.0);
        let pose = Pose::new(Vector3::new(1.0, 2.0, 3.0), rot);
        let moved = pose.translated(Vector3::new(0.1, -0.2, 0.0));
        assert!((moved.position.x - 1.1).abs() < f32::EPSILON);
        assert!((moved.position.y - 1.8).abs() < f32::EPSILON);
        assert_eq!(moved.orientation, rot);
    }

    #[test]
    fn pose_with_position() {
        let rot = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let pose = Pose::new(Vector3::new(1.0, 1.0, 1.0), rot);
        let replaced = pose.with_position(Vector3::zeros());
        assert_eq!(replaced.position, Vector3::zeros());
        assert_eq!(replaced.orientation, rot);
    }

    #[test]
    fn pose_serialize_roundtrip() {
        let pose = Pose::from_position(Vector3::new(0.3, -0.1, 0.4));
        let json = serde_json::to_string(&pose).unwrap();
        let pose2: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(pose, pose2);
    }

    #[test]
    fn workspace_rejects_inverted_bounds() {
        let err = Workspace::new(Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 1.0, 0.5))
            .unwrap_err();
        assert_eq!(err, SpaceError::InvertedBounds { axis: 2 });
    }

    #[test]
    fn workspace_clamp_inside_is_noop() {
        let ws = Workspace::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0)).unwrap();
        let p = Vector3::new(0.5, 0.5, 0.5);
        assert_eq!(ws.clamp(p), p);
    }

    #[test]
    fn workspace_clamp_per_axis() {
        let ws = Workspace::new(Vector3::new(0.2, -0.2, 0.1), Vector3::new(0.5, 0.3, 0.6))
            .unwrap();
        let clamped = ws.clamp(Vector3::new(0.9, -0.5, 0.3));
        assert!((clamped.x - 0.5).abs() < f32::EPSILON);
        assert!((clamped.y + 0.2).abs() < f32::EPSILON);
        assert!((clamped.z - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn workspace_contains() {
        let ws = Workspace::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0)).unwrap();
        assert!(ws.contains(Vector3::new(0.0, 1.0, 0.5)));
        assert!(!ws.contains(Vector3::new(1.1, 0.5, 0.5)));
    }

    #[test]
    fn workspace_clamped_point_is_contained() {
        let ws = Workspace::new(Vector3::new(-1.0, -1.0, 0.0), Vector3::new(1.0, 1.0, 2.0))
            .unwrap();
        let clamped = ws.clamp(Vector3::new(5.0, -5.0, -5.0));
        assert!(ws.contains(clamped));
    }
}
