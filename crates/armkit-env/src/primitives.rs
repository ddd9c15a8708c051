//! Manipulation primitives and their action-vector layout.
//!
//! A primitive action is `[logits × num_primitives | args × MAX_ARG_LEN]`:
//! the logit segment selects one primitive by arg-max, and each primitive
//! reads a fixed, non-overlapping slice of the argument segment.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use armkit_core::types::{Action, ActionSpace};

use crate::error::EnvError;

/// Length of the continuous-argument segment.
pub const MAX_ARG_LEN: usize = 13;

// ---------------------------------------------------------------------------
// Primitive
// ---------------------------------------------------------------------------

/// A named manipulation skill selectable by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Relative end-effector translation: `[dx, dy, dz]`.
    MoveDeltaEePose,
    /// Descend by `|z_down|` open-handed, then squeeze by `d`: `[z_down, d]`.
    TopGrasp,
    /// Move up by `z` (negative treated as zero).
    Lift,
    /// Move down by `z` (negative treated as zero).
    Drop,
    /// Nudge along -y.
    MoveLeft,
    /// Nudge along +y.
    MoveRight,
    /// Nudge along +x.
    MoveForward,
    /// Nudge along -x.
    MoveBackward,
    /// Squeeze the gripper by a fraction of the full opening.
    CloseGripper,
    /// Release the gripper by a fraction of the full opening.
    OpenGripper,
}

impl Primitive {
    /// All ten primitives in dispatch order.
    pub const ALL: [Self; 10] = [
        Self::MoveDeltaEePose,
        Self::TopGrasp,
        Self::Lift,
        Self::Drop,
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveForward,
        Self::MoveBackward,
        Self::CloseGripper,
        Self::OpenGripper,
    ];

    /// Wire name, matching the serde representation.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MoveDeltaEePose => "move_delta_ee_pose",
            Self::TopGrasp => "top_grasp",
            Self::Lift => "lift",
            Self::Drop => "drop",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::MoveForward => "move_forward",
            Self::MoveBackward => "move_backward",
            Self::CloseGripper => "close_gripper",
            Self::OpenGripper => "open_gripper",
        }
    }

    /// Slice of the argument segment this primitive consumes.
    ///
    /// Offsets are fixed per primitive so that action layouts stay stable
    /// across subsets.
    pub const fn arg_range(self) -> Range<usize> {
        match self {
            Self::MoveDeltaEePose => 0..3,
            Self::TopGrasp => 3..5,
            Self::Lift => 5..6,
            Self::Drop => 6..7,
            Self::MoveLeft => 7..8,
            Self::MoveRight => 8..9,
            Self::MoveForward => 9..10,
            Self::MoveBackward => 10..11,
            Self::CloseGripper => 11..12,
            Self::OpenGripper => 12..13,
        }
    }

    /// Number of continuous arguments.
    pub const fn arg_len(self) -> usize {
        let range = self.arg_range();
        range.end - range.start
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// PrimitiveSet
// ---------------------------------------------------------------------------

/// Ordered set of primitives exposed through one action space.
///
/// Logit index `i` selects `primitives[i]`; argument offsets stay fixed
/// regardless of which primitives are present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimitiveSet {
    primitives: Vec<Primitive>,
}

impl PrimitiveSet {
    /// The full ten-primitive set in dispatch order.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            primitives: Primitive::ALL.to_vec(),
        }
    }

    /// A custom set. Argument slices must not overlap, which also rules
    /// out duplicates.
    pub fn new(primitives: Vec<Primitive>) -> Result<Self, EnvError> {
        if primitives.is_empty() {
            return Err(EnvError::EmptyPrimitiveSet);
        }
        for (i, a) in primitives.iter().enumerate() {
            for b in &primitives[i + 1..] {
                let (ra, rb) = (a.arg_range(), b.arg_range());
                if ra.start < rb.end && rb.start < ra.end {
                    return Err(EnvError::OverlappingArgs {
                        first: a.name(),
                        second: b.name(),
                    });
                }
            }
        }
        Ok(Self { primitives })
    }

    pub const fn len(&self) -> usize {
        self.primitives.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn get(&self, index: usize) -> Option<Primitive> {
        self.primitives.get(index).copied()
    }

    /// Position of a primitive in this set, if present.
    pub fn index_of(&self, primitive: Primitive) -> Option<usize> {
        self.primitives.iter().position(|p| *p == primitive)
    }

    /// Total action dimension: one logit per primitive plus the full
    /// argument segment.
    pub const fn action_dim(&self) -> usize {
        self.primitives.len() + MAX_ARG_LEN
    }

    /// Action space: logits in [0, 1], arguments in [-1, 1].
    pub fn action_space(&self) -> ActionSpace {
        let n = self.primitives.len();
        let mut low = vec![0.0; n + MAX_ARG_LEN];
        let high = vec![1.0; n + MAX_ARG_LEN];
        for v in &mut low[n..] {
            *v = -1.0;
        }
        ActionSpace::new(low, high).expect("low and high have equal length")
    }

    /// One-hot action selecting `primitives[index]`, with `args` written
    /// into that primitive's argument slice. Extra args are dropped and
    /// missing ones stay zero.
    pub fn primitive_action(&self, index: usize, args: &[f32]) -> Result<Action, EnvError> {
        let primitive = self.get(index).ok_or(EnvError::UnknownPrimitive {
            index,
            len: self.len(),
        })?;
        let n = self.primitives.len();
        let mut data = vec![0.0; self.action_dim()];
        data[index] = 1.0;
        for (offset, value) in primitive.arg_range().zip(args.iter()) {
            data[n + offset] = *value;
        }
        Ok(Action::new(data))
    }

    /// Pick the primitive by arg-max over the logit segment and extract
    /// its argument slice.
    pub fn select(&self, action: &Action) -> Result<(Primitive, Vec<f32>), EnvError> {
        if action.len() != self.action_dim() {
            return Err(EnvError::ActionDimension {
                expected: self.action_dim(),
                got: action.len(),
            });
        }
        let n = self.primitives.len();
        let index = action
            .argmax(0..n)
            .expect("set validated non-empty at construction");
        let primitive = self.primitives[index];
        let range = primitive.arg_range();
        let args = action.as_slice()[n + range.start..n + range.end].to_vec();
        Ok((primitive, args))
    }
}

impl Default for PrimitiveSet {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
