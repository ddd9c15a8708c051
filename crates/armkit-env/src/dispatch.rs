//! Per-step dispatch lifecycle for primitive execution.
//!
//! Every primitive step walks the same four phases: select a primitive
//! from the logits, execute it on the arm, observe the scene, then return
//! to idle (or close out when the episode ends). The dispatcher enforces
//! that ordering and keeps the most recent dispatch around for
//! introspection.

use serde::{Deserialize, Serialize};

use crate::error::EnvError;
use crate::primitives::Primitive;

// ---------------------------------------------------------------------------
// DispatchPhase
// ---------------------------------------------------------------------------

/// Phase of the dispatch cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchPhase {
    /// Between steps, ready to accept an action.
    #[default]
    Idle,
    /// Action received, picking the primitive.
    SelectPrimitive,
    /// Primitive running on the arm.
    Execute,
    /// Motion finished, capturing the observation.
    Observe,
    /// Episode over; only `reset` leaves this phase.
    Closed,
}

// ---------------------------------------------------------------------------
// DispatchRecord
// ---------------------------------------------------------------------------

/// Primitive and arguments of the most recent dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub primitive: Primitive,
    pub args: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Tracks the dispatch cycle across a step.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    phase: DispatchPhase,
    last: Option<DispatchRecord>,
}

impl Dispatcher {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: DispatchPhase::Idle,
            last: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// Most recent dispatch, if any step completed selection.
    #[must_use]
    pub const fn last(&self) -> Option<&DispatchRecord> {
        self.last.as_ref()
    }

    /// Start a step. Valid only from `Idle`.
    pub fn begin(&mut self) -> Result<(), EnvError> {
        self.expect_phase(DispatchPhase::Idle)?;
        self.phase = DispatchPhase::SelectPrimitive;
        Ok(())
    }

    /// Record the selected primitive. Valid only from `SelectPrimitive`.
    pub fn selected(&mut self, primitive: Primitive, args: Vec<f32>) -> Result<(), EnvError> {
        self.expect_phase(DispatchPhase::SelectPrimitive)?;
        self.last = Some(DispatchRecord { primitive, args });
        self.phase = DispatchPhase::Execute;
        Ok(())
    }

    /// Mark the motion finished. Valid only from `Execute`.
    pub fn executed(&mut self) -> Result<(), EnvError> {
        self.expect_phase(DispatchPhase::Execute)?;
        self.phase = DispatchPhase::Observe;
        Ok(())
    }

    /// Finish the step. Returns to `Idle`, or `Closed` when the episode
    /// reached a terminal state.
    pub fn observed(&mut self, terminal: bool) -> Result<(), EnvError> {
        self.expect_phase(DispatchPhase::Observe)?;
        self.phase = if terminal {
            DispatchPhase::Closed
        } else {
            DispatchPhase::Idle
        };
        Ok(())
    }

    /// Return to `Idle` from any phase and forget the last dispatch.
    pub fn reset(&mut self) {
        self.phase = DispatchPhase::Idle;
        self.last = None;
    }

    fn expect_phase(&self, expected: DispatchPhase) -> Result<(), EnvError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EnvError::Phase {
                expected,
                got: self.phase,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
