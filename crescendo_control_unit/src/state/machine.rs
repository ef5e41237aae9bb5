//! Mechanism state machine contract.
//!
//! ```text
//! request_state(S) ──► pending ──update()──► forced edges ──► active ──► actuators
//! ```
//!
//! `request_state` never rejects: safety substitution is the coordinator's
//! job. `update` runs exactly once per tick. Readiness is recomputed by
//! every `update`, except `INTERLOCKED`, which only the coordinator sets.

use core::fmt::Debug;

use crescendo_common::robot::error::ReadinessFlags;
use tracing::debug;

/// Uniform contract for every mechanism.
pub trait StateMachine {
    /// The mechanism's state space.
    type State: Copy + PartialEq + Debug;

    /// Store `state` as the pending target.
    fn request_state(&mut self, state: Self::State);

    /// Resolve the pending request, evaluate sensor-forced edges and drive
    /// the actuators toward the active state's setpoint.
    fn update(&mut self);

    /// Active state (after forcing).
    fn state(&self) -> Self::State;

    /// Pending requested state.
    fn requested(&self) -> Self::State;

    /// Why the mechanism is not settled. Empty when at target.
    fn readiness(&self) -> ReadinessFlags;

    /// Raise or clear `INTERLOCKED`.
    fn set_interlocked(&mut self, engaged: bool);

    /// True until the target is reached within tolerance, or while any
    /// readiness flag is raised.
    #[inline]
    fn transitioning(&self) -> bool {
        !self.readiness().is_empty()
    }

    /// True if the active state's setpoint comes from a planner.
    fn is_dynamic(&self) -> bool;
}

/// Absolute tolerance check.
#[inline]
pub(crate) fn within(actual: f64, target: f64, tolerance: f64) -> bool {
    (actual - target).abs() <= tolerance
}

/// Log an active-state change on the edge only.
#[inline]
pub(crate) fn log_edge<S: PartialEq + Debug>(mechanism: &'static str, from: S, to: S) {
    if from != to {
        debug!(mechanism, ?from, ?to, "state change");
    }
}

/// Log a readiness change on the edge only.
#[inline]
pub(crate) fn log_readiness(mechanism: &'static str, before: ReadinessFlags, after: ReadinessFlags) {
    let raised = after.difference(before);
    if raised.is_degraded() {
        tracing::warn!(mechanism, flags = ?raised, "mechanism degraded");
    }
    let cleared = before.difference(after);
    if cleared.is_degraded() {
        debug!(mechanism, flags = ?cleared, "mechanism recovered");
    }
}
