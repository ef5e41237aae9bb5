//! One-dimensional actuator physics.
//!
//! `Axis1d` follows a target with velocity and acceleration limits
//! (triangular profile). It lands exactly on the target instead of
//! overshooting, so tolerance checks settle deterministically.

use tracing::trace;

/// Move `current` toward `target` by at most `max_step`.
#[inline]
pub fn approach(current: f64, target: f64, max_step: f64) -> f64 {
    current + (target - current).clamp(-max_step, max_step)
}

/// Position-controlled axis with kinematic limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis1d {
    /// Current position in user units.
    pub position: f64,
    /// Current velocity in user units/second.
    pub velocity: f64,
    max_velocity: f64,
    max_acceleration: f64,
}

impl Axis1d {
    /// Axis at rest at `position`.
    pub const fn new(position: f64, max_velocity: f64, max_acceleration: f64) -> Self {
        Self {
            position,
            velocity: 0.0,
            max_velocity,
            max_acceleration,
        }
    }

    /// Advance one step of `dt` seconds toward `target`.
    pub fn step(&mut self, target: f64, dt: f64) {
        let error = target - self.position;

        let stopping_distance = self.velocity * self.velocity / (2.0 * self.max_acceleration);
        let desired = if error.abs() <= stopping_distance {
            error.signum() * (2.0 * self.max_acceleration * error.abs()).sqrt().min(self.max_velocity)
        } else {
            error.signum() * self.max_velocity
        };

        let dv = self.max_acceleration * dt;
        self.velocity = approach(self.velocity, desired, dv).clamp(-self.max_velocity, self.max_velocity);

        let travel = self.velocity * dt;
        if travel.abs() >= error.abs() {
            self.position = target;
            self.velocity = 0.0;
        } else {
            self.position += travel;
        }

        trace!(pos = self.position, vel = self.velocity, target, "axis step");
    }

    /// True once the axis has landed on `target` and stopped.
    #[inline]
    pub fn settled_at(&self, target: f64) -> bool {
        self.position == target && self.velocity == 0.0
    }
}
