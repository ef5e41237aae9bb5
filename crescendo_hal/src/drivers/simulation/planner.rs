//! Geometric aim planner.
//!
//! Points the robot at a fixed target and derives the flywheel speed and
//! pivot angle from the straight-line distance. Out of range yields no
//! solution.

use std::cell::Cell;

use crescendo_common::geometry::{Pose2d, Translation2d};
use crescendo_common::hal::driver::AimPlanner;
use crescendo_common::hal::types::AimSolution;

/// Blue speaker opening, field frame [m].
const BLUE_SPEAKER: Translation2d = Translation2d::new(0.0, 5.55);
/// Opening height above the pivot axle [m].
const TARGET_RISE_M: f64 = 1.6;

/// Distance-based aim solution.
#[derive(Debug)]
pub struct GeometricAimPlanner {
    target: Translation2d,
    max_range_m: f64,
    base_rps: f64,
    rps_per_m: f64,
    max_rps: f64,
    cached: Cell<Option<AimSolution>>,
}

impl Default for GeometricAimPlanner {
    fn default() -> Self {
        Self::new(BLUE_SPEAKER, 6.0)
    }
}

impl GeometricAimPlanner {
    /// Planner aiming at `target`, valid up to `max_range_m`.
    pub fn new(target: Translation2d, max_range_m: f64) -> Self {
        Self {
            target,
            max_range_m,
            base_rps: 30.0,
            rps_per_m: 15.0,
            max_rps: 200.0,
            cached: Cell::new(None),
        }
    }

    fn solve(&self, pose: &Pose2d) -> Option<AimSolution> {
        let dx = self.target.x - pose.x;
        let dy = self.target.y - pose.y;
        let distance = dx.hypot(dy);
        if distance > self.max_range_m || distance < f64::EPSILON {
            return None;
        }
        Some(AimSolution {
            flywheel_rps: (self.base_rps + self.rps_per_m * distance).min(self.max_rps),
            pivot_deg: TARGET_RISE_M.atan2(distance).to_degrees(),
            heading_deg: dy.atan2(dx).to_degrees(),
        })
    }
}

impl AimPlanner for GeometricAimPlanner {
    fn refresh(&self, pose: &Pose2d) {
        self.cached.set(self.solve(pose));
    }

    fn solution(&self) -> Option<AimSolution> {
        self.cached.get()
    }
}
