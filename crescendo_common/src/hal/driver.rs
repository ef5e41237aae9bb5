//! IO, drivebase, planner and input-source traits.
//!
//! This module defines:
//! - `MechanismIo` - generic feedback/command handle owned by one state machine
//! - `Drivebase` - chassis request sink plus pose and velocity sources
//! - `AimPlanner` - read-only aim solution shared by several mechanisms
//! - `InputSource` - per-tick operator input snapshot
//!
//! Nothing here blocks. Implementations poll cached values.

use crate::geometry::{ChassisSpeeds, Pose2d};
use crate::hal::types::*;
use crate::robot::input::OperatorInputs;

/// Sensor/actuator handle for one mechanism.
///
/// `read()` returns `None` when feedback is stale or missing.
pub trait MechanismIo {
    type Feedback: Copy;
    type Command: Copy;

    fn read(&mut self) -> Option<Self::Feedback>;
    fn write(&mut self, command: &Self::Command);
}

pub type ShooterIo = dyn MechanismIo<Feedback = ShooterFeedback, Command = ShooterCommand>;
pub type IntakeIo = dyn MechanismIo<Feedback = IntakeFeedback, Command = IntakeCommand>;
pub type PivotIo = dyn MechanismIo<Feedback = PivotFeedback, Command = PivotCommand>;
pub type DiverterIo = dyn MechanismIo<Feedback = DiverterFeedback, Command = DiverterCommand>;
pub type ClimberIo = dyn MechanismIo<Feedback = ClimberFeedback, Command = ClimberCommand>;

/// Chassis interface. Kinematics and odometry live behind it.
pub trait Drivebase {
    /// Apply one request. Called exactly once per tick.
    fn apply(&mut self, request: &DriveRequest);

    /// Zero the odometry heading.
    fn reset_odometry(&mut self);

    /// Latest fused pose.
    fn pose(&self) -> Pose2d;

    /// Latest robot-relative chassis velocity (+x toward the front intake).
    fn chassis_speeds(&self) -> ChassisSpeeds;

    /// Supply voltage seen by the drive modules [V], `None` if unmeasured.
    fn battery_voltage(&self) -> Option<f64> {
        None
    }
}

/// Aim solution provider.
///
/// Shared read-only between the shooter, pivot and swerve machines, so
/// `refresh` takes `&self`; implementations keep their cache in a `Cell`.
pub trait AimPlanner {
    /// Recompute from the latest pose. Called once per tick before any reader.
    fn refresh(&self, _pose: &Pose2d) {}

    /// Current solution, `None` when no target is available.
    fn solution(&self) -> Option<AimSolution>;
}

/// Source of the operator input snapshot.
pub trait InputSource {
    /// Latest snapshot. Called once per tick.
    fn poll(&mut self) -> OperatorInputs;
}
