//! Feedback and command records exchanged with mechanism IO.
//!
//! Feedback is what a mechanism senses this tick; commands are what the
//! state machine asks the actuators to do. Both are plain `Copy` data.

use serde::{Deserialize, Serialize};

// ─── Shooter ────────────────────────────────────────────────────────

/// Shooter sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShooterFeedback {
    /// Note switch at the flywheel side.
    pub flywheel_switch: bool,
    /// Note switch at the trigger side.
    pub trigger_switch: bool,
    /// Measured flywheel velocity [rps].
    pub flywheel_rps: f64,
    /// A note left the shooter since the last read.
    pub shot_detected: bool,
}

/// Flywheel output mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlywheelCommand {
    /// Closed-loop velocity [rps].
    Velocity(f64),
    /// Active braking to zero.
    Brake,
    /// Motor output released.
    Coast,
}

impl Default for FlywheelCommand {
    fn default() -> Self {
        Self::Brake
    }
}

/// Shooter actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShooterCommand {
    pub flywheel: FlywheelCommand,
    /// Trigger roller effort in [-1, 1].
    pub trigger_effort: f64,
}

// ─── Intake ─────────────────────────────────────────────────────────

/// Intake sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntakeFeedback {
    /// Deploy arm angle [deg].
    pub deploy_deg: f64,
    /// Beam break across the roller path.
    pub beam_break: bool,
}

/// Intake actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntakeCommand {
    /// Deploy arm target [deg].
    pub deploy_deg: f64,
    /// Roller effort in [-1, 1].
    pub roller_effort: f64,
}

// ─── Pivot ──────────────────────────────────────────────────────────

/// Pivot sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PivotFeedback {
    /// Measured angle [deg].
    pub angle_deg: f64,
}

/// Pivot actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PivotCommand {
    /// Target angle [deg].
    pub angle_deg: f64,
}

// ─── Diverter ───────────────────────────────────────────────────────

/// Diverter sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiverterFeedback {
    /// Measured extension [m].
    pub extension_m: f64,
    /// Note seated in the diverter rollers.
    pub note_switch: bool,
}

/// Diverter actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DiverterCommand {
    /// Target extension [m].
    pub extension_m: f64,
    /// Roller effort in [-1, 1].
    pub roller_effort: f64,
}

// ─── Climber ────────────────────────────────────────────────────────

/// Climber sensor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClimberFeedback {
    /// Measured height [m].
    pub height_m: f64,
    /// Bottom limit switch.
    pub bottom_limit: bool,
}

/// Climber actuator command.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClimberCommand {
    /// Target height [m].
    pub height_m: f64,
}

// ─── Drivebase ──────────────────────────────────────────────────────

/// Reference frame for one drive request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DriveFrame {
    /// Velocities in the field frame.
    FieldCentric,
    /// Velocities in the robot frame.
    RobotCentric,
    /// Field-centric translation with the heading held at a target [deg].
    FacingAngle { heading_deg: f64 },
    /// Modules crossed, no motion.
    WheelLock,
}

/// One chassis request, built fresh every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveRequest {
    pub frame: DriveFrame,
    /// [m/s]
    pub vx: f64,
    /// [m/s]
    pub vy: f64,
    /// [rad/s], ignored for `FacingAngle` and `WheelLock`.
    pub omega: f64,
    /// Open-loop (voltage) module control.
    pub open_loop: bool,
}

impl Default for DriveRequest {
    fn default() -> Self {
        Self {
            frame: DriveFrame::FieldCentric,
            vx: 0.0,
            vy: 0.0,
            omega: 0.0,
            open_loop: true,
        }
    }
}

// ─── Planner ────────────────────────────────────────────────────────

/// Aim solution published by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AimSolution {
    /// Flywheel velocity [rps].
    pub flywheel_rps: f64,
    /// Pivot angle [deg].
    pub pivot_deg: f64,
    /// Field heading that points the shooter at the target [deg].
    pub heading_deg: f64,
}
