//! Operator input snapshot.
//!
//! One `OperatorInputs` value is polled per tick. It replaces per-button
//! callbacks: the resolver and the drive command read plain fields.

use serde::{Deserialize, Serialize};

use crate::geometry::Alliance;

/// Raw driver sticks, each axis in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSticks {
    /// Forward (+) / back.
    pub translation: f64,
    /// Left (+) / right.
    pub strafe: f64,
    /// CCW (+) / CW.
    pub rotation: f64,
    /// D-pad heading request [deg], `None` when released.
    pub pov: Option<f64>,
}

/// Everything the operators asked for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorInputs {
    pub drive: DriveSticks,

    // Mode select (later wins: amp, climb, speaker)
    pub wants_speaker_mode: bool,
    pub wants_amp_mode: bool,
    pub wants_climb_mode: bool,

    // Actions
    pub wants_intake: bool,
    pub wants_shoot: bool,
    pub wants_stow: bool,
    pub wants_place: bool,
    pub wants_align: bool,
    pub wants_balance: bool,
    pub wants_climb_extend: bool,
    pub wants_climb_retract: bool,

    // Overrides
    pub force_aim: bool,
    pub force_intake_front: bool,
    pub force_intake_back: bool,
    pub force_handoff: bool,
    pub force_amp: bool,

    // Direct mechanism overrides
    /// Suppress every heading lock (aim target and D-pad).
    pub disable_auto_heading: bool,
    /// Run the shooter trigger forward regardless of state.
    pub force_trigger: bool,
    /// Reverse the active intake.
    pub eject: bool,

    // Manual jogs, each axis in [-1, 1]
    /// Trigger effort while non-zero, whatever the shooter state.
    pub jog_trigger: f64,
    /// Nudges the pivot angle offset at `pivot.jog_rate_deg_per_s`.
    pub jog_pivot: f64,
    /// Nudges the climber height offset at `climber.jog_rate_m_per_s`.
    pub jog_climber: f64,
    /// Clear the pivot and climber offsets.
    pub reset_manual_inputs: bool,

    // Drive
    pub robot_centric: bool,
    pub lock_in: bool,
    /// Closed-loop module velocity control; open loop otherwise.
    pub closed_loop: bool,
    pub zero_odometry: bool,

    pub alliance: Alliance,
}

/// Per-tick input to the drive teleoperation command.
///
/// Built by the swerve machine from the sticks and its active state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveInputs {
    /// Forward stick in [-1, 1].
    pub x: f64,
    /// Left stick in [-1, 1].
    pub y: f64,
    /// Rotation stick in [-1, 1].
    pub rotation: f64,
    /// Heading to hold when `auto_heading` is set [deg].
    pub heading_deg: f64,
    pub auto_heading: bool,
    pub field_relative: bool,
    pub open_loop: bool,
    pub wheel_lock: bool,
    pub zero_odometry: bool,
}
