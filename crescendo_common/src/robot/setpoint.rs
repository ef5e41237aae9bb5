//! Setpoint tables.
//!
//! Every mechanism state resolves to an immutable record. Mechanisms with
//! planner-driven states (shooter, pivot, swerve heading) wrap it in
//! `Setpoint::Fixed(record)` or `Setpoint::Dynamic` when the value is
//! pulled from a planner at output time; the others return the record
//! itself. Nothing here is cached between ticks.

use serde::{Deserialize, Serialize};

use crate::robot::state::{
    ClimberState, DiverterState, IntakeState, PivotState, ShooterState, SwerveState,
};

/// Tagged setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Setpoint<T> {
    /// Value known at compile time.
    Fixed(T),
    /// Value provided by a planner each tick.
    Dynamic,
}

impl<T: Copy> Setpoint<T> {
    #[inline]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    /// The fixed value, `None` for dynamic setpoints.
    #[inline]
    pub fn fixed(&self) -> Option<T> {
        match self {
            Self::Fixed(v) => Some(*v),
            Self::Dynamic => None,
        }
    }

    /// Resolve with a planner lookup for the dynamic case.
    #[inline]
    pub fn resolve(&self, dynamic: impl FnOnce() -> Option<T>) -> Option<T> {
        match self {
            Self::Fixed(v) => Some(*v),
            Self::Dynamic => dynamic(),
        }
    }
}

// ─── Shooter ────────────────────────────────────────────────────────

/// Flywheel target within a shooter setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlywheelTarget {
    Brake,
    Coast,
    /// [rps]
    Velocity(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShooterSetpoint {
    pub flywheel: Setpoint<FlywheelTarget>,
    /// Trigger effort. For `Index` this is the magnitude used to centre the note.
    pub trigger_effort: f64,
}

impl ShooterState {
    /// Table entry for this state.
    ///
    /// `Shoot` is listed as dynamic: it inherits the flywheel target of the
    /// last aiming state, which the shooter machine resolves.
    pub const fn setpoint(self) -> ShooterSetpoint {
        use FlywheelTarget::*;
        use Setpoint::*;
        let (flywheel, trigger_effort) = match self {
            Self::RampDown => (Fixed(Brake), 0.0),
            Self::Coast => (Fixed(Coast), 0.0),
            Self::Intake => (Fixed(Velocity(-10.0)), 1.0),
            Self::Index => (Fixed(Brake), 0.2),
            Self::Handoff => (Fixed(Velocity(20.0)), 1.0),
            Self::AimLayup => (Fixed(Velocity(40.0)), 0.0),
            Self::AimProtected => (Fixed(Velocity(200.0)), 0.0),
            Self::AutoAim => (Dynamic, 0.0),
            Self::Shoot => (Dynamic, 1.0),
        };
        ShooterSetpoint {
            flywheel,
            trigger_effort,
        }
    }
}

// ─── Intake ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntakeSetpoint {
    /// [deg]
    pub deploy_deg: f64,
    pub roller_effort: f64,
}

impl IntakeState {
    pub const fn setpoint(self) -> IntakeSetpoint {
        let (deploy_deg, roller_effort) = match self {
            Self::Stow => (0.0, 0.0),
            Self::Intake => (120.0, 1.0),
            Self::Feed => (0.0, 0.4),
            Self::Eject => (120.0, -1.0),
        };
        IntakeSetpoint {
            deploy_deg,
            roller_effort,
        }
    }
}

// ─── Pivot ──────────────────────────────────────────────────────────

impl PivotState {
    /// Angle [deg].
    pub const fn setpoint(self) -> Setpoint<f64> {
        match self {
            Self::Rest => Setpoint::Fixed(0.0),
            Self::Intake => Setpoint::Fixed(10.0),
            Self::Handoff => Setpoint::Fixed(45.0),
            Self::AimLayup => Setpoint::Fixed(55.0),
            Self::AimProtected => Setpoint::Fixed(30.0),
            Self::AutoAim => Setpoint::Dynamic,
        }
    }
}

// ─── Diverter ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiverterSetpoint {
    /// [m]
    pub extension_m: f64,
    pub roller_effort: f64,
}

impl DiverterState {
    pub const fn setpoint(self) -> DiverterSetpoint {
        let (extension_m, roller_effort) = match self {
            Self::Retract => (0.0, 0.0),
            Self::Handoff => (0.05, 0.6),
            Self::Hold => (0.05, 0.0),
            Self::Amp => (0.30, 0.0),
            Self::PlaceAmp => (0.30, -1.0),
            Self::Trap => (0.45, 0.0),
            Self::PlaceTrap => (0.45, -1.0),
        };
        DiverterSetpoint {
            extension_m,
            roller_effort,
        }
    }
}

// ─── Climber ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClimberSetpoint {
    /// Drive to a height [m].
    Height(f64),
    /// Hold the height measured when the state was entered.
    HoldCurrent,
}

impl ClimberState {
    pub const fn setpoint(self) -> ClimberSetpoint {
        match self {
            Self::Stow => ClimberSetpoint::Height(0.0),
            Self::Hold => ClimberSetpoint::HoldCurrent,
            Self::Extend => ClimberSetpoint::Height(0.6),
            Self::Retract => ClimberSetpoint::Height(0.02),
            Self::Balance => ClimberSetpoint::Height(0.3),
        }
    }
}

// ─── Swerve ─────────────────────────────────────────────────────────

/// Drive-mode flags for one swerve state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwerveSetpoint {
    pub field_relative: bool,
    pub wheel_lock: bool,
    /// `None` means open/closed loop is left to the operator.
    pub open_loop: Option<bool>,
    /// Heading hold [deg]. `None` leaves rotation to the stick.
    pub heading: Option<Setpoint<f64>>,
}

impl SwerveState {
    pub const fn setpoint(self) -> SwerveSetpoint {
        let (field_relative, wheel_lock, open_loop, heading) = match self {
            Self::Aim => (true, false, Some(false), Some(Setpoint::Dynamic)),
            Self::AlignIntaking => (false, false, Some(false), None),
            Self::RobotCentric => (false, false, None, None),
            Self::LockIn => (true, true, None, None),
            Self::OpenLoopTeleop => (true, false, Some(true), None),
            Self::ClosedLoopTeleop => (true, false, Some(false), None),
        };
        SwerveSetpoint {
            field_relative,
            wheel_lock,
            open_loop,
            heading,
        }
    }
}
