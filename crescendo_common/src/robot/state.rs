//! State enums for the mechanisms and the teleop layer.
//!
//! All enums use `#[repr(u8)]` for compact layout. Mechanism enums are the
//! state spaces of the per-mechanism machines; `TeleopMode`, `IntakeSide`,
//! `ClimbMode` and `TeleopState` belong to the input resolver;
//! `RobotState` is the composite target the coordinator derives each tick.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

use crate::consts::MECHANISM_COUNT;

// ─── Mechanism identity ─────────────────────────────────────────────

/// Identifies one mechanism owned by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MechanismId {
    Swerve = 0,
    Shooter = 1,
    FrontIntake = 2,
    BackIntake = 3,
    Pivot = 4,
    Diverter = 5,
    Climber = 6,
}

impl MechanismId {
    /// Every mechanism, in update order.
    pub const ALL: [Self; MECHANISM_COUNT] = [
        Self::Swerve,
        Self::Shooter,
        Self::FrontIntake,
        Self::BackIntake,
        Self::Pivot,
        Self::Diverter,
        Self::Climber,
    ];

    /// Stable lowercase name used in log fields.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Swerve => "swerve",
            Self::Shooter => "shooter",
            Self::FrontIntake => "front_intake",
            Self::BackIntake => "back_intake",
            Self::Pivot => "pivot",
            Self::Diverter => "diverter",
            Self::Climber => "climber",
        }
    }
}

// ─── LEVEL 1: Mechanism states ──────────────────────────────────────

/// Shooter state (flywheel + trigger).
///
/// ```text
/// RampDown ──(any switch)──► Index ◄──(flywheel switch)── Intake
///     AimLayup | AimProtected | AutoAim ──(aligned ∧ at speed, auto_fire)──► Shoot
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShooterState {
    /// Flywheel braked to zero, trigger off.
    RampDown = 0,
    /// Flywheel released.
    Coast = 1,
    /// Flywheel reversed to pull a note in through the shooter.
    Intake = 2,
    /// Centre a held note between the two switches.
    Index = 3,
    /// Pass the note to the diverter.
    Handoff = 4,
    /// Fixed close-range shot.
    AimLayup = 5,
    /// Fixed long shot from the protected zone.
    AimProtected = 6,
    /// Flywheel velocity from the aim planner.
    AutoAim = 7,
    /// Trigger fed at the last aiming state's flywheel speed.
    Shoot = 8,
}

impl ShooterState {
    /// Aiming states remembered as the source of the `Shoot` velocity.
    #[inline]
    pub const fn is_aiming(self) -> bool {
        matches!(self, Self::AimLayup | Self::AimProtected | Self::AutoAim)
    }
}

impl Default for ShooterState {
    fn default() -> Self {
        Self::RampDown
    }
}

/// Intake state. Shared by the front and back instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum IntakeState {
    /// Arm stowed, roller off.
    Stow = 0,
    /// Arm deployed, roller pulling in.
    Intake = 1,
    /// Arm stowed, roller feeding the note onward.
    Feed = 2,
    /// Arm deployed, roller reversed.
    Eject = 3,
}

impl IntakeState {
    /// States that move the arm or the roller.
    #[inline]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Stow)
    }
}

impl Default for IntakeState {
    fn default() -> Self {
        Self::Stow
    }
}

/// Shooter pivot state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PivotState {
    Rest = 0,
    Intake = 1,
    Handoff = 2,
    AimLayup = 3,
    AimProtected = 4,
    /// Angle from the aim planner.
    AutoAim = 5,
}

impl PivotState {
    #[inline]
    pub const fn is_aiming(self) -> bool {
        matches!(self, Self::AimLayup | Self::AimProtected | Self::AutoAim)
    }
}

impl Default for PivotState {
    fn default() -> Self {
        Self::Rest
    }
}

/// Amp/trap diverter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiverterState {
    /// Fully retracted, roller off.
    Retract = 0,
    /// Receiving a note from the shooter.
    Handoff = 1,
    /// Note seated, roller off.
    Hold = 2,
    /// Raised to the amp.
    Amp = 3,
    /// Raised to the amp, roller scoring.
    PlaceAmp = 4,
    /// Raised to the trap.
    Trap = 5,
    /// Raised to the trap, roller scoring.
    PlaceTrap = 6,
}

impl DiverterState {
    /// Any state that leaves the fully retracted position.
    #[inline]
    pub const fn is_extended(self) -> bool {
        !matches!(self, Self::Retract)
    }
}

impl Default for DiverterState {
    fn default() -> Self {
        Self::Retract
    }
}

/// Climber state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ClimberState {
    Stow = 0,
    /// Interim: hold whatever height was measured on entry.
    Hold = 1,
    Extend = 2,
    Retract = 3,
    Balance = 4,
}

impl ClimberState {
    /// States that drive the climber toward a new height.
    #[inline]
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::Extend | Self::Retract | Self::Balance)
    }
}

impl Default for ClimberState {
    fn default() -> Self {
        Self::Stow
    }
}

/// Drive-frame state of the swerve machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SwerveState {
    /// Heading locked to the aim planner.
    Aim = 0,
    /// Robot-centric while intaking through the back.
    AlignIntaking = 1,
    RobotCentric = 2,
    /// Wheels crossed when stationary.
    LockIn = 3,
    OpenLoopTeleop = 4,
    ClosedLoopTeleop = 5,
}

impl Default for SwerveState {
    fn default() -> Self {
        Self::OpenLoopTeleop
    }
}

// ─── LEVEL 2: Teleop layer ──────────────────────────────────────────

/// Scoring mode remembered across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TeleopMode {
    Speaker = 0,
    Amp = 1,
    Climb = 2,
}

impl Default for TeleopMode {
    fn default() -> Self {
        Self::Speaker
    }
}

/// Which intake is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum IntakeSide {
    None = 0,
    Front = 1,
    Back = 2,
}

impl Default for IntakeSide {
    fn default() -> Self {
        Self::None
    }
}

/// Climb sub-mode. Reset to `Align` whenever the mode leaves `Climb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ClimbMode {
    Align = 0,
    Extend = 1,
    Retract = 2,
    Balance = 3,
}

impl Default for ClimbMode {
    fn default() -> Self {
        Self::Align
    }
}

/// Single robot-level target chosen by the resolver each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TeleopState {
    Rest = 0,
    Stow = 1,
    IntakeFront = 2,
    IntakeBack = 3,
    AutoAim = 4,
    Shoot = 5,
    Handoff = 6,
    AlignAmp = 7,
    PlaceAmp = 8,
    PlaceTrap = 9,
    AlignClimb = 10,
    ClimbExtend = 11,
    ClimbRetract = 12,
    ClimbBalance = 13,
}

impl Default for TeleopState {
    fn default() -> Self {
        Self::Rest
    }
}

// ─── LEVEL 3: Composite ─────────────────────────────────────────────

/// One target state per non-drive mechanism.
///
/// The swerve machine takes its state from the resolver's drive-frame
/// selection instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RobotState {
    pub shooter: ShooterState,
    pub front_intake: IntakeState,
    pub back_intake: IntakeState,
    pub pivot: PivotState,
    pub diverter: DiverterState,
    pub climber: ClimberState,
}

// ─── Compile-time size checks ───────────────────────────────────────

const_assert!(core::mem::size_of::<ShooterState>() == 1);
const_assert!(core::mem::size_of::<TeleopState>() == 1);
const_assert!(core::mem::size_of::<SwerveState>() == 1);
const_assert!(core::mem::size_of::<RobotState>() == 6);
