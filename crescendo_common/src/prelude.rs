//! Prelude module for common re-exports.
//!
//! ```rust
//! use crescendo_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::robot::config::{ResponseCurve, RobotConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{FIELD_LENGTH_M, TICK_PERIOD_US};

// ─── Geometry ───────────────────────────────────────────────────────
pub use crate::geometry::{Alliance, ChassisSpeeds, Pose2d, Translation2d};

// ─── Robot vocabulary ───────────────────────────────────────────────
pub use crate::robot::error::ReadinessFlags;
pub use crate::robot::input::{DriveInputs, DriveSticks, OperatorInputs};
pub use crate::robot::setpoint::Setpoint;
pub use crate::robot::state::{
    ClimbMode, ClimberState, DiverterState, IntakeSide, IntakeState, MechanismId, PivotState,
    RobotState, ShooterState, SwerveState, TeleopMode, TeleopState,
};

// ─── Hardware contracts ─────────────────────────────────────────────
pub use crate::hal::driver::{AimPlanner, Drivebase, InputSource, MechanismIo};
pub use crate::hal::types::{AimSolution, DriveFrame, DriveRequest};
