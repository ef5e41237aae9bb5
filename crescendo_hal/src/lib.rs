//! # Crescendo HAL
//!
//! Simulation backends for the hardware contracts in
//! `crescendo_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`drivers`] - Driver implementations (currently simulation only)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  crescendo_control_unit                                      │
//! │   state machines ──► MechanismIo ◄── SimHandle<SimShooter>   │
//! │   teleop drive   ──► Drivebase   ◄── SimHandle<SimDrivebase> │
//! │   planners       ──► AimPlanner  ◄── GeometricAimPlanner     │
//! │   tick loop      ──► InputSource ◄── ScriptedInputs          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every simulated mechanism steps its physics when it is written to, so
//! one control tick advances the simulation by exactly one period.

#![deny(missing_docs)]

pub mod drivers;

pub use crate::drivers::simulation::{
    GeometricAimPlanner, ScriptedInputs, SimClimber, SimDiverter, SimDrivebase, SimHandle,
    SimIntake, SimPivot, SimRobot, SimShooter,
};
