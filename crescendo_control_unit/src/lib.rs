//! # Crescendo Control Unit Library
//!
//! Decision-and-motion core of the robot. Every fixed-period tick it turns
//! an operator input snapshot and sensed robot state into per-mechanism
//! commands and one drivebase request.
//!
//! ## Layers
//!
//! 1. **Input resolver** ([`command::resolver`]): operator snapshot + pose
//!    → one `TeleopState` and one `SwerveState`, with mode memory.
//! 2. **Coordinator** ([`state::robot`]): `TeleopState` → `RobotState`,
//!    cross-mechanism interlocks ([`safety::interlock`]).
//! 3. **Mechanism machines** ([`state`]): one `StateMachine` per mechanism,
//!    sensor-forced edges, setpoint tables, readiness flags.
//! 4. **Teleop drive** ([`control::teleop`]): deadband, curve, slew
//!    limits, frame selection.
//! 5. **Cycle runner** ([`cycle`]): owns the hardware handles, runs the
//!    layers once per tick on an RT or simulated clock, keeps cycle stats.
//!
//! ## Tick order
//!
//! ```text
//! poll inputs → refresh planner → resolve → mechanisms → coordinator → swerve → drive
//! ```
//!
//! Nothing in the tick path fails or allocates; degraded sensors surface as
//! `ReadinessFlags` and `transitioning() == true`.

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod safety;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
