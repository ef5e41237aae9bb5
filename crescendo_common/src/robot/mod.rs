//! Robot-level shared types.
//!
//! State enums for every mechanism and for the teleop layer, their
//! setpoint tables, readiness flags, the operator input snapshot and the
//! robot configuration file.

pub mod config;
pub mod error;
pub mod input;
pub mod setpoint;
pub mod state;
