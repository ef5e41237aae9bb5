//! Command processing root.
//!
//! Operator input resolution: one `TeleopState` and one `SwerveState` per
//! tick from the input snapshot and the robot pose.

pub mod resolver;
