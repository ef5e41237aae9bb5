//! Teleop drive shaping root.
//!
//! Stick conditioning filters and the drive teleoperation command that
//! turns `DriveInputs` into one `DriveRequest` per tick.

pub mod filters;
pub mod teleop;
