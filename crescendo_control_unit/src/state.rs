//! State machine module root.
//!
//! [`machine`] defines the contract shared by every mechanism; one module
//! per mechanism implements it; [`robot`] composes them under the
//! coordinator.

pub mod climber;
pub mod diverter;
pub mod intake;
pub mod machine;
pub mod pivot;
pub mod robot;
pub mod shooter;
pub mod swerve;
