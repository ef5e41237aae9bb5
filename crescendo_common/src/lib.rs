//! Crescendo Common Library
//!
//! Shared vocabulary for every crate in the Crescendo workspace: the
//! per-mechanism state enums and their setpoint tables, the operator input
//! snapshot, planar geometry, readiness flags, TOML configuration and the
//! hardware/planner contracts the control unit is written against.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading trait and shared config types
//! - [`consts`] - Tick period bounds and field constants
//! - [`geometry`] - Pose, translation and chassis speed types
//! - [`hal`] - Mechanism IO, drivebase, planner and input-source traits
//! - [`robot`] - State enums, setpoints, readiness flags, robot config
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use crescendo_common::prelude::*;
//!
//! let inputs = OperatorInputs::default();
//! assert!(!inputs.wants_intake);
//! ```

pub mod config;
pub mod consts;
pub mod geometry;
pub mod hal;
pub mod prelude;
pub mod robot;
