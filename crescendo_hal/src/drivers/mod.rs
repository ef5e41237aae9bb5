//! Driver implementations.
//!
//! - [`simulation`] - Software simulation for development and testing
//!
//! A hardware backend implements the same traits from
//! `crescendo_common::hal::driver` and is handed to the control unit in
//! place of the simulated handles.

pub mod simulation;
