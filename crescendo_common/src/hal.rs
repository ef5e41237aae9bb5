//! Hardware and planner contracts.
//!
//! The control unit never talks to motor controllers directly. It reads
//! feedback and writes commands through these traits; `crescendo_hal`
//! provides simulated implementations.

pub mod driver;
pub mod types;
