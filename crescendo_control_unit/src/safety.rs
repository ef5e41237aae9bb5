//! Safety module root.
//!
//! Cross-mechanism interlocks evaluated by the coordinator every tick.

pub mod interlock;
