//! Climber state machine.
//!
//! ```text
//! Stow ─► Extend ─► Retract ──(bottom limit)──► Hold
//!            └────► Balance
//! ```
//!
//! `Hold` is also the coordinator's interim state: it captures the height
//! measured on entry and holds it. A manual jog offset shifts every fixed
//! height target, never the captured one.

use crescendo_common::hal::driver::ClimberIo;
use crescendo_common::hal::types::{ClimberCommand, ClimberFeedback};
use crescendo_common::robot::config::ClimberConfig;
use crescendo_common::robot::error::ReadinessFlags;
use crescendo_common::robot::setpoint::ClimberSetpoint;
use crescendo_common::robot::state::ClimberState;

use super::machine::{StateMachine, log_edge, log_readiness, within};

const NAME: &str = "climber";

/// Bound on the manual jog offset [m].
const MAX_JOG_M: f64 = 0.2;

pub struct ClimberStatemachine {
    io: Box<ClimberIo>,
    tolerance_m: f64,
    requested: ClimberState,
    state: ClimberState,
    hold_height_m: f64,
    jog_offset_m: f64,
    last_command: ClimberCommand,
    flags: ReadinessFlags,
}

impl ClimberStatemachine {
    pub fn new(io: Box<ClimberIo>, config: &ClimberConfig) -> Self {
        Self {
            io,
            tolerance_m: config.tolerance_m,
            requested: ClimberState::default(),
            state: ClimberState::default(),
            hold_height_m: 0.0,
            jog_offset_m: 0.0,
            last_command: ClimberCommand::default(),
            flags: ReadinessFlags::empty(),
        }
    }

    #[inline]
    pub const fn last_command(&self) -> ClimberCommand {
        self.last_command
    }

    /// Add `delta_m` to the jog offset.
    pub fn jog(&mut self, delta_m: f64) {
        self.jog_offset_m = (self.jog_offset_m + delta_m).clamp(-MAX_JOG_M, MAX_JOG_M);
    }

    pub fn reset_jog(&mut self) {
        self.jog_offset_m = 0.0;
    }

    #[inline]
    pub const fn jog_offset_m(&self) -> f64 {
        self.jog_offset_m
    }

    #[inline]
    pub fn manual_override_active(&self) -> bool {
        self.jog_offset_m != 0.0
    }

    fn forced_state(&self, fb: &ClimberFeedback) -> ClimberState {
        match self.requested {
            ClimberState::Retract if fb.bottom_limit => ClimberState::Hold,
            s => s,
        }
    }
}

impl StateMachine for ClimberStatemachine {
    type State = ClimberState;

    fn request_state(&mut self, state: ClimberState) {
        self.requested = state;
    }

    fn update(&mut self) {
        let before = self.flags;
        let mut flags = self.flags & ReadinessFlags::INTERLOCKED;

        let Some(fb) = self.io.read() else {
            self.flags = flags | ReadinessFlags::STALE_FEEDBACK;
            log_readiness(NAME, before, self.flags);
            self.io.write(&self.last_command);
            return;
        };

        let next = self.forced_state(&fb);
        if next == ClimberState::Hold && self.state != ClimberState::Hold {
            self.hold_height_m = fb.height_m;
        }
        log_edge(NAME, self.state, next);
        self.state = next;

        let height_m = match next.setpoint() {
            ClimberSetpoint::Height(h) => (h + self.jog_offset_m).max(0.0),
            ClimberSetpoint::HoldCurrent => self.hold_height_m,
        };
        if !within(fb.height_m, height_m, self.tolerance_m) {
            flags |= ReadinessFlags::OUT_OF_TOLERANCE;
        }
        let command = ClimberCommand { height_m };

        self.flags = flags;
        log_readiness(NAME, before, flags);
        self.io.write(&command);
        self.last_command = command;
    }

    fn state(&self) -> ClimberState {
        self.state
    }

    fn requested(&self) -> ClimberState {
        self.requested
    }

    fn readiness(&self) -> ReadinessFlags {
        self.flags
    }

    fn set_interlocked(&mut self, engaged: bool) {
        self.flags.set(ReadinessFlags::INTERLOCKED, engaged);
    }

    fn is_dynamic(&self) -> bool {
        false
    }
}
