//! Amp/trap diverter state machine.
//!
//! ```text
//! Retract ─► Handoff ──(note switch)──► Hold ─► Amp ─► PlaceAmp
//!                                          └──► Trap ─► PlaceTrap
//! ```

use crescendo_common::hal::driver::DiverterIo;
use crescendo_common::hal::types::{DiverterCommand, DiverterFeedback};
use crescendo_common::robot::config::DiverterConfig;
use crescendo_common::robot::error::ReadinessFlags;
use crescendo_common::robot::state::DiverterState;

use super::machine::{StateMachine, log_edge, log_readiness, within};

const NAME: &str = "diverter";

pub struct DiverterStatemachine {
    io: Box<DiverterIo>,
    tolerance_m: f64,
    requested: DiverterState,
    state: DiverterState,
    last_command: DiverterCommand,
    flags: ReadinessFlags,
}

impl DiverterStatemachine {
    pub fn new(io: Box<DiverterIo>, config: &DiverterConfig) -> Self {
        Self {
            io,
            tolerance_m: config.tolerance_m,
            requested: DiverterState::default(),
            state: DiverterState::default(),
            last_command: DiverterCommand::default(),
            flags: ReadinessFlags::empty(),
        }
    }

    #[inline]
    pub const fn last_command(&self) -> DiverterCommand {
        self.last_command
    }

    fn forced_state(&self, fb: &DiverterFeedback) -> DiverterState {
        match self.requested {
            DiverterState::Handoff if fb.note_switch => DiverterState::Hold,
            s => s,
        }
    }
}

impl StateMachine for DiverterStatemachine {
    type State = DiverterState;

    fn request_state(&mut self, state: DiverterState) {
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
        log_edge(NAME, self.state, next);
        self.state = next;

        let sp = next.setpoint();
        if !within(fb.extension_m, sp.extension_m, self.tolerance_m) {
            flags |= ReadinessFlags::OUT_OF_TOLERANCE;
        }
        let command = DiverterCommand {
            extension_m: sp.extension_m,
            roller_effort: sp.roller_effort,
        };

        self.flags = flags;
        log_readiness(NAME, before, flags);
        self.io.write(&command);
        self.last_command = command;
    }

    fn state(&self) -> DiverterState {
        self.state
    }

    fn requested(&self) -> DiverterState {
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
