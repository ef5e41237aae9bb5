//! Intake state machine. One instance each for the front and back intake.
//!
//! ```text
//! Stow ◄──► Intake ──(beam break)──► Feed
//!   └─────► Eject
//! ```
//!
//! The roller stays off until the arm is within tolerance of the state's
//! deploy angle.

use crescendo_common::hal::driver::IntakeIo;
use crescendo_common::hal::types::{IntakeCommand, IntakeFeedback};
use crescendo_common::robot::config::IntakeConfig;
use crescendo_common::robot::error::ReadinessFlags;
use crescendo_common::robot::state::IntakeState;

use super::machine::{StateMachine, log_edge, log_readiness, within};

pub struct IntakeStatemachine {
    name: &'static str,
    io: Box<IntakeIo>,
    tolerance_deg: f64,
    requested: IntakeState,
    state: IntakeState,
    last_command: IntakeCommand,
    flags: ReadinessFlags,
}

impl IntakeStatemachine {
    /// `name` tags log lines (`front_intake`, `back_intake`).
    pub fn new(name: &'static str, io: Box<IntakeIo>, config: &IntakeConfig) -> Self {
        Self {
            name,
            io,
            tolerance_deg: config.deploy_tolerance_deg,
            requested: IntakeState::default(),
            state: IntakeState::default(),
            last_command: IntakeCommand::default(),
            flags: ReadinessFlags::empty(),
        }
    }

    #[inline]
    pub const fn last_command(&self) -> IntakeCommand {
        self.last_command
    }

    fn forced_state(&self, fb: &IntakeFeedback) -> IntakeState {
        match self.requested {
            IntakeState::Intake if fb.beam_break => IntakeState::Feed,
            s => s,
        }
    }
}

impl StateMachine for IntakeStatemachine {
    type State = IntakeState;

    fn request_state(&mut self, state: IntakeState) {
        self.requested = state;
    }

    fn update(&mut self) {
        let before = self.flags;
        let mut flags = self.flags & ReadinessFlags::INTERLOCKED;

        let Some(fb) = self.io.read() else {
            self.flags = flags | ReadinessFlags::STALE_FEEDBACK;
            log_readiness(self.name, before, self.flags);
            self.io.write(&self.last_command);
            return;
        };

        let next = self.forced_state(&fb);
        log_edge(self.name, self.state, next);
        self.state = next;

        let sp = next.setpoint();
        let deployed = within(fb.deploy_deg, sp.deploy_deg, self.tolerance_deg);
        if !deployed {
            flags |= ReadinessFlags::OUT_OF_TOLERANCE;
        }
        let command = IntakeCommand {
            deploy_deg: sp.deploy_deg,
            roller_effort: if deployed { sp.roller_effort } else { 0.0 },
        };

        self.flags = flags;
        log_readiness(self.name, before, flags);
        self.io.write(&command);
        self.last_command = command;
    }

    fn state(&self) -> IntakeState {
        self.state
    }

    fn requested(&self) -> IntakeState {
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
