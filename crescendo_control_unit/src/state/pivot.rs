//! Shooter pivot state machine. No forced edges; `AutoAim` is dynamic.
//!
//! A manual jog offset rides on top of every setpoint until reset. It is
//! bounded by the travel range, and the sum is still clamped.

use std::rc::Rc;

use crescendo_common::hal::driver::{AimPlanner, PivotIo};
use crescendo_common::hal::types::PivotCommand;
use crescendo_common::robot::config::PivotConfig;
use crescendo_common::robot::error::ReadinessFlags;
use crescendo_common::robot::state::PivotState;

use super::machine::{StateMachine, log_edge, log_readiness, within};

const NAME: &str = "pivot";

pub struct PivotStatemachine {
    io: Box<PivotIo>,
    planner: Rc<dyn AimPlanner>,
    tolerance_deg: f64,
    min_deg: f64,
    max_deg: f64,
    jog_offset_deg: f64,
    requested: PivotState,
    state: PivotState,
    last_command: PivotCommand,
    flags: ReadinessFlags,
}

impl PivotStatemachine {
    pub fn new(io: Box<PivotIo>, planner: Rc<dyn AimPlanner>, config: &PivotConfig) -> Self {
        Self {
            io,
            planner,
            tolerance_deg: config.tolerance_deg,
            min_deg: config.min_deg,
            max_deg: config.max_deg,
            jog_offset_deg: 0.0,
            requested: PivotState::default(),
            state: PivotState::default(),
            last_command: PivotCommand::default(),
            flags: ReadinessFlags::empty(),
        }
    }

    #[inline]
    pub const fn last_command(&self) -> PivotCommand {
        self.last_command
    }

    /// Add `delta_deg` to the jog offset.
    pub fn jog(&mut self, delta_deg: f64) {
        let span = self.max_deg - self.min_deg;
        self.jog_offset_deg = (self.jog_offset_deg + delta_deg).clamp(-span, span);
    }

    pub fn reset_jog(&mut self) {
        self.jog_offset_deg = 0.0;
    }

    #[inline]
    pub const fn jog_offset_deg(&self) -> f64 {
        self.jog_offset_deg
    }

    #[inline]
    pub fn manual_override_active(&self) -> bool {
        self.jog_offset_deg != 0.0
    }
}

impl StateMachine for PivotStatemachine {
    type State = PivotState;

    fn request_state(&mut self, state: PivotState) {
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

        let next = self.requested;
        log_edge(NAME, self.state, next);
        self.state = next;

        let target = next
            .setpoint()
            .resolve(|| self.planner.solution().map(|s| s.pivot_deg));

        let command = match target {
            Some(deg) => {
                let angle_deg = (deg + self.jog_offset_deg).clamp(self.min_deg, self.max_deg);
                if !within(fb.angle_deg, angle_deg, self.tolerance_deg) {
                    flags |= ReadinessFlags::OUT_OF_TOLERANCE;
                }
                PivotCommand { angle_deg }
            }
            None => {
                flags |= ReadinessFlags::PLANNER_UNAVAILABLE;
                self.last_command
            }
        };

        self.flags = flags;
        log_readiness(NAME, before, flags);
        self.io.write(&command);
        self.last_command = command;
    }

    fn state(&self) -> PivotState {
        self.state
    }

    fn requested(&self) -> PivotState {
        self.requested
    }

    fn readiness(&self) -> ReadinessFlags {
        self.flags
    }

    fn set_interlocked(&mut self, engaged: bool) {
        self.flags.set(ReadinessFlags::INTERLOCKED, engaged);
    }

    fn is_dynamic(&self) -> bool {
        self.state.setpoint().is_dynamic()
    }
}
