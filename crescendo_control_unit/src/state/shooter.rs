//! Shooter state machine (flywheel + trigger).
//!
//! ```text
//! RampDown ──(either switch)──► Index        Intake ──(flywheel switch)──► Index
//! AimLayup | AimProtected | AutoAim ──(auto_fire ∧ aligned ∧ at speed)──► Shoot
//! Shoot ──(auto_fire ∧ ¬aligned)──► last aiming state
//! ```
//!
//! Forced edges are re-evaluated every tick against the requested state,
//! so the request resumes as soon as the condition clears.

use std::rc::Rc;

use tracing::{debug, info};

use crescendo_common::hal::driver::{AimPlanner, ShooterIo};
use crescendo_common::hal::types::{FlywheelCommand, ShooterCommand, ShooterFeedback};
use crescendo_common::robot::config::ShooterConfig;
use crescendo_common::robot::error::ReadinessFlags;
use crescendo_common::robot::setpoint::{FlywheelTarget, Setpoint};
use crescendo_common::robot::state::ShooterState;

use super::machine::{StateMachine, log_edge, log_readiness, within};

const NAME: &str = "shooter";

/// Trigger effort applied while the manual trigger override is held.
const MANUAL_TRIGGER_EFFORT: f64 = 1.0;

pub struct ShooterStatemachine {
    io: Box<ShooterIo>,
    planner: Rc<dyn AimPlanner>,
    tolerance_rps: f64,
    auto_fire: bool,

    requested: ShooterState,
    state: ShooterState,
    last_aiming_state: ShooterState,
    has_note: bool,
    manual_trigger: bool,
    trigger_jog: f64,
    aligned: bool,

    last_command: ShooterCommand,
    flags: ReadinessFlags,
}

impl ShooterStatemachine {
    pub fn new(io: Box<ShooterIo>, planner: Rc<dyn AimPlanner>, config: &ShooterConfig) -> Self {
        Self {
            io,
            planner,
            tolerance_rps: config.flywheel_tolerance_rps,
            auto_fire: config.auto_fire,
            requested: ShooterState::default(),
            state: ShooterState::default(),
            last_aiming_state: ShooterState::AutoAim,
            has_note: false,
            manual_trigger: false,
            trigger_jog: 0.0,
            aligned: false,
            last_command: ShooterCommand::default(),
            flags: ReadinessFlags::OUT_OF_TOLERANCE,
        }
    }

    /// A note is held (latched on either switch, cleared by a detected shot).
    #[inline]
    pub const fn has_note(&self) -> bool {
        self.has_note
    }

    /// Aiming state whose flywheel target `Shoot` inherits.
    #[inline]
    pub const fn last_aiming_state(&self) -> ShooterState {
        self.last_aiming_state
    }

    /// Command written on the last update.
    #[inline]
    pub const fn last_command(&self) -> ShooterCommand {
        self.last_command
    }

    /// Robot heading is locked on the target (from the swerve machine).
    pub fn set_aligned(&mut self, aligned: bool) {
        self.aligned = aligned;
    }

    /// Run the trigger forward regardless of state while held.
    pub fn set_manual_trigger(&mut self, engaged: bool) {
        if engaged != self.manual_trigger {
            info!(engaged, "shooter manual trigger override");
        }
        self.manual_trigger = engaged;
    }

    /// Drive the trigger at `effort` while non-zero. `set_manual_trigger`
    /// wins when both are held.
    pub fn set_trigger_jog(&mut self, effort: f64) {
        let effort = effort.clamp(-1.0, 1.0);
        if (effort != 0.0) != (self.trigger_jog != 0.0) {
            info!(effort, "shooter trigger jog");
        }
        self.trigger_jog = effort;
    }

    #[inline]
    pub fn manual_override_active(&self) -> bool {
        self.manual_trigger || self.trigger_jog != 0.0
    }

    /// Resolve a flywheel target, following `Shoot` to the last aiming state
    /// and `AutoAim` to the planner.
    fn flywheel_target(&self, state: ShooterState) -> Option<FlywheelTarget> {
        match state.setpoint().flywheel {
            Setpoint::Fixed(t) => Some(t),
            Setpoint::Dynamic if state == ShooterState::Shoot => {
                self.flywheel_target(self.last_aiming_state)
            }
            Setpoint::Dynamic => self
                .planner
                .solution()
                .map(|s| FlywheelTarget::Velocity(s.flywheel_rps)),
        }
    }

    fn at_target(&self, target: FlywheelTarget, rps: f64) -> bool {
        match target {
            FlywheelTarget::Velocity(v) => within(rps, v, self.tolerance_rps),
            FlywheelTarget::Brake => within(rps, 0.0, self.tolerance_rps),
            FlywheelTarget::Coast => true,
        }
    }

    /// Sensor-forced edges applied to the requested state.
    fn forced_state(&mut self, fb: &ShooterFeedback) -> ShooterState {
        use ShooterState::*;

        let requested = self.requested;
        if requested.is_aiming() {
            self.last_aiming_state = requested;
        }

        match requested {
            RampDown if fb.flywheel_switch || fb.trigger_switch => Index,
            Intake if fb.flywheel_switch => Index,
            s if self.auto_fire && s.is_aiming() && self.aligned => {
                let at_speed = self
                    .flywheel_target(s)
                    .is_some_and(|t| self.at_target(t, fb.flywheel_rps));
                if at_speed || self.state == Shoot { Shoot } else { s }
            }
            Shoot if self.auto_fire && !self.aligned => self.last_aiming_state,
            s => s,
        }
    }

    fn command_for(&self, state: ShooterState, fb: &ShooterFeedback) -> Option<ShooterCommand> {
        let sp = state.setpoint();

        if state == ShooterState::Index {
            let magnitude = sp.trigger_effort;
            let trigger_effort = match (fb.flywheel_switch, fb.trigger_switch) {
                (true, false) => -magnitude,
                (false, true) => magnitude,
                _ => 0.0,
            };
            return Some(ShooterCommand {
                flywheel: FlywheelCommand::Brake,
                trigger_effort,
            });
        }

        let flywheel = match self.flywheel_target(state)? {
            FlywheelTarget::Brake => FlywheelCommand::Brake,
            FlywheelTarget::Coast => FlywheelCommand::Coast,
            FlywheelTarget::Velocity(v) => FlywheelCommand::Velocity(v),
        };
        Some(ShooterCommand {
            flywheel,
            trigger_effort: sp.trigger_effort,
        })
    }
}

impl StateMachine for ShooterStatemachine {
    type State = ShooterState;

    fn request_state(&mut self, state: ShooterState) {
        self.requested = state;
    }

    fn update(&mut self) {
        let before = self.flags;
        let interlocked = self.flags & ReadinessFlags::INTERLOCKED;

        let Some(fb) = self.io.read() else {
            self.flags = interlocked | ReadinessFlags::STALE_FEEDBACK;
            log_readiness(NAME, before, self.flags);
            self.io.write(&self.last_command);
            return;
        };

        if fb.flywheel_switch || fb.trigger_switch {
            if !self.has_note {
                debug!("shooter: note acquired");
            }
            self.has_note = true;
        }
        if fb.shot_detected {
            debug!("shooter: shot detected");
            self.has_note = false;
        }

        let next = self.forced_state(&fb);
        log_edge(NAME, self.state, next);
        self.state = next;

        let mut flags = interlocked;
        let mut command = match self.command_for(next, &fb) {
            Some(c) => c,
            None => {
                flags |= ReadinessFlags::PLANNER_UNAVAILABLE;
                self.last_command
            }
        };

        if !flags.contains(ReadinessFlags::PLANNER_UNAVAILABLE) {
            let settled = self
                .flywheel_target(next)
                .is_some_and(|t| self.at_target(t, fb.flywheel_rps));
            if !settled {
                flags |= ReadinessFlags::OUT_OF_TOLERANCE;
            }
        }

        if self.manual_trigger {
            command.trigger_effort = MANUAL_TRIGGER_EFFORT;
        } else if self.trigger_jog != 0.0 {
            command.trigger_effort = self.trigger_jog;
        }

        self.flags = flags;
        log_readiness(NAME, before, flags);
        self.io.write(&command);
        self.last_command = command;
    }

    fn state(&self) -> ShooterState {
        self.state
    }

    fn requested(&self) -> ShooterState {
        self.requested
    }

    fn readiness(&self) -> ReadinessFlags {
        self.flags
    }

    fn set_interlocked(&mut self, engaged: bool) {
        self.flags.set(ReadinessFlags::INTERLOCKED, engaged);
    }

    fn is_dynamic(&self) -> bool {
        match self.state {
            ShooterState::AutoAim => true,
            ShooterState::Shoot => self.last_aiming_state == ShooterState::AutoAim,
            _ => false,
        }
    }
}
