//! Simulated mechanisms.
//!
//! Each model steps its physics once per `write()`, using the period it
//! was built with. Sensor fields are public so tests can trip switches;
//! setting `stale` makes `read()` return `None`.

use tracing::debug;

use crescendo_common::hal::driver::MechanismIo;
use crescendo_common::hal::types::*;

use super::physics::{Axis1d, approach};

// ─── Shooter ────────────────────────────────────────────────────────

/// Flywheel acceleration [rps/s].
const FLYWHEEL_ACCEL: f64 = 400.0;
/// Coasting decays this much slower than braking.
const COAST_DIVISOR: f64 = 4.0;
/// Trigger effort that pushes a held note into a spinning flywheel.
const FIRE_EFFORT: f64 = 0.5;
/// Minimum flywheel speed for a note to leave [rps].
const FIRE_MIN_RPS: f64 = 5.0;

/// Flywheel, trigger and the two note switches.
#[derive(Debug, Clone)]
pub struct SimShooter {
    /// Measured flywheel velocity [rps].
    pub flywheel_rps: f64,
    /// Note switch at the flywheel side.
    pub flywheel_switch: bool,
    /// Note switch at the trigger side.
    pub trigger_switch: bool,
    /// Suppress feedback.
    pub stale: bool,
    /// Last command received.
    pub last_command: Option<ShooterCommand>,
    shot_pending: bool,
    dt_s: f64,
}

impl SimShooter {
    /// Idle shooter with no note.
    pub fn new(dt_s: f64) -> Self {
        Self {
            flywheel_rps: 0.0,
            flywheel_switch: false,
            trigger_switch: false,
            stale: false,
            last_command: None,
            shot_pending: false,
            dt_s,
        }
    }

    /// Place a note fully seated against both switches.
    pub fn load_note(&mut self) {
        self.flywheel_switch = true;
        self.trigger_switch = true;
    }

    fn has_note(&self) -> bool {
        self.flywheel_switch || self.trigger_switch
    }
}

impl MechanismIo for SimShooter {
    type Feedback = ShooterFeedback;
    type Command = ShooterCommand;

    fn read(&mut self) -> Option<ShooterFeedback> {
        if self.stale {
            return None;
        }
        Some(ShooterFeedback {
            flywheel_switch: self.flywheel_switch,
            trigger_switch: self.trigger_switch,
            flywheel_rps: self.flywheel_rps,
            shot_detected: std::mem::take(&mut self.shot_pending),
        })
    }

    fn write(&mut self, command: &ShooterCommand) {
        let step = FLYWHEEL_ACCEL * self.dt_s;
        self.flywheel_rps = match command.flywheel {
            FlywheelCommand::Velocity(v) => approach(self.flywheel_rps, v, step),
            FlywheelCommand::Brake => approach(self.flywheel_rps, 0.0, step),
            FlywheelCommand::Coast => approach(self.flywheel_rps, 0.0, step / COAST_DIVISOR),
        };

        let effort = command.trigger_effort;
        if effort >= FIRE_EFFORT && self.has_note() && self.flywheel_rps.abs() > FIRE_MIN_RPS {
            debug!(rps = self.flywheel_rps, "sim shooter: note fired");
            self.flywheel_switch = false;
            self.trigger_switch = false;
            self.shot_pending = true;
        } else if effort < 0.0 && self.flywheel_switch && !self.trigger_switch {
            // Pulled back onto the trigger switch.
            self.trigger_switch = true;
        } else if effort > 0.0 && self.trigger_switch && !self.flywheel_switch {
            self.flywheel_switch = true;
        }

        self.last_command = Some(*command);
    }
}

// ─── Intake ─────────────────────────────────────────────────────────

/// Deploy angle above which the roller can grab a note [deg].
const INTAKE_GRAB_DEG: f64 = 60.0;

/// Deploying intake arm, roller and beam break.
#[derive(Debug, Clone)]
pub struct SimIntake {
    /// Deploy arm.
    pub arm: Axis1d,
    /// Beam break across the roller path.
    pub beam_break: bool,
    /// A note is lying in front of the intake.
    pub note_available: bool,
    /// Suppress feedback.
    pub stale: bool,
    /// Last command received.
    pub last_command: Option<IntakeCommand>,
    dt_s: f64,
}

impl SimIntake {
    /// Stowed intake with no note in reach.
    pub fn new(dt_s: f64) -> Self {
        Self {
            arm: Axis1d::new(0.0, 360.0, 2400.0),
            beam_break: false,
            note_available: false,
            stale: false,
            last_command: None,
            dt_s,
        }
    }
}

impl MechanismIo for SimIntake {
    type Feedback = IntakeFeedback;
    type Command = IntakeCommand;

    fn read(&mut self) -> Option<IntakeFeedback> {
        if self.stale {
            return None;
        }
        Some(IntakeFeedback {
            deploy_deg: self.arm.position,
            beam_break: self.beam_break,
        })
    }

    fn write(&mut self, command: &IntakeCommand) {
        self.arm.step(command.deploy_deg, self.dt_s);

        if command.roller_effort > 0.0
            && self.note_available
            && self.arm.position >= INTAKE_GRAB_DEG
        {
            debug!("sim intake: note acquired");
            self.note_available = false;
            self.beam_break = true;
        } else if command.roller_effort < 0.0 && self.beam_break {
            debug!("sim intake: note ejected");
            self.beam_break = false;
        }

        self.last_command = Some(*command);
    }
}

// ─── Pivot ──────────────────────────────────────────────────────────

/// Shooter pivot.
#[derive(Debug, Clone)]
pub struct SimPivot {
    /// Pivot joint.
    pub joint: Axis1d,
    /// Suppress feedback.
    pub stale: bool,
    /// Last command received.
    pub last_command: Option<PivotCommand>,
    dt_s: f64,
}

impl SimPivot {
    /// Pivot at rest (0°).
    pub fn new(dt_s: f64) -> Self {
        Self {
            joint: Axis1d::new(0.0, 180.0, 1200.0),
            stale: false,
            last_command: None,
            dt_s,
        }
    }
}

impl MechanismIo for SimPivot {
    type Feedback = PivotFeedback;
    type Command = PivotCommand;

    fn read(&mut self) -> Option<PivotFeedback> {
        (!self.stale).then(|| PivotFeedback {
            angle_deg: self.joint.position,
        })
    }

    fn write(&mut self, command: &PivotCommand) {
        self.joint.step(command.angle_deg, self.dt_s);
        self.last_command = Some(*command);
    }
}

// ─── Diverter ───────────────────────────────────────────────────────

/// Telescoping amp/trap diverter with a note switch.
#[derive(Debug, Clone)]
pub struct SimDiverter {
    /// Elevator carriage.
    pub carriage: Axis1d,
    /// Note seated in the diverter rollers.
    pub note_switch: bool,
    /// Suppress feedback.
    pub stale: bool,
    /// Last command received.
    pub last_command: Option<DiverterCommand>,
    dt_s: f64,
}

impl SimDiverter {
    /// Retracted, empty diverter.
    pub fn new(dt_s: f64) -> Self {
        Self {
            carriage: Axis1d::new(0.0, 1.5, 8.0),
            note_switch: false,
            stale: false,
            last_command: None,
            dt_s,
        }
    }
}

impl MechanismIo for SimDiverter {
    type Feedback = DiverterFeedback;
    type Command = DiverterCommand;

    fn read(&mut self) -> Option<DiverterFeedback> {
        if self.stale {
            return None;
        }
        Some(DiverterFeedback {
            extension_m: self.carriage.position,
            note_switch: self.note_switch,
        })
    }

    fn write(&mut self, command: &DiverterCommand) {
        self.carriage.step(command.extension_m, self.dt_s);
        if command.roller_effort < 0.0 && self.note_switch {
            debug!("sim diverter: note placed");
            self.note_switch = false;
        }
        self.last_command = Some(*command);
    }
}

// ─── Climber ────────────────────────────────────────────────────────

/// Height at or below which the bottom limit switch reads tripped [m].
const CLIMBER_BOTTOM_M: f64 = 0.025;

/// Climber with a bottom limit switch.
#[derive(Debug, Clone)]
pub struct SimClimber {
    /// Climber carriage.
    pub carriage: Axis1d,
    /// Suppress feedback.
    pub stale: bool,
    /// Last command received.
    pub last_command: Option<ClimberCommand>,
    dt_s: f64,
}

impl SimClimber {
    /// Stowed climber.
    pub fn new(dt_s: f64) -> Self {
        Self {
            carriage: Axis1d::new(0.0, 1.0, 6.0),
            stale: false,
            last_command: None,
            dt_s,
        }
    }
}

impl MechanismIo for SimClimber {
    type Feedback = ClimberFeedback;
    type Command = ClimberCommand;

    fn read(&mut self) -> Option<ClimberFeedback> {
        if self.stale {
            return None;
        }
        Some(ClimberFeedback {
            height_m: self.carriage.position,
            bottom_limit: self.carriage.position <= CLIMBER_BOTTOM_M,
        })
    }

    fn write(&mut self, command: &ClimberCommand) {
        self.carriage.step(command.height_m, self.dt_s);
        self.last_command = Some(*command);
    }
}
