//! Swerve drive-frame state machine.
//!
//! Owns no IO handle: it turns the resolver's `SwerveState`, the driver
//! sticks and the latest pose into one `DriveInputs` per tick, which the
//! teleop command shapes and sends to the drivebase.
//!
//! ```text
//! Aim            field-centric, heading locked on the planner, closed loop
//! AlignIntaking  robot-centric, closed loop
//! RobotCentric   robot-centric
//! LockIn         field-centric, wheel lock when the sticks are idle
//! *LoopTeleop    field-centric, D-pad heading hold
//! ```
//!
//! `disable_auto_heading` drops every heading hold and hands rotation back
//! to the stick; `Aim` then never reports alignment.

use std::rc::Rc;

use crescendo_common::geometry::{Pose2d, normalize_degrees};
use crescendo_common::hal::driver::AimPlanner;
use crescendo_common::robot::config::SwerveConfig;
use crescendo_common::robot::error::ReadinessFlags;
use crescendo_common::robot::input::{DriveInputs, DriveSticks, OperatorInputs};
use crescendo_common::robot::state::SwerveState;

use super::machine::{StateMachine, log_edge, log_readiness, within};

const NAME: &str = "swerve";

pub struct SwerveStatemachine {
    planner: Rc<dyn AimPlanner>,
    heading_tolerance_deg: f64,

    requested: SwerveState,
    state: SwerveState,

    sticks: DriveSticks,
    closed_loop: bool,
    zero_odometry: bool,
    heading_disabled: bool,
    pose: Pose2d,

    last_heading_deg: f64,
    drive: DriveInputs,
    flags: ReadinessFlags,
}

impl SwerveStatemachine {
    pub fn new(planner: Rc<dyn AimPlanner>, config: &SwerveConfig) -> Self {
        Self {
            planner,
            heading_tolerance_deg: config.heading_tolerance_deg,
            requested: SwerveState::default(),
            state: SwerveState::default(),
            sticks: DriveSticks::default(),
            closed_loop: false,
            zero_odometry: false,
            heading_disabled: false,
            pose: Pose2d::default(),
            last_heading_deg: 0.0,
            drive: DriveInputs::default(),
            flags: ReadinessFlags::empty(),
        }
    }

    /// Latch this tick's operator snapshot and measured pose.
    pub fn observe(&mut self, inputs: &OperatorInputs, pose: Pose2d) {
        self.sticks = inputs.drive;
        self.closed_loop = inputs.closed_loop;
        self.zero_odometry = inputs.zero_odometry;
        self.heading_disabled = inputs.disable_auto_heading;
        self.pose = pose;
    }

    /// Drive inputs produced by the last update.
    #[inline]
    pub const fn drive_inputs(&self) -> DriveInputs {
        self.drive
    }

    /// Heading locked on the aim target.
    #[inline]
    pub fn aligned(&self) -> bool {
        self.state == SwerveState::Aim && self.drive.auto_heading && !self.transitioning()
    }
}

impl StateMachine for SwerveStatemachine {
    type State = SwerveState;

    fn request_state(&mut self, state: SwerveState) {
        self.requested = state;
    }

    fn update(&mut self) {
        let before = self.flags;
        let mut flags = self.flags & ReadinessFlags::INTERLOCKED;

        let next = self.requested;
        log_edge(NAME, self.state, next);
        self.state = next;

        let sp = next.setpoint();
        let (heading_deg, auto_heading) = match sp.heading {
            _ if self.heading_disabled => (0.0, false),
            Some(heading) => {
                let target = heading.resolve(|| self.planner.solution().map(|s| s.heading_deg));
                match target {
                    Some(h) => {
                        self.last_heading_deg = normalize_degrees(h);
                        let error = normalize_degrees(self.last_heading_deg - self.pose.heading_deg);
                        if !within(error, 0.0, self.heading_tolerance_deg) {
                            flags |= ReadinessFlags::OUT_OF_TOLERANCE;
                        }
                    }
                    None => flags |= ReadinessFlags::PLANNER_UNAVAILABLE,
                }
                (self.last_heading_deg, true)
            }
            None => match self.sticks.pov {
                Some(pov) if sp.field_relative && !sp.wheel_lock => (pov, true),
                _ => (0.0, false),
            },
        };

        self.drive = DriveInputs {
            x: self.sticks.translation,
            y: self.sticks.strafe,
            rotation: self.sticks.rotation,
            heading_deg,
            auto_heading,
            field_relative: sp.field_relative,
            open_loop: sp.open_loop.unwrap_or(!self.closed_loop),
            wheel_lock: sp.wheel_lock,
            zero_odometry: self.zero_odometry,
        };

        self.flags = flags;
        log_readiness(NAME, before, flags);
    }

    fn state(&self) -> SwerveState {
        self.state
    }

    fn requested(&self) -> SwerveState {
        self.requested
    }

    fn readiness(&self) -> ReadinessFlags {
        self.flags
    }

    fn set_interlocked(&mut self, engaged: bool) {
        self.flags.set(ReadinessFlags::INTERLOCKED, engaged);
    }

    fn is_dynamic(&self) -> bool {
        self.state
            .setpoint()
            .heading
            .is_some_and(|h| h.is_dynamic())
    }
}
