//! Shared rig for the simulation-driven integration tests.

mod config_loading;
mod interlocks;
mod teleop;
mod tick_loop;

use crescendo_common::geometry::Pose2d;
use crescendo_common::robot::config::RobotConfig;
use crescendo_common::robot::input::OperatorInputs;
use crescendo_control_unit::cycle::{CycleRunner, Hardware};
use crescendo_hal::drivers::simulation::InputStep;
use crescendo_hal::{ScriptedInputs, SimRobot};

/// Simulated robot plus the runner driving it.
pub struct Rig {
    pub sim: SimRobot,
    pub runner: CycleRunner,
}

impl Rig {
    /// Robot placed at `pose`, replaying `steps` with default config.
    pub fn new(pose: Pose2d, steps: Vec<InputStep>) -> Self {
        Self::with_config(&RobotConfig::default(), pose, steps)
    }

    pub fn with_config(config: &RobotConfig, pose: Pose2d, steps: Vec<InputStep>) -> Self {
        let sim = SimRobot::new(config.tick_period_s());
        sim.drivebase.borrow_mut().pose = pose;
        let inputs = ScriptedInputs::from_steps(steps).expect("sorted steps");
        let runner = CycleRunner::new(config, Hardware::simulated(&sim, Box::new(inputs)));
        Self { sim, runner }
    }

    /// Tick `n` times, calling `check` after each tick.
    pub fn run_checked(&mut self, n: usize, mut check: impl FnMut(&Self)) {
        for _ in 0..n {
            self.runner.tick();
            check(self);
        }
    }

    pub fn run(&mut self, n: usize) {
        self.run_checked(n, |_| {});
    }
}

/// One snapshot held for the whole run.
pub fn held(inputs: OperatorInputs) -> Vec<InputStep> {
    vec![InputStep { tick: 0, inputs }]
}

pub fn at(tick: u64, inputs: OperatorInputs) -> InputStep {
    InputStep { tick, inputs }
}

/// Far downfield: no speaker automation, planner out of range.
pub const MIDFIELD: Pose2d = Pose2d::new(10.0, 4.0, 0.0);

/// Two metres in front of the blue speaker.
pub const SPEAKER_SHOT: Pose2d = Pose2d::new(2.0, 5.55, 0.0);
