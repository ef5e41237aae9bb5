//! Simulation driver module.
//!
//! Software models of every mechanism, the drivebase, the aim planner
//! and the operator, for running the control unit without hardware.

mod drivebase;
mod handle;
mod mechanisms;
mod physics;
mod planner;
mod script;

pub use drivebase::SimDrivebase;
pub use handle::SimHandle;
pub use mechanisms::{SimClimber, SimDiverter, SimIntake, SimPivot, SimShooter};
pub use physics::{Axis1d, approach};
pub use planner::GeometricAimPlanner;
pub use script::{InputStep, ScriptedInputs};

use std::rc::Rc;

/// One simulated robot: shared handles to every simulated component.
///
/// Cloning a handle keeps access to the model after the clone has been
/// moved into the control unit, so tests can trip sensors and inspect
/// actuator state.
#[derive(Clone)]
pub struct SimRobot {
    /// Shooter model.
    pub shooter: SimHandle<SimShooter>,
    /// Front intake model.
    pub front_intake: SimHandle<SimIntake>,
    /// Back intake model.
    pub back_intake: SimHandle<SimIntake>,
    /// Pivot model.
    pub pivot: SimHandle<SimPivot>,
    /// Diverter model.
    pub diverter: SimHandle<SimDiverter>,
    /// Climber model.
    pub climber: SimHandle<SimClimber>,
    /// Drivebase model.
    pub drivebase: SimHandle<SimDrivebase>,
    /// Aim planner shared by the shooter, pivot and swerve machines.
    pub planner: Rc<GeometricAimPlanner>,
}

impl SimRobot {
    /// Build a robot at rest at the field origin, stepping `dt_s` per write.
    pub fn new(dt_s: f64) -> Self {
        Self {
            shooter: SimHandle::new(SimShooter::new(dt_s)),
            front_intake: SimHandle::new(SimIntake::new(dt_s)),
            back_intake: SimHandle::new(SimIntake::new(dt_s)),
            pivot: SimHandle::new(SimPivot::new(dt_s)),
            diverter: SimHandle::new(SimDiverter::new(dt_s)),
            climber: SimHandle::new(SimClimber::new(dt_s)),
            drivebase: SimHandle::new(SimDrivebase::new(dt_s)),
            planner: Rc::new(GeometricAimPlanner::default()),
        }
    }
}
