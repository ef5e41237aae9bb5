//! Cross-mechanism interlocks against the simulated robot.
//!
//! Each test checks the interlock condition after every tick: a guarded
//! request is only forwarded while the sensed state permits it, and no
//! guarded actuator command reaches the simulation while the guard
//! mechanism is on its way somewhere else.

use crescendo_common::geometry::Pose2d;
use crescendo_common::robot::config::RobotConfig;
use crescendo_common::robot::error::ReadinessFlags;
use crescendo_common::robot::input::OperatorInputs;
use crescendo_common::robot::state::{
    ClimberState, DiverterState, IntakeState, PivotState, ShooterState,
};
use crescendo_control_unit::safety::interlock::EngagedInterlocks;
use crescendo_control_unit::state::machine::StateMachine;

use super::{MIDFIELD, Rig, SPEAKER_SHOT, at, held};

fn pivot_clear_for_intake(rig: &Rig) -> bool {
    let pivot = &rig.runner.mechanisms().pivot;
    matches!(pivot.state(), PivotState::Rest | PivotState::Intake) && !pivot.transitioning()
}

/// Pivot commanded to `angle_deg` and already inside its tolerance band.
fn pivot_parked_at(rig: &Rig, angle_deg: f64) -> bool {
    let pivot = rig.sim.pivot.borrow();
    let tolerance = RobotConfig::default().pivot.tolerance_deg;
    pivot.last_command.map(|c| c.angle_deg) == Some(angle_deg)
        && (pivot.joint.position - angle_deg).abs() <= tolerance
}

#[test]
fn front_intake_deploys_only_with_pivot_clear() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            force_intake_front: true,
            ..OperatorInputs::default()
        }),
    );

    let mut saw_block = false;
    rig.run_checked(200, |rig| {
        let coordinator = rig.runner.coordinator();
        if coordinator.forwarded().front_intake == IntakeState::Intake {
            assert!(pivot_clear_for_intake(rig));
        }
        let deployed = rig.sim.front_intake.borrow().last_command.map(|c| c.deploy_deg);
        if deployed.is_some_and(|deg| deg > 0.0) {
            assert!(pivot_parked_at(rig, 10.0));
        }
        saw_block |= coordinator
            .engaged()
            .contains(EngagedInterlocks::FRONT_INTAKE_PIVOT);
    });

    assert!(saw_block);
    let m = rig.runner.mechanisms();
    assert_eq!(m.pivot.state(), PivotState::Intake);
    assert_eq!(m.front_intake.state(), IntakeState::Intake);
    assert!(!m.front_intake.transitioning());
    assert_eq!(rig.sim.front_intake.borrow().arm.position, 120.0);
    assert!(rig.runner.coordinator().engaged().is_empty());
}

#[test]
fn handoff_sequences_pivot_diverter_shooter() {
    let mut rig = Rig::new(
        Pose2d::new(4.0, 5.0, 0.0),
        held(OperatorInputs {
            wants_amp_mode: true,
            ..OperatorInputs::default()
        }),
    );

    rig.run_checked(300, |rig| {
        let m = rig.runner.mechanisms();
        let forwarded = rig.runner.coordinator().forwarded();
        if forwarded.shooter == ShooterState::Handoff {
            assert_eq!(m.diverter.state(), DiverterState::Handoff);
            assert!(!m.diverter.transitioning());
        }
        if forwarded.diverter.is_extended() {
            assert!(matches!(m.pivot.state(), PivotState::Rest | PivotState::Handoff));
            assert!(!m.pivot.transitioning());
        }
        let extension = rig.sim.diverter.borrow().last_command.map(|c| c.extension_m);
        if extension.is_some_and(|m| m > 0.0) {
            assert!(pivot_parked_at(rig, 45.0));
        }
    });

    let m = rig.runner.mechanisms();
    assert_eq!(m.pivot.state(), PivotState::Handoff);
    assert_eq!(m.diverter.state(), DiverterState::Handoff);
    assert_eq!(m.shooter.state(), ShooterState::Handoff);
    assert!(rig.runner.coordinator().engaged().is_empty());
    assert_eq!(rig.sim.pivot.borrow().joint.position, 45.0);
    assert_eq!(rig.sim.diverter.borrow().carriage.position, 0.05);
}

#[test]
fn climber_holds_until_pivot_rests() {
    let climb = OperatorInputs {
        wants_climb_mode: true,
        wants_align: true,
        wants_climb_extend: true,
        ..OperatorInputs::default()
    };
    let mut rig = Rig::new(
        SPEAKER_SHOT,
        vec![at(0, OperatorInputs::default()), at(100, climb)],
    );

    rig.run(100);
    assert_eq!(rig.runner.mechanisms().pivot.state(), PivotState::AutoAim);
    assert!(rig.sim.pivot.borrow().joint.position > 30.0);

    let mut saw_block = false;
    rig.run_checked(400, |rig| {
        let forwarded = rig.runner.coordinator().forwarded();
        if forwarded.climber.is_moving() {
            let pivot = &rig.runner.mechanisms().pivot;
            assert_eq!(pivot.state(), PivotState::Rest);
            assert!(!pivot.transitioning());
        }
        saw_block |= rig
            .runner
            .coordinator()
            .engaged()
            .contains(EngagedInterlocks::CLIMBER_PIVOT);
    });

    assert!(saw_block);
    let m = rig.runner.mechanisms();
    assert_eq!(m.climber.state(), ClimberState::Extend);
    assert_eq!(rig.sim.climber.borrow().carriage.position, 0.6);
}

#[test]
fn stale_pivot_keeps_front_intake_stowed() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            force_intake_front: true,
            ..OperatorInputs::default()
        }),
    );
    rig.sim.pivot.borrow_mut().stale = true;

    rig.run(20);
    {
        let m = rig.runner.mechanisms();
        assert!(m.pivot.readiness().contains(ReadinessFlags::STALE_FEEDBACK));
        assert_eq!(m.front_intake.state(), IntakeState::Stow);
        assert!(m.front_intake.readiness().contains(ReadinessFlags::INTERLOCKED));
        assert!(rig
            .runner
            .coordinator()
            .engaged()
            .contains(EngagedInterlocks::FRONT_INTAKE_PIVOT));
    }
    assert_eq!(rig.sim.front_intake.borrow().arm.position, 0.0);

    rig.sim.pivot.borrow_mut().stale = false;
    rig.run(200);
    let m = rig.runner.mechanisms();
    assert_eq!(m.front_intake.state(), IntakeState::Intake);
    assert!(!m.front_intake.readiness().contains(ReadinessFlags::INTERLOCKED));
    assert!(rig.runner.coordinator().engaged().is_empty());
}

#[test]
fn eject_without_intake_side_runs_back_intake() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            eject: true,
            ..OperatorInputs::default()
        }),
    );
    rig.run(100);

    let m = rig.runner.mechanisms();
    assert_eq!(m.back_intake.state(), IntakeState::Eject);
    assert_eq!(m.front_intake.state(), IntakeState::Stow);
    let command = rig.sim.back_intake.borrow().last_command.expect("written");
    assert_eq!(command.deploy_deg, 120.0);
    assert!(command.roller_effort < 0.0);
}
