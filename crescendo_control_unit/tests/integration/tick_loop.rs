//! Scripted scenarios through the cycle runner.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crescendo_common::robot::config::RobotConfig;
use crescendo_common::robot::input::OperatorInputs;
use crescendo_common::robot::state::{
    IntakeSide, IntakeState, PivotState, ShooterState, TeleopMode, TeleopState,
};
use crescendo_control_unit::cycle::{CycleRunner, Hardware};
use crescendo_control_unit::state::machine::StateMachine;
use crescendo_hal::{ScriptedInputs, SimRobot};

use super::{MIDFIELD, Rig, SPEAKER_SHOT, at, held};

const INTAKE_THEN_AMP: &str = r#"
[[step]]
tick = 0
inputs = { wants_intake = true }

[[step]]
tick = 100
inputs = { wants_stow = true }

[[step]]
tick = 160
inputs = { wants_amp_mode = true }

[[step]]
tick = 161
"#;

fn scripted(script: &str) -> (SimRobot, CycleRunner) {
    let config = RobotConfig::default();
    let sim = SimRobot::new(config.tick_period_s());
    sim.drivebase.borrow_mut().pose = MIDFIELD;
    let inputs = ScriptedInputs::parse(script).unwrap();
    let runner = CycleRunner::new(&config, Hardware::simulated(&sim, Box::new(inputs)));
    (sim, runner)
}

#[test]
fn intake_feed_stow_then_amp_mode() {
    let (sim, mut runner) = scripted(INTAKE_THEN_AMP);
    sim.back_intake.borrow_mut().note_available = true;

    for _ in 0..100 {
        runner.tick();
    }
    let m = runner.mechanisms();
    assert_eq!(runner.resolution().teleop, TeleopState::IntakeBack);
    // Beam break forces the hand-off to the shooter.
    assert_eq!(m.back_intake.state(), IntakeState::Feed);
    assert_eq!(m.shooter.state(), ShooterState::Intake);
    assert_eq!(m.pivot.state(), PivotState::Intake);
    assert!(sim.back_intake.borrow().beam_break);

    for _ in 0..60 {
        runner.tick();
    }
    let m = runner.mechanisms();
    assert_eq!(runner.resolution().teleop, TeleopState::Stow);
    assert_eq!(runner.resolution().intake_side, IntakeSide::None);
    assert_eq!(m.back_intake.state(), IntakeState::Stow);
    assert_eq!(sim.back_intake.borrow().arm.position, 0.0);

    for _ in 0..10 {
        runner.tick();
    }
    // Mode memory outlives the button press.
    assert_eq!(runner.resolution().mode, TeleopMode::Amp);
    assert_eq!(runner.resolution().teleop, TeleopState::Rest);
}

#[test]
fn place_in_speaker_mode_fires_loaded_note() {
    let mut rig = Rig::new(
        SPEAKER_SHOT,
        held(OperatorInputs {
            wants_place: true,
            ..OperatorInputs::default()
        }),
    );
    rig.sim.shooter.borrow_mut().load_note();

    rig.run(1);
    assert!(rig.runner.mechanisms().shooter.has_note());
    assert_eq!(rig.runner.resolution().teleop, TeleopState::Shoot);

    rig.run(20);
    let shooter = &rig.runner.mechanisms().shooter;
    assert_eq!(shooter.state(), ShooterState::Shoot);
    assert!(!shooter.has_note());
    let sim = rig.sim.shooter.borrow();
    assert!(!sim.flywheel_switch && !sim.trigger_switch);
    assert!(sim.flywheel_rps > 5.0);
}

#[test]
fn manual_trigger_feeds_forward_in_any_state() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            force_trigger: true,
            ..OperatorInputs::default()
        }),
    );
    rig.run(3);
    let command = rig.sim.shooter.borrow().last_command.expect("written");
    assert!(command.trigger_effort > 0.0);
}

#[test]
fn pivot_jog_holds_until_reset() {
    let mut rig = Rig::new(
        MIDFIELD,
        vec![
            at(
                0,
                OperatorInputs {
                    jog_pivot: 1.0,
                    ..OperatorInputs::default()
                },
            ),
            at(
                10,
                OperatorInputs {
                    reset_manual_inputs: true,
                    ..OperatorInputs::default()
                },
            ),
            at(11, OperatorInputs::default()),
        ],
    );
    // 20 deg/s over 10 ms ticks.
    rig.run(10);
    assert!(rig.runner.mechanisms().manual_override_active());
    assert!((rig.runner.mechanisms().pivot.jog_offset_deg() - 2.0).abs() < 1e-9);
    let jogged = rig.sim.pivot.borrow().last_command.expect("written");
    assert!(jogged.angle_deg > 1.0);

    rig.run(2);
    assert!(!rig.runner.mechanisms().manual_override_active());
    assert_eq!(rig.sim.pivot.borrow().last_command.expect("written").angle_deg, 0.0);
}

#[test]
fn run_honours_tick_limit_and_records_stats() {
    let (sim, runner) = scripted(INTAKE_THEN_AMP);
    let mut runner = runner.with_max_ticks(5);
    runner.run(&AtomicBool::new(false)).unwrap();

    let stats = runner.stats();
    assert_eq!(stats.cycle_count, 5);
    assert!(stats.min_cycle_ns <= stats.avg_cycle_ns());
    assert!(stats.avg_cycle_ns() <= stats.max_cycle_ns);
    assert_eq!(sim.drivebase.borrow().requests, 5);
}

#[test]
fn run_stops_when_flag_is_set() {
    let (_sim, mut runner) = scripted(INTAKE_THEN_AMP);
    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        s.store(true, Ordering::SeqCst);
    });

    runner.run(&stop).unwrap();
    stopper.join().unwrap();
    assert!(runner.ticks() > 0);
}
