//! Teleop drive through the full tick: sticks in, drivebase motion out.

use crescendo_common::geometry::{Alliance, Pose2d};
use crescendo_common::hal::types::DriveFrame;
use crescendo_common::robot::input::{DriveSticks, OperatorInputs};
use crescendo_common::robot::state::{IntakeSide, SwerveState, TeleopState};

use super::{MIDFIELD, Rig, at, held};

const EPS: f64 = 1e-9;

fn sticks(translation: f64, strafe: f64) -> DriveSticks {
    DriveSticks {
        translation,
        strafe,
        ..DriveSticks::default()
    }
}

#[test]
fn full_stick_ramps_to_top_speed() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            drive: sticks(1.0, 0.0),
            ..OperatorInputs::default()
        }),
    );

    rig.run(1);
    let first = rig.runner.last_request().expect("sent");
    assert_eq!(first.frame, DriveFrame::FieldCentric);
    assert!(first.open_loop);
    // 5/s speed limit over 10 ms, times the 7 m/s multiplier.
    assert!((first.vx - 0.35).abs() < EPS);
    assert!(first.vy.abs() < EPS);

    rig.run(49);
    let cruise = rig.runner.last_request().expect("sent");
    assert!((cruise.vx - 7.0).abs() < EPS);

    let pose = rig.sim.drivebase.borrow().pose;
    assert!(pose.x > MIDFIELD.x + 1.0);
    assert!((pose.y - MIDFIELD.y).abs() < EPS);
    assert_eq!(rig.runner.resolution().teleop, TeleopState::Rest);
}

#[test]
fn lock_in_with_idle_sticks_locks_wheels() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            lock_in: true,
            ..OperatorInputs::default()
        }),
    );
    rig.run(10);

    assert_eq!(rig.runner.resolution().swerve, SwerveState::LockIn);
    assert_eq!(rig.runner.last_request().expect("sent").frame, DriveFrame::WheelLock);
    assert_eq!(rig.sim.drivebase.borrow().pose, MIDFIELD);
}

#[test]
fn dpad_turns_robot_to_heading() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            drive: DriveSticks {
                pov: Some(90.0),
                ..DriveSticks::default()
            },
            ..OperatorInputs::default()
        }),
    );
    rig.run(60);

    assert_eq!(
        rig.runner.last_request().expect("sent").frame,
        DriveFrame::FacingAngle { heading_deg: 90.0 }
    );
    assert!((rig.sim.drivebase.borrow().pose.heading_deg - 90.0).abs() < EPS);
}

#[test]
fn disabled_auto_heading_ignores_dpad() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            disable_auto_heading: true,
            drive: DriveSticks {
                pov: Some(90.0),
                ..DriveSticks::default()
            },
            ..OperatorInputs::default()
        }),
    );
    rig.run(60);

    assert_eq!(rig.runner.last_request().expect("sent").frame, DriveFrame::FieldCentric);
    assert_eq!(rig.sim.drivebase.borrow().pose, MIDFIELD);
}

#[test]
fn zero_odometry_resets_heading_once() {
    let start = Pose2d::new(10.0, 4.0, 45.0);
    let mut rig = Rig::new(
        start,
        vec![
            at(
                0,
                OperatorInputs {
                    zero_odometry: true,
                    ..OperatorInputs::default()
                },
            ),
            at(1, OperatorInputs::default()),
        ],
    );
    rig.run(1);
    assert_eq!(rig.sim.drivebase.borrow().pose.heading_deg, 0.0);

    rig.sim.drivebase.borrow_mut().pose.heading_deg = 30.0;
    rig.run(5);
    assert_eq!(rig.sim.drivebase.borrow().pose.heading_deg, 30.0);
}

#[test]
fn back_intake_drives_robot_centric_closed_loop() {
    let mut rig = Rig::new(
        MIDFIELD,
        held(OperatorInputs {
            wants_intake: true,
            ..OperatorInputs::default()
        }),
    );
    rig.run(1);

    assert_eq!(rig.runner.resolution().teleop, TeleopState::IntakeBack);
    assert_eq!(rig.runner.resolution().swerve, SwerveState::AlignIntaking);
    let request = rig.runner.last_request().expect("sent");
    assert_eq!(request.frame, DriveFrame::RobotCentric);
    assert!(!request.open_loop);
}

#[test]
fn leading_intake_follows_chassis_direction() {
    // Turned around, pushing robot-forward: heading toward the blue wall.
    let mut rig = Rig::new(
        Pose2d::new(10.0, 4.0, 180.0),
        held(OperatorInputs {
            wants_intake: true,
            robot_centric: true,
            drive: sticks(1.0, 0.0),
            ..OperatorInputs::default()
        }),
    );
    rig.run(1);
    assert_eq!(rig.runner.resolution().teleop, TeleopState::IntakeBack);

    rig.run(20);
    assert_eq!(rig.runner.resolution().teleop, TeleopState::IntakeFront);
    assert_eq!(rig.runner.resolution().intake_side, IntakeSide::Front);
    let pose = rig.sim.drivebase.borrow().pose;
    assert!(pose.x < 10.0);
}

#[test]
fn robot_centric_translation_follows_heading() {
    let mut rig = Rig::new(
        Pose2d::new(10.0, 4.0, 90.0),
        held(OperatorInputs {
            drive: sticks(1.0, 0.0),
            robot_centric: true,
            ..OperatorInputs::default()
        }),
    );
    rig.run(50);

    let pose = rig.sim.drivebase.borrow().pose;
    assert!(pose.y > 5.0);
    assert!((pose.x - 10.0).abs() < 1e-6);
}

#[test]
fn red_alliance_automation_uses_mirrored_pose() {
    let red_wing = Pose2d::new(16.54 - 2.0, 5.55, 180.0);

    let mut blue = Rig::new(red_wing, held(OperatorInputs::default()));
    blue.run(1);
    assert_eq!(blue.runner.resolution().teleop, TeleopState::Rest);

    let mut red = Rig::new(
        red_wing,
        held(OperatorInputs {
            alliance: Alliance::Red,
            ..OperatorInputs::default()
        }),
    );
    red.run(1);
    assert_eq!(red.runner.resolution().teleop, TeleopState::AutoAim);
    assert_eq!(red.runner.resolution().swerve, SwerveState::Aim);
}
