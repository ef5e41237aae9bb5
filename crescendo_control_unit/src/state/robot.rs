//! Robot-level coordinator.
//!
//! Maps the resolver's `TeleopState` to one target per mechanism
//! (`RobotState`), runs the interlock table against the sensed pivot and
//! diverter, and forwards the possibly substituted requests.
//!
//! ```text
//! TeleopState ──map──► target ──eject──► interlocks ──► forwarded ──► request_state()
//!                                            │
//!                                            └──► set_interlocked() per mechanism
//! ```
//!
//! Runs after the mechanism updates, so requests forwarded here are acted
//! on by the next tick's updates.

use tracing::{info, warn};

use crescendo_common::robot::state::{
    ClimberState, DiverterState, IntakeSide, IntakeState, MechanismId, PivotState, RobotState,
    ShooterState, TeleopState,
};

use crate::safety::interlock::{self, EngagedInterlocks, Interlock, SensedState};

use super::climber::ClimberStatemachine;
use super::diverter::DiverterStatemachine;
use super::intake::IntakeStatemachine;
use super::machine::StateMachine;
use super::pivot::PivotStatemachine;
use super::shooter::ShooterStatemachine;

/// The six coordinated mechanisms. Swerve is driven separately.
pub struct Mechanisms {
    pub shooter: ShooterStatemachine,
    pub front_intake: IntakeStatemachine,
    pub back_intake: IntakeStatemachine,
    pub pivot: PivotStatemachine,
    pub diverter: DiverterStatemachine,
    pub climber: ClimberStatemachine,
}

impl Mechanisms {
    /// Run every mechanism's `update` once.
    pub fn update(&mut self) {
        self.shooter.update();
        self.front_intake.update();
        self.back_intake.update();
        self.pivot.update();
        self.diverter.update();
        self.climber.update();
    }

    /// Active states.
    pub fn state(&self) -> RobotState {
        RobotState {
            shooter: self.shooter.state(),
            front_intake: self.front_intake.state(),
            back_intake: self.back_intake.state(),
            pivot: self.pivot.state(),
            diverter: self.diverter.state(),
            climber: self.climber.state(),
        }
    }

    /// True while any mechanism is transitioning.
    pub fn transitioning(&self) -> bool {
        self.shooter.transitioning()
            || self.front_intake.transitioning()
            || self.back_intake.transitioning()
            || self.pivot.transitioning()
            || self.diverter.transitioning()
            || self.climber.transitioning()
    }

    fn sensed(&self) -> SensedState {
        SensedState {
            pivot: self.pivot.state(),
            pivot_settled: !self.pivot.transitioning(),
            diverter: self.diverter.state(),
            diverter_settled: !self.diverter.transitioning(),
        }
    }

    fn request(&mut self, target: &RobotState) {
        self.shooter.request_state(target.shooter);
        self.front_intake.request_state(target.front_intake);
        self.back_intake.request_state(target.back_intake);
        self.pivot.request_state(target.pivot);
        self.diverter.request_state(target.diverter);
        self.climber.request_state(target.climber);
    }

    /// True while any operator override is shaping a mechanism command.
    pub fn manual_override_active(&self) -> bool {
        self.shooter.manual_override_active()
            || self.pivot.manual_override_active()
            || self.climber.manual_override_active()
    }

    fn apply_manual(&mut self, manual: &ManualAdjust) {
        self.shooter.set_trigger_jog(manual.trigger_effort);
        if manual.reset {
            if self.pivot.manual_override_active() || self.climber.manual_override_active() {
                info!(
                    pivot_deg = self.pivot.jog_offset_deg(),
                    climber_m = self.climber.jog_offset_m(),
                    "manual offsets cleared"
                );
            }
            self.pivot.reset_jog();
            self.climber.reset_jog();
        } else {
            self.pivot.jog(manual.pivot_deg);
            self.climber.jog(manual.climber_m);
        }
    }

    fn set_interlocked(&mut self, mechanism: MechanismId, engaged: bool) {
        match mechanism {
            MechanismId::Shooter => self.shooter.set_interlocked(engaged),
            MechanismId::FrontIntake => self.front_intake.set_interlocked(engaged),
            MechanismId::BackIntake => self.back_intake.set_interlocked(engaged),
            MechanismId::Pivot => self.pivot.set_interlocked(engaged),
            MechanismId::Diverter => self.diverter.set_interlocked(engaged),
            MechanismId::Climber => self.climber.set_interlocked(engaged),
            MechanismId::Swerve => {}
        }
    }
}

/// Operator jogs for one tick, already scaled to the tick period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManualAdjust {
    /// Trigger effort in [-1, 1]; zero leaves the trigger to the state.
    pub trigger_effort: f64,
    /// Pivot offset step [deg].
    pub pivot_deg: f64,
    /// Climber offset step [m].
    pub climber_m: f64,
    /// Clear the pivot and climber offsets; steps are ignored while held.
    pub reset: bool,
}

impl ManualAdjust {
    pub const NONE: Self = Self {
        trigger_effort: 0.0,
        pivot_deg: 0.0,
        climber_m: 0.0,
        reset: false,
    };
}

/// What the coordinator is told each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Directive {
    pub teleop: TeleopState,
    /// Intake the resolver picked; `eject` reverses it (`None` → back).
    pub intake_side: IntakeSide,
    pub eject: bool,
    pub manual_trigger: bool,
    pub manual: ManualAdjust,
}

impl Directive {
    pub const fn new(teleop: TeleopState) -> Self {
        Self {
            teleop,
            intake_side: IntakeSide::None,
            eject: false,
            manual_trigger: false,
            manual: ManualAdjust::NONE,
        }
    }
}

/// Fixed `TeleopState` → `RobotState` table.
pub const fn robot_state_for(teleop: TeleopState) -> RobotState {
    use TeleopState as T;

    let mut r = RobotState {
        shooter: ShooterState::RampDown,
        front_intake: IntakeState::Stow,
        back_intake: IntakeState::Stow,
        pivot: PivotState::Rest,
        diverter: DiverterState::Retract,
        climber: ClimberState::Stow,
    };
    match teleop {
        T::Rest | T::Stow | T::AlignClimb => {}
        T::IntakeFront => {
            r.shooter = ShooterState::Intake;
            r.front_intake = IntakeState::Intake;
            r.pivot = PivotState::Intake;
        }
        T::IntakeBack => {
            r.shooter = ShooterState::Intake;
            r.back_intake = IntakeState::Intake;
            r.pivot = PivotState::Intake;
        }
        T::AutoAim => {
            r.shooter = ShooterState::AutoAim;
            r.pivot = PivotState::AutoAim;
        }
        T::Shoot => {
            r.shooter = ShooterState::Shoot;
            r.pivot = PivotState::AutoAim;
        }
        T::Handoff => {
            r.shooter = ShooterState::Handoff;
            r.pivot = PivotState::Handoff;
            r.diverter = DiverterState::Handoff;
        }
        T::AlignAmp => r.diverter = DiverterState::Amp,
        T::PlaceAmp => r.diverter = DiverterState::PlaceAmp,
        T::ClimbExtend => r.climber = ClimberState::Extend,
        T::ClimbRetract => {
            r.diverter = DiverterState::Trap;
            r.climber = ClimberState::Retract;
        }
        T::PlaceTrap => {
            r.diverter = DiverterState::PlaceTrap;
            r.climber = ClimberState::Retract;
        }
        T::ClimbBalance => r.climber = ClimberState::Balance,
    }
    r
}

/// Coordinator state: the last target, what was forwarded and which
/// interlocks are engaged.
#[derive(Debug, Default)]
pub struct RobotStatemachine {
    target: RobotState,
    forwarded: RobotState,
    engaged: EngagedInterlocks,
}

impl RobotStatemachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unsubstituted target of the last update.
    #[inline]
    pub const fn target(&self) -> RobotState {
        self.target
    }

    /// Requests forwarded on the last update.
    #[inline]
    pub const fn forwarded(&self) -> RobotState {
        self.forwarded
    }

    #[inline]
    pub const fn engaged(&self) -> EngagedInterlocks {
        self.engaged
    }

    /// Map, guard and forward. Call once per tick after `Mechanisms::update`.
    pub fn update(&mut self, mechanisms: &mut Mechanisms, directive: &Directive) {
        let mut target = robot_state_for(directive.teleop);
        if directive.eject {
            match directive.intake_side {
                IntakeSide::Front => target.front_intake = IntakeState::Eject,
                IntakeSide::Back | IntakeSide::None => target.back_intake = IntakeState::Eject,
            }
        }

        let eval = interlock::evaluate(&target, &mechanisms.sensed());
        let engaged = eval.engaged();
        self.log_interlock_edges(engaged);

        for id in MechanismId::ALL {
            mechanisms.set_interlocked(id, eval.blocks(id));
        }
        mechanisms.request(&eval.forwarded);
        mechanisms.shooter.set_manual_trigger(directive.manual_trigger);
        mechanisms.apply_manual(&directive.manual);

        self.target = target;
        self.forwarded = eval.forwarded;
        self.engaged = engaged;
    }

    fn log_interlock_edges(&self, engaged: EngagedInterlocks) {
        for interlock in Interlock::ALL {
            let flag = interlock.flag();
            let now = engaged.contains(flag);
            if now == self.engaged.contains(flag) {
                continue;
            }
            let mechanism = interlock.guarded().name();
            if now {
                warn!(interlock = interlock.name(), mechanism, "interlock engaged");
            } else {
                info!(interlock = interlock.name(), mechanism, "interlock cleared");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockIo, MockPlanner};
    use crescendo_common::hal::types::*;
    use crescendo_common::robot::config::RobotConfig;
    use crescendo_common::robot::error::ReadinessFlags;

    struct Rig {
        mechanisms: Mechanisms,
        front: MockIo<IntakeFeedback, IntakeCommand>,
        pivot: MockIo<PivotFeedback, PivotCommand>,
        diverter: MockIo<DiverterFeedback, DiverterCommand>,
        shooter: MockIo<ShooterFeedback, ShooterCommand>,
    }

    fn rig() -> Rig {
        let cfg = RobotConfig::default();
        let planner = MockPlanner::with(AimSolution {
            flywheel_rps: 80.0,
            pivot_deg: 30.0,
            heading_deg: 0.0,
        });
        let shooter = MockIo::new(ShooterFeedback::default());
        let front = MockIo::new(IntakeFeedback::default());
        let back = MockIo::new(IntakeFeedback::default());
        let pivot = MockIo::new(PivotFeedback::default());
        let diverter = MockIo::new(DiverterFeedback::default());
        let climber = MockIo::new(ClimberFeedback::default());
        let mechanisms = Mechanisms {
            shooter: ShooterStatemachine::new(
                Box::new(shooter.clone()),
                planner.clone(),
                &cfg.shooter,
            ),
            front_intake: IntakeStatemachine::new(
                "front_intake",
                Box::new(front.clone()),
                &cfg.intake,
            ),
            back_intake: IntakeStatemachine::new("back_intake", Box::new(back), &cfg.intake),
            pivot: PivotStatemachine::new(Box::new(pivot.clone()), planner, &cfg.pivot),
            diverter: DiverterStatemachine::new(Box::new(diverter.clone()), &cfg.diverter),
            climber: ClimberStatemachine::new(Box::new(climber), &cfg.climber),
        };
        Rig {
            mechanisms,
            front,
            pivot,
            diverter,
            shooter,
        }
    }

    fn tick(rig: &mut Rig, coordinator: &mut RobotStatemachine, directive: &Directive) {
        rig.mechanisms.update();
        coordinator.update(&mut rig.mechanisms, directive);
    }

    #[test]
    fn table_covers_every_teleop_state() {
        assert_eq!(robot_state_for(TeleopState::Rest), RobotState::default());
        assert_eq!(robot_state_for(TeleopState::Stow), RobotState::default());

        let shoot = robot_state_for(TeleopState::Shoot);
        assert_eq!(shoot.shooter, ShooterState::Shoot);
        assert_eq!(shoot.pivot, PivotState::AutoAim);

        let handoff = robot_state_for(TeleopState::Handoff);
        assert_eq!(handoff.diverter, DiverterState::Handoff);
        assert_eq!(handoff.pivot, PivotState::Handoff);

        let trap = robot_state_for(TeleopState::PlaceTrap);
        assert_eq!(trap.diverter, DiverterState::PlaceTrap);
        assert_eq!(trap.climber, ClimberState::Retract);

        assert_eq!(
            robot_state_for(TeleopState::IntakeBack).back_intake,
            IntakeState::Intake
        );
        assert_eq!(
            robot_state_for(TeleopState::ClimbBalance).climber,
            ClimberState::Balance
        );
    }

    #[test]
    fn front_intake_held_until_pivot_reaches_intake() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let directive = Directive::new(TeleopState::IntakeFront);

        // Pivot settled at Rest but sent to Intake on this tick: hold.
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(coordinator.forwarded().pivot, PivotState::Intake);
        assert_eq!(coordinator.forwarded().front_intake, IntakeState::Stow);
        assert!(
            coordinator
                .engaged()
                .contains(EngagedInterlocks::FRONT_INTAKE_PIVOT)
        );

        // Pivot heading for 10° and still at 0°.
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(rig.mechanisms.pivot.state(), PivotState::Intake);
        assert!(rig.mechanisms.pivot.transitioning());
        assert_eq!(coordinator.forwarded().front_intake, IntakeState::Stow);
        assert!(
            rig.mechanisms
                .front_intake
                .readiness()
                .contains(ReadinessFlags::INTERLOCKED)
        );

        // Pivot settles: original request forwarded on the same tick.
        rig.pivot.set(PivotFeedback { angle_deg: 10.0 });
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(coordinator.forwarded().front_intake, IntakeState::Intake);
        assert!(coordinator.engaged().is_empty());
        assert!(
            !rig.mechanisms
                .front_intake
                .readiness()
                .contains(ReadinessFlags::INTERLOCKED)
        );
    }

    #[test]
    fn front_intake_never_deploys_while_pivot_swings() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let directive = Directive::new(TeleopState::IntakeFront);

        for n in 0..6 {
            if n == 3 {
                rig.pivot.set(PivotFeedback { angle_deg: 10.0 });
            }
            tick(&mut rig, &mut coordinator, &directive);
        }

        let front = rig.front.history();
        let pivot = rig.pivot.history();
        assert_eq!(front.len(), pivot.len());
        for (n, (intake, pivot)) in front.iter().zip(&pivot).enumerate() {
            if n < 4 {
                assert_eq!(intake.deploy_deg, 0.0, "tick {n}");
            } else {
                assert_eq!(intake.deploy_deg, 120.0, "tick {n}");
                assert_eq!(pivot.angle_deg, 10.0, "tick {n}");
            }
        }
    }

    #[test]
    fn eject_targets_selected_side() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let directive = Directive {
            eject: true,
            ..Directive::new(TeleopState::Rest)
        };
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(coordinator.forwarded().back_intake, IntakeState::Eject);
        assert_eq!(coordinator.forwarded().front_intake, IntakeState::Stow);

        let directive = Directive {
            eject: true,
            intake_side: IntakeSide::Front,
            ..Directive::new(TeleopState::Rest)
        };
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(coordinator.forwarded().front_intake, IntakeState::Eject);
        assert_eq!(coordinator.target().front_intake, IntakeState::Eject);
    }

    #[test]
    fn eject_front_still_waits_for_pivot() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        rig.pivot.set(PivotFeedback { angle_deg: 45.0 });
        let directive = Directive::new(TeleopState::Handoff);
        tick(&mut rig, &mut coordinator, &directive);
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(rig.mechanisms.pivot.state(), PivotState::Handoff);

        let directive = Directive {
            eject: true,
            intake_side: IntakeSide::Front,
            ..Directive::new(TeleopState::Handoff)
        };
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(coordinator.target().front_intake, IntakeState::Eject);
        assert_eq!(coordinator.forwarded().front_intake, IntakeState::Stow);
    }

    #[test]
    fn handoff_sequences_pivot_diverter_shooter() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let directive = Directive::new(TeleopState::Handoff);

        // Pivot settled at Rest but sent to Handoff: diverter and shooter wait.
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(coordinator.forwarded().pivot, PivotState::Handoff);
        assert_eq!(coordinator.forwarded().diverter, DiverterState::Retract);
        assert_eq!(coordinator.forwarded().shooter, ShooterState::RampDown);

        // Pivot heading for 45°.
        tick(&mut rig, &mut coordinator, &directive);
        assert!(rig.mechanisms.pivot.transitioning());
        assert_eq!(coordinator.forwarded().diverter, DiverterState::Retract);

        // Pivot settled: diverter goes, shooter waits for the diverter.
        rig.pivot.set(PivotFeedback { angle_deg: 45.0 });
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(coordinator.forwarded().diverter, DiverterState::Handoff);
        assert_eq!(coordinator.forwarded().shooter, ShooterState::RampDown);

        rig.diverter.set(DiverterFeedback {
            extension_m: 0.05,
            note_switch: false,
        });
        tick(&mut rig, &mut coordinator, &directive);
        assert_eq!(rig.mechanisms.diverter.state(), DiverterState::Handoff);
        assert!(!rig.mechanisms.diverter.transitioning());
        assert_eq!(coordinator.forwarded().shooter, ShooterState::Handoff);
        assert!(coordinator.engaged().is_empty());
    }

    #[test]
    fn diverter_never_extends_while_pivot_swings() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let directive = Directive::new(TeleopState::Handoff);

        for n in 0..6 {
            if n == 3 {
                rig.pivot.set(PivotFeedback { angle_deg: 45.0 });
            }
            tick(&mut rig, &mut coordinator, &directive);
        }

        let diverter = rig.diverter.history();
        let pivot = rig.pivot.history();
        assert_eq!(diverter.len(), pivot.len());
        for (n, (diverter, pivot)) in diverter.iter().zip(&pivot).enumerate() {
            if n < 4 {
                assert_eq!(diverter.extension_m, 0.0, "tick {n}");
            } else {
                assert_eq!(diverter.extension_m, 0.05, "tick {n}");
                assert_eq!(pivot.angle_deg, 45.0, "tick {n}");
            }
        }
    }

    #[test]
    fn manual_trigger_is_forwarded_to_shooter() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let directive = Directive {
            manual_trigger: true,
            ..Directive::new(TeleopState::Rest)
        };
        tick(&mut rig, &mut coordinator, &directive);
        rig.mechanisms.update();
        assert_eq!(rig.shooter.last().unwrap().trigger_effort, 1.0);
    }

    #[test]
    fn jogs_offset_pivot_until_reset() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let jog = Directive {
            manual: ManualAdjust {
                pivot_deg: 0.2,
                climber_m: 0.001,
                ..ManualAdjust::NONE
            },
            ..Directive::new(TeleopState::Rest)
        };
        for _ in 0..10 {
            tick(&mut rig, &mut coordinator, &jog);
        }
        assert!(rig.mechanisms.manual_override_active());
        assert!((rig.mechanisms.pivot.jog_offset_deg() - 2.0).abs() < 1e-9);
        assert!((rig.mechanisms.climber.jog_offset_m() - 0.01).abs() < 1e-9);

        // Rest (0°) plus nine applied steps.
        assert!((rig.pivot.last().unwrap().angle_deg - 1.8).abs() < 1e-9);

        let reset = Directive {
            manual: ManualAdjust {
                pivot_deg: 0.2,
                reset: true,
                ..ManualAdjust::NONE
            },
            ..Directive::new(TeleopState::Rest)
        };
        tick(&mut rig, &mut coordinator, &reset);
        rig.mechanisms.update();
        assert!(!rig.mechanisms.manual_override_active());
        assert_eq!(rig.pivot.last().unwrap().angle_deg, 0.0);
    }

    #[test]
    fn trigger_jog_overrides_state_effort() {
        let mut rig = rig();
        let mut coordinator = RobotStatemachine::new();
        let directive = Directive {
            manual: ManualAdjust {
                trigger_effort: -0.4,
                ..ManualAdjust::NONE
            },
            ..Directive::new(TeleopState::Rest)
        };
        tick(&mut rig, &mut coordinator, &directive);
        assert!(rig.mechanisms.manual_override_active());
        rig.mechanisms.update();
        assert_eq!(rig.shooter.last().unwrap().trigger_effort, -0.4);

        tick(&mut rig, &mut coordinator, &Directive::new(TeleopState::Rest));
        rig.mechanisms.update();
        assert_eq!(rig.shooter.last().unwrap().trigger_effort, 0.0);
        assert!(!rig.mechanisms.manual_override_active());
    }
}
