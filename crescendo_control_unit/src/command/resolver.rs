//! Input resolver.
//!
//! Turns the operator snapshot, the pose and the chassis velocity into one
//! robot-level target per tick. Holds the only cross-tick memory of the
//! teleop layer: mode, intake side, climb sub-mode and the aiming flag.
//!
//! Priority, highest first:
//!
//! ```text
//! 1. overrides   force_aim → AutoAim, force_intake_front → IntakeFront,
//!                force_intake_back → IntakeBack, force_handoff → Handoff,
//!                force_amp → AlignAmp
//! 2. stow        → Stow
//! 3. intake      → IntakeFront | IntakeBack   (side memory, velocity switch)
//! 4. place       Amp → PlaceAmp, Climb/Retract → PlaceTrap, Speaker → Shoot
//! 5. automation  per mode, on the blue-normalised pose
//! 6.             → Rest
//! ```

use tracing::debug;

use crescendo_common::geometry::{Alliance, ChassisSpeeds, Pose2d};
use crescendo_common::robot::config::ResolverConfig;
use crescendo_common::robot::input::OperatorInputs;
use crescendo_common::robot::state::{ClimbMode, IntakeSide, SwerveState, TeleopMode, TeleopState};

/// Output of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub teleop: TeleopState,
    pub swerve: SwerveState,
    pub mode: TeleopMode,
    pub intake_side: IntakeSide,
    pub climb_mode: ClimbMode,
    /// Speaker automation wants the heading locked on the target.
    pub aiming: bool,
}

pub struct InputResolver {
    config: ResolverConfig,
    mode: TeleopMode,
    intake_side: IntakeSide,
    climb_mode: ClimbMode,
    aiming: bool,
    last: TeleopState,
}

impl InputResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            config: config.clone(),
            mode: TeleopMode::default(),
            intake_side: IntakeSide::default(),
            climb_mode: ClimbMode::default(),
            aiming: false,
            last: TeleopState::default(),
        }
    }

    #[inline]
    pub const fn mode(&self) -> TeleopMode {
        self.mode
    }

    #[inline]
    pub const fn climb_mode(&self) -> ClimbMode {
        self.climb_mode
    }

    #[inline]
    pub const fn intake_side(&self) -> IntakeSide {
        self.intake_side
    }

    /// Resolve one tick.
    pub fn resolve(
        &mut self,
        inputs: &OperatorInputs,
        pose: &Pose2d,
        speeds: &ChassisSpeeds,
    ) -> Resolution {
        let teleop = self.wanted_teleop_state(inputs, pose, speeds);
        if teleop != self.last {
            debug!(from = ?self.last, to = ?teleop, mode = ?self.mode, "teleop state change");
            self.last = teleop;
        }
        Resolution {
            teleop,
            swerve: self.wanted_swerve_state(inputs),
            mode: self.mode,
            intake_side: self.intake_side,
            climb_mode: self.climb_mode,
            aiming: self.aiming,
        }
    }

    fn wanted_teleop_state(
        &mut self,
        inputs: &OperatorInputs,
        pose: &Pose2d,
        speeds: &ChassisSpeeds,
    ) -> TeleopState {
        let pose = self.to_blue(pose, inputs.alliance);

        // Later wins.
        if inputs.wants_amp_mode {
            self.mode = TeleopMode::Amp;
        }
        if inputs.wants_climb_mode {
            self.mode = TeleopMode::Climb;
        }
        if inputs.wants_speaker_mode {
            self.mode = TeleopMode::Speaker;
        }
        if self.mode != TeleopMode::Climb {
            self.climb_mode = ClimbMode::Align;
        }

        self.aiming = false;

        if let Some(state) = self.override_state(inputs) {
            return state;
        }
        if inputs.wants_stow {
            self.intake_side = IntakeSide::None;
            return TeleopState::Stow;
        }

        self.intake_side = self.wanted_intake_side(inputs, speeds);
        match self.intake_side {
            IntakeSide::Front => return TeleopState::IntakeFront,
            IntakeSide::Back => return TeleopState::IntakeBack,
            IntakeSide::None => {}
        }

        if inputs.wants_place {
            match self.mode {
                TeleopMode::Amp => return TeleopState::PlaceAmp,
                TeleopMode::Climb if self.climb_mode == ClimbMode::Retract => {
                    return TeleopState::PlaceTrap;
                }
                TeleopMode::Climb => {}
                TeleopMode::Speaker => {
                    self.aiming = pose.x < self.config.auto_aim_x;
                    return TeleopState::Shoot;
                }
            }
        }

        match self.mode {
            TeleopMode::Amp => {
                // The align zone sits inside the handoff zone, so it is
                // tested first. Handoff-first would never reach AlignAmp.
                if pose.x < self.config.amp_align_x && pose.y < self.config.amp_align_y {
                    TeleopState::AlignAmp
                } else if pose.x < self.config.amp_handoff_x {
                    TeleopState::Handoff
                } else {
                    TeleopState::Rest
                }
            }
            TeleopMode::Climb => {
                self.climb_mode = self.wanted_climb_mode(inputs);
                match self.climb_mode {
                    ClimbMode::Align => TeleopState::AlignClimb,
                    ClimbMode::Extend => TeleopState::ClimbExtend,
                    ClimbMode::Retract => TeleopState::ClimbRetract,
                    ClimbMode::Balance => TeleopState::ClimbBalance,
                }
            }
            TeleopMode::Speaker => {
                self.aiming = pose.x < self.config.auto_aim_x;
                if inputs.wants_shoot {
                    TeleopState::Shoot
                } else if self.aiming {
                    TeleopState::AutoAim
                } else {
                    TeleopState::Rest
                }
            }
        }
    }

    fn override_state(&mut self, inputs: &OperatorInputs) -> Option<TeleopState> {
        let (state, side) = if inputs.force_aim {
            (TeleopState::AutoAim, IntakeSide::None)
        } else if inputs.force_intake_front {
            (TeleopState::IntakeFront, IntakeSide::Front)
        } else if inputs.force_intake_back {
            (TeleopState::IntakeBack, IntakeSide::Back)
        } else if inputs.force_handoff {
            (TeleopState::Handoff, IntakeSide::None)
        } else if inputs.force_amp {
            (TeleopState::AlignAmp, IntakeSide::None)
        } else {
            return None;
        };
        self.intake_side = side;
        Some(state)
    }

    /// `speeds` are robot-relative: the intake on the side the chassis is
    /// moving toward leads, whatever the heading.
    fn wanted_intake_side(&self, inputs: &OperatorInputs, speeds: &ChassisSpeeds) -> IntakeSide {
        if !inputs.wants_intake {
            return IntakeSide::None;
        }
        let threshold = self.config.intake_switch_velocity;
        if speeds.vx < -threshold {
            IntakeSide::Back
        } else if speeds.vx > threshold {
            IntakeSide::Front
        } else if self.intake_side == IntakeSide::None {
            IntakeSide::Back
        } else {
            self.intake_side
        }
    }

    fn wanted_climb_mode(&self, inputs: &OperatorInputs) -> ClimbMode {
        if !inputs.wants_align {
            ClimbMode::Align
        } else if inputs.wants_balance {
            ClimbMode::Balance
        } else if inputs.wants_climb_extend {
            ClimbMode::Extend
        } else if inputs.wants_climb_retract {
            ClimbMode::Retract
        } else {
            self.climb_mode
        }
    }

    fn wanted_swerve_state(&self, inputs: &OperatorInputs) -> SwerveState {
        if inputs.force_aim || self.aiming {
            SwerveState::Aim
        } else if self.intake_side == IntakeSide::Back {
            SwerveState::AlignIntaking
        } else if inputs.robot_centric {
            SwerveState::RobotCentric
        } else if inputs.lock_in {
            SwerveState::LockIn
        } else if inputs.closed_loop {
            SwerveState::ClosedLoopTeleop
        } else {
            SwerveState::OpenLoopTeleop
        }
    }

    fn to_blue(&self, pose: &Pose2d, alliance: Alliance) -> Pose2d {
        match alliance {
            Alliance::Blue => *pose,
            Alliance::Red => Pose2d {
                x: self.config.field_length_m - pose.x,
                ..pose.to_blue_origin(Alliance::Red)
            },
        }
    }
}
