//! Cross-mechanism interlock table.
//!
//! Each interlock guards one mechanism's request against the sensed state of
//! another. A blocked request is replaced by a safe interim state; the
//! original is re-evaluated every tick and forwarded unchanged as soon as
//! the guard clears.
//!
//! | # | Guarded request                       | Allowed while (settled)       | Interim    |
//! |---|---------------------------------------|-------------------------------|------------|
//! | 1 | front intake `Intake\|Feed\|Eject`    | pivot `Rest\|Intake`          | `Stow`     |
//! | 2 | pivot aim states                      | diverter `Retract`            | `Rest`     |
//! | 3 | diverter extended states              | pivot `Rest\|Handoff`         | `Retract`  |
//! | 4 | shooter `Handoff`                     | diverter `Handoff`            | `RampDown` |
//! | 5 | climber `Extend\|Retract\|Balance`    | pivot `Rest`                  | `Hold`     |
//!
//! "Settled" means the guarding mechanism is not transitioning and is not
//! being sent anywhere else on the same tick. Rows 2 and 3 guard the pivot
//! and diverter against each other, so they are decided against the raw
//! target first; the other rows then see where those two are headed after
//! substitution.

use bitflags::bitflags;
use static_assertions::const_assert;

use crescendo_common::robot::state::{
    ClimberState, DiverterState, IntakeState, MechanismId, PivotState, RobotState, ShooterState,
};

/// Number of interlocks in the table.
pub const INTERLOCK_COUNT: usize = 5;

bitflags! {
    /// Set of engaged interlocks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EngagedInterlocks: u8 {
        const FRONT_INTAKE_PIVOT      = 0x01;
        const PIVOT_AIM_DIVERTER      = 0x02;
        const DIVERTER_PIVOT          = 0x04;
        const SHOOTER_HANDOFF         = 0x08;
        const CLIMBER_PIVOT           = 0x10;
    }
}

impl Default for EngagedInterlocks {
    fn default() -> Self {
        Self::empty()
    }
}

// One flag bit per interlock.
const_assert!(INTERLOCK_COUNT <= u8::BITS as usize);
const_assert!(EngagedInterlocks::all().bits().count_ones() as usize == INTERLOCK_COUNT);

/// One row of the interlock table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Interlock {
    FrontIntakeNeedsPivotClear = 0,
    PivotAimNeedsDiverterRetracted = 1,
    DiverterNeedsPivotClear = 2,
    ShooterHandoffNeedsDiverter = 3,
    ClimberNeedsPivotRest = 4,
}

impl Interlock {
    /// Evaluation order.
    pub const ALL: [Self; INTERLOCK_COUNT] = [
        Self::FrontIntakeNeedsPivotClear,
        Self::PivotAimNeedsDiverterRetracted,
        Self::DiverterNeedsPivotClear,
        Self::ShooterHandoffNeedsDiverter,
        Self::ClimberNeedsPivotRest,
    ];

    /// Mechanism whose request this interlock guards.
    pub const fn guarded(self) -> MechanismId {
        match self {
            Self::FrontIntakeNeedsPivotClear => MechanismId::FrontIntake,
            Self::PivotAimNeedsDiverterRetracted => MechanismId::Pivot,
            Self::DiverterNeedsPivotClear => MechanismId::Diverter,
            Self::ShooterHandoffNeedsDiverter => MechanismId::Shooter,
            Self::ClimberNeedsPivotRest => MechanismId::Climber,
        }
    }

    pub const fn flag(self) -> EngagedInterlocks {
        match self {
            Self::FrontIntakeNeedsPivotClear => EngagedInterlocks::FRONT_INTAKE_PIVOT,
            Self::PivotAimNeedsDiverterRetracted => EngagedInterlocks::PIVOT_AIM_DIVERTER,
            Self::DiverterNeedsPivotClear => EngagedInterlocks::DIVERTER_PIVOT,
            Self::ShooterHandoffNeedsDiverter => EngagedInterlocks::SHOOTER_HANDOFF,
            Self::ClimberNeedsPivotRest => EngagedInterlocks::CLIMBER_PIVOT,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::FrontIntakeNeedsPivotClear => "front_intake_needs_pivot_clear",
            Self::PivotAimNeedsDiverterRetracted => "pivot_aim_needs_diverter_retracted",
            Self::DiverterNeedsPivotClear => "diverter_needs_pivot_clear",
            Self::ShooterHandoffNeedsDiverter => "shooter_handoff_needs_diverter",
            Self::ClimberNeedsPivotRest => "climber_needs_pivot_rest",
        }
    }

    /// True if `target` asks for something this interlock guards.
    fn guards(self, target: &RobotState) -> bool {
        match self {
            Self::FrontIntakeNeedsPivotClear => target.front_intake.is_active(),
            Self::PivotAimNeedsDiverterRetracted => target.pivot.is_aiming(),
            Self::DiverterNeedsPivotClear => target.diverter.is_extended(),
            Self::ShooterHandoffNeedsDiverter => target.shooter == ShooterState::Handoff,
            Self::ClimberNeedsPivotRest => target.climber.is_moving(),
        }
    }

    /// Rows 2 and 3, which guard the pivot and diverter against each other.
    const fn guards_pivot_or_diverter(self) -> bool {
        matches!(
            self,
            Self::PivotAimNeedsDiverterRetracted | Self::DiverterNeedsPivotClear
        )
    }

    /// True if the sensed state, and where the guard mechanism is headed,
    /// let the guarded request through.
    fn permits(self, sensed: &SensedState, next: &RobotState) -> bool {
        let pivot_still = sensed.pivot_settled && next.pivot == sensed.pivot;
        let diverter_still = sensed.diverter_settled && next.diverter == sensed.diverter;
        match self {
            Self::FrontIntakeNeedsPivotClear => {
                matches!(sensed.pivot, PivotState::Rest | PivotState::Intake) && pivot_still
            }
            Self::PivotAimNeedsDiverterRetracted => {
                sensed.diverter == DiverterState::Retract && diverter_still
            }
            Self::DiverterNeedsPivotClear => {
                matches!(sensed.pivot, PivotState::Rest | PivotState::Handoff) && pivot_still
            }
            Self::ShooterHandoffNeedsDiverter => {
                sensed.diverter == DiverterState::Handoff && diverter_still
            }
            Self::ClimberNeedsPivotRest => sensed.pivot == PivotState::Rest && pivot_still,
        }
    }

    /// Replace the guarded field of `target` with its interim state.
    fn substitute(self, target: &mut RobotState) {
        match self {
            Self::FrontIntakeNeedsPivotClear => target.front_intake = IntakeState::Stow,
            Self::PivotAimNeedsDiverterRetracted => target.pivot = PivotState::Rest,
            Self::DiverterNeedsPivotClear => target.diverter = DiverterState::Retract,
            Self::ShooterHandoffNeedsDiverter => target.shooter = ShooterState::RampDown,
            Self::ClimberNeedsPivotRest => target.climber = ClimberState::Hold,
        }
    }
}

/// Active state of the guarding mechanisms, sampled after their update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensedState {
    pub pivot: PivotState,
    pub pivot_settled: bool,
    pub diverter: DiverterState,
    pub diverter_settled: bool,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Requests to forward, with blocked fields substituted.
    pub forwarded: RobotState,
    /// Interlocks that blocked a request, in table order.
    pub blocked: heapless::Vec<Interlock, INTERLOCK_COUNT>,
}

impl Evaluation {
    pub fn engaged(&self) -> EngagedInterlocks {
        self.blocked
            .iter()
            .fold(EngagedInterlocks::empty(), |acc, i| acc | i.flag())
    }

    /// True if any interlock guarding `mechanism` blocked its request.
    pub fn blocks(&self, mechanism: MechanismId) -> bool {
        self.blocked.iter().any(|i| i.guarded() == mechanism)
    }
}

/// Run the whole table against `target`.
///
/// A guard mechanism that is about to be sent elsewhere counts as moving,
/// so a guarded request never goes out on the same tick as the move that
/// would invalidate it.
pub fn evaluate(target: &RobotState, sensed: &SensedState) -> Evaluation {
    let mut headed = *target;
    for interlock in Interlock::ALL {
        if interlock.guards_pivot_or_diverter()
            && interlock.guards(target)
            && !interlock.permits(sensed, target)
        {
            interlock.substitute(&mut headed);
        }
    }

    let mut forwarded = *target;
    let mut blocked = heapless::Vec::new();
    for interlock in Interlock::ALL {
        let next = if interlock.guards_pivot_or_diverter() {
            target
        } else {
            &headed
        };
        if interlock.guards(target) && !interlock.permits(sensed, next) {
            interlock.substitute(&mut forwarded);
            // Capacity equals the table length.
            let _ = blocked.push(interlock);
        }
    }
    Evaluation { forwarded, blocked }
}
