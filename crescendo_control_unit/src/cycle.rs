//! Fixed-tick cycle runner.
//!
//! Owns every component and runs one tick per period:
//!
//! ```text
//! ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐  ┌─────────────┐  ┌────────┐
//! │ inputs  │─►│ planner │─►│ resolve │─►│ mechanisms │─►│ coordinator │─►│ swerve │─► drive
//! │ poll()  │  │refresh()│  │         │  │  update()  │  │  update()   │  │update()│
//! └─────────┘  └─────────┘  └─────────┘  └────────────┘  └─────────────┘  └────────┘
//! ```
//!
//! Pacing uses `clock_nanosleep(TIMER_ABSTIME)` with the `rt` feature and
//! `std::thread::sleep` otherwise. Overruns are counted and logged when
//! they start; the loop keeps running unless told to abort on overrun.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crescendo_common::config::ConfigError;
use crescendo_common::hal::driver::{
    AimPlanner, ClimberIo, DiverterIo, Drivebase, InputSource, IntakeIo, PivotIo, ShooterIo,
};
use crescendo_common::hal::types::DriveRequest;
use crescendo_common::robot::config::RobotConfig;
use crescendo_hal::SimRobot;

use crate::command::resolver::{InputResolver, Resolution};
use crate::control::teleop::TeleopDrive;
use crate::state::climber::ClimberStatemachine;
use crate::state::diverter::DiverterStatemachine;
use crate::state::intake::IntakeStatemachine;
use crate::state::machine::StateMachine;
use crate::state::pivot::PivotStatemachine;
use crate::state::robot::{Directive, ManualAdjust, Mechanisms, RobotStatemachine};
use crate::state::shooter::ShooterStatemachine;
use crate::state::swerve::SwerveStatemachine;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Tick timing statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStats {
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: i64,
    /// `i64::MAX` until the first tick.
    pub min_cycle_ns: i64,
    pub max_cycle_ns: i64,
    pub sum_cycle_ns: i64,
    pub overruns: u64,
    /// Worst wake-up latency [ns] (RT loop only).
    pub max_latency_ns: i64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record one tick. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average tick duration [ns], 0 before the first tick.
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("RT setup failed: {0}")]
    RtSetup(String),

    #[error("cycle overrun: {actual_ns} ns > {budget_ns} ns budget")]
    Overrun { actual_ns: i64, budget_ns: i64 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock current and future pages. No-op without the `rt` feature.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 1 MB of stack so the loop never faults it in.
fn prefault_stack() {
    let mut buf = [0u8; 1024 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Lock memory, prefault the stack, pin to `cpu_core`, switch to
/// `SCHED_FIFO`. Call once before `run`. Only the prefault runs without
/// the `rt` feature.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    info!(cpu_core, rt_priority, rt = cfg!(feature = "rt"), "RT setup complete");
    Ok(())
}

// ─── Hardware ───────────────────────────────────────────────────────

/// Every IO handle, the drivebase, the planner and the input source.
pub struct Hardware {
    pub inputs: Box<dyn InputSource>,
    pub drivebase: Box<dyn Drivebase>,
    pub planner: Rc<dyn AimPlanner>,
    pub shooter: Box<ShooterIo>,
    pub front_intake: Box<IntakeIo>,
    pub back_intake: Box<IntakeIo>,
    pub pivot: Box<PivotIo>,
    pub diverter: Box<DiverterIo>,
    pub climber: Box<ClimberIo>,
}

impl Hardware {
    /// Handles onto a simulated robot. `sim` keeps its own clones.
    pub fn simulated(sim: &SimRobot, inputs: Box<dyn InputSource>) -> Self {
        let planner: Rc<dyn AimPlanner> = sim.planner.clone();
        Self {
            inputs,
            drivebase: Box::new(sim.drivebase.clone()),
            planner,
            shooter: Box::new(sim.shooter.clone()),
            front_intake: Box::new(sim.front_intake.clone()),
            back_intake: Box::new(sim.back_intake.clone()),
            pivot: Box::new(sim.pivot.clone()),
            diverter: Box::new(sim.diverter.clone()),
            climber: Box::new(sim.climber.clone()),
        }
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

pub struct CycleRunner {
    inputs: Box<dyn InputSource>,
    drivebase: Box<dyn Drivebase>,
    planner: Rc<dyn AimPlanner>,

    resolver: InputResolver,
    mechanisms: Mechanisms,
    coordinator: RobotStatemachine,
    swerve: SwerveStatemachine,
    teleop: TeleopDrive,

    resolution: Resolution,
    last_request: Option<DriveRequest>,

    /// Full-jog offset steps per tick.
    pivot_jog_step_deg: f64,
    climber_jog_step_m: f64,

    cycle_time_ns: i64,
    max_ticks: Option<u64>,
    abort_on_overrun: bool,
    in_overrun: bool,
    stats: CycleStats,
}

impl CycleRunner {
    /// Wire every component from a validated configuration.
    pub fn new(config: &RobotConfig, hw: Hardware) -> Self {
        let planner = hw.planner;
        let mechanisms = Mechanisms {
            shooter: ShooterStatemachine::new(hw.shooter, Rc::clone(&planner), &config.shooter),
            front_intake: IntakeStatemachine::new("front_intake", hw.front_intake, &config.intake),
            back_intake: IntakeStatemachine::new("back_intake", hw.back_intake, &config.intake),
            pivot: PivotStatemachine::new(hw.pivot, Rc::clone(&planner), &config.pivot),
            diverter: DiverterStatemachine::new(hw.diverter, &config.diverter),
            climber: ClimberStatemachine::new(hw.climber, &config.climber),
        };

        Self {
            inputs: hw.inputs,
            drivebase: hw.drivebase,
            swerve: SwerveStatemachine::new(Rc::clone(&planner), &config.swerve),
            planner,
            resolver: InputResolver::new(&config.resolver),
            mechanisms,
            coordinator: RobotStatemachine::new(),
            teleop: TeleopDrive::new(&config.teleop, config.tick_period_s()),
            resolution: Resolution::default(),
            last_request: None,
            pivot_jog_step_deg: config.pivot.jog_rate_deg_per_s * config.tick_period_s(),
            climber_jog_step_m: config.climber.jog_rate_m_per_s * config.tick_period_s(),
            cycle_time_ns: i64::from(config.tick_period_us) * 1_000,
            max_ticks: None,
            abort_on_overrun: false,
            in_overrun: false,
            stats: CycleStats::new(),
        }
    }

    /// Stop `run` after this many ticks.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Make `run` return `CycleError::Overrun` on the first late tick.
    pub fn with_abort_on_overrun(mut self, abort: bool) -> Self {
        self.abort_on_overrun = abort;
        self
    }

    // ── Accessors ──

    #[inline]
    pub const fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub const fn ticks(&self) -> u64 {
        self.stats.cycle_count
    }

    #[inline]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub const fn last_request(&self) -> Option<DriveRequest> {
        self.last_request
    }

    #[inline]
    pub const fn mechanisms(&self) -> &Mechanisms {
        &self.mechanisms
    }

    #[inline]
    pub const fn coordinator(&self) -> &RobotStatemachine {
        &self.coordinator
    }

    #[inline]
    pub const fn swerve(&self) -> &SwerveStatemachine {
        &self.swerve
    }

    #[inline]
    pub const fn cycle_time_ns(&self) -> i64 {
        self.cycle_time_ns
    }

    /// One tick in fixed order. Never fails.
    pub fn tick(&mut self) {
        let inputs = self.inputs.poll();
        let pose = self.drivebase.pose();
        let speeds = self.drivebase.chassis_speeds();

        self.planner.refresh(&pose);

        let res = self.resolver.resolve(&inputs, &pose, &speeds);
        if res.mode != self.resolution.mode {
            info!(from = ?self.resolution.mode, to = ?res.mode, "teleop mode change");
        }

        // Alignment from the previous tick's swerve update.
        self.mechanisms.shooter.set_aligned(self.swerve.aligned());
        self.mechanisms.update();
        self.coordinator.update(
            &mut self.mechanisms,
            &Directive {
                teleop: res.teleop,
                intake_side: res.intake_side,
                eject: inputs.eject,
                manual_trigger: inputs.force_trigger,
                manual: ManualAdjust {
                    trigger_effort: inputs.jog_trigger.clamp(-1.0, 1.0),
                    pivot_deg: inputs.jog_pivot.clamp(-1.0, 1.0) * self.pivot_jog_step_deg,
                    climber_m: inputs.jog_climber.clamp(-1.0, 1.0) * self.climber_jog_step_m,
                    reset: inputs.reset_manual_inputs,
                },
            },
        );

        self.swerve.observe(&inputs, pose);
        self.swerve.request_state(res.swerve);
        self.swerve.update();

        let request = self
            .teleop
            .execute(&self.swerve.drive_inputs(), self.drivebase.as_mut());

        trace!(
            teleop = ?res.teleop,
            swerve = ?res.swerve,
            robot = ?self.mechanisms.state(),
            frame = ?request.frame,
            "tick"
        );
        self.resolution = res;
        self.last_request = Some(request);
    }

    /// Run until `stop` is set or `max_ticks` is reached.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), CycleError> {
        info!(
            period_us = self.cycle_time_ns / 1_000,
            max_ticks = ?self.max_ticks,
            "cycle loop starting"
        );

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop(stop);
        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop(stop);

        info!(
            ticks = self.stats.cycle_count,
            overruns = self.stats.overruns,
            "cycle loop stopped"
        );
        result
    }

    fn done(&self, stop: &AtomicBool) -> bool {
        stop.load(Ordering::Relaxed) || self.max_ticks.is_some_and(|max| self.stats.cycle_count >= max)
    }

    /// Count and log an overrun on its leading edge.
    fn check_overrun(&mut self, duration_ns: i64) -> Result<(), CycleError> {
        let late = duration_ns > self.cycle_time_ns;
        if late {
            self.stats.overruns += 1;
            if !self.in_overrun {
                warn!(
                    actual_ns = duration_ns,
                    budget_ns = self.cycle_time_ns,
                    tick = self.stats.cycle_count,
                    "cycle overrun"
                );
            }
            if self.abort_on_overrun {
                return Err(CycleError::Overrun {
                    actual_ns: duration_ns,
                    budget_ns: self.cycle_time_ns,
                });
            }
        } else if self.in_overrun {
            debug!(tick = self.stats.cycle_count, "cycle back within budget");
        }
        self.in_overrun = late;
        Ok(())
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, stop: &AtomicBool) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || {
            clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))
        };
        let mut next_wake = now()?;

        while !self.done(stop) {
            let cycle_start = now()?;
            let wake_latency_ns = timespec_diff_ns(&cycle_start, &next_wake).abs();
            next_wake = timespec_add_ns(next_wake, self.cycle_time_ns);

            self.tick();

            let duration_ns = timespec_diff_ns(&now()?, &cycle_start);
            self.stats.record(duration_ns, wake_latency_ns);
            self.check_overrun(duration_ns)?;

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, stop: &AtomicBool) -> Result<(), CycleError> {
        use std::time::{Duration, Instant};

        let period = Duration::from_nanos(self.cycle_time_ns as u64);

        while !self.done(stop) {
            let cycle_start = Instant::now();

            self.tick();

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, 0);
            self.check_overrun(duration_ns)?;

            if let Some(remaining) = period.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let total = ts.tv_nsec() + ns;
    let secs = ts.tv_sec() + total.div_euclid(1_000_000_000);
    let nanos = total.rem_euclid(1_000_000_000);
    TimeSpec::new(secs, nanos)
}

/// `a - b` [ns].
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
