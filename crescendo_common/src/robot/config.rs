//! Robot configuration (`robot.toml`).
//!
//! Every field has a default, so an empty file is a valid configuration.
//! `validate()` enforces bounds after loading.
//!
//! ```toml
//! tick_period_us = 10000
//!
//! [teleop]
//! linear_deadband = 0.1
//! angular_curve = { kind = "power", exponent = 2.0 }
//!
//! [shooter]
//! auto_fire = true
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::config::SharedConfig;
use crate::consts::{FIELD_LENGTH_M, TICK_PERIOD_US, TICK_PERIOD_US_MAX, TICK_PERIOD_US_MIN};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    /// Control loop period [µs] (default: 10000 = 10 ms).
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u32,

    #[serde(default)]
    pub teleop: TeleopConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub shooter: ShooterConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
    #[serde(default)]
    pub pivot: PivotConfig,
    #[serde(default)]
    pub diverter: DiverterConfig,
    #[serde(default)]
    pub climber: ClimberConfig,
    #[serde(default)]
    pub swerve: SwerveConfig,
}

fn default_tick_period_us() -> u32 {
    TICK_PERIOD_US
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            tick_period_us: default_tick_period_us(),
            teleop: TeleopConfig::default(),
            resolver: ResolverConfig::default(),
            shooter: ShooterConfig::default(),
            intake: IntakeConfig::default(),
            pivot: PivotConfig::default(),
            diverter: DiverterConfig::default(),
            climber: ClimberConfig::default(),
            swerve: SwerveConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Tick period in seconds.
    #[inline]
    pub fn tick_period_s(&self) -> f64 {
        f64::from(self.tick_period_us) * 1e-6
    }

    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_period_us < TICK_PERIOD_US_MIN || self.tick_period_us > TICK_PERIOD_US_MAX {
            return Err(format!(
                "tick_period_us {} out of range [{}, {}]",
                self.tick_period_us, TICK_PERIOD_US_MIN, TICK_PERIOD_US_MAX
            ));
        }
        self.teleop.validate()?;
        self.resolver.validate()?;
        positive("shooter.flywheel_tolerance_rps", self.shooter.flywheel_tolerance_rps)?;
        positive("intake.deploy_tolerance_deg", self.intake.deploy_tolerance_deg)?;
        self.pivot.validate()?;
        positive("diverter.tolerance_m", self.diverter.tolerance_m)?;
        positive("climber.tolerance_m", self.climber.tolerance_m)?;
        positive("climber.jog_rate_m_per_s", self.climber.jog_rate_m_per_s)?;
        positive("swerve.heading_tolerance_deg", self.swerve.heading_tolerance_deg)?;
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be positive, got {value}"))
    }
}

// ─── Teleop shaping ─────────────────────────────────────────────────

/// Stick response curve applied to the deadbanded magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResponseCurve {
    /// `f(x) = x`
    Identity,
    /// `f(x) = x^exponent`
    Power { exponent: f64 },
    /// `f(x) = w·x + (1 − w)·(e^{k·x} − 1)/(e^k − 1)`
    Expo { gain: f64, linear_weight: f64 },
}

impl ResponseCurve {
    fn validate(&self, name: &str) -> Result<(), String> {
        match *self {
            Self::Identity => Ok(()),
            Self::Power { exponent } => positive(&format!("{name}.exponent"), exponent),
            Self::Expo {
                gain,
                linear_weight,
            } => {
                positive(&format!("{name}.gain"), gain)?;
                if !(0.0..=1.0).contains(&linear_weight) {
                    return Err(format!(
                        "{name}.linear_weight {linear_weight} out of range [0, 1]"
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Drive teleoperation shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    /// Translation stick deadband in [0, 1).
    pub linear_deadband: f64,
    /// Rotation stick deadband in [0, 1).
    pub angular_deadband: f64,
    pub linear_curve: ResponseCurve,
    pub angular_curve: ResponseCurve,
    /// Shaped translation magnitude → [m/s].
    pub linear_multiplier: f64,
    /// Shaped rotation → [rad/s].
    pub angular_multiplier: f64,
    /// Linear speed slew limit [1/s].
    pub linear_speed_rate_limit: f64,
    /// Linear direction slew limit [rad/s].
    pub linear_angle_rate_limit: f64,
    /// Angular rate slew limit [1/s].
    pub angular_rate_limit: f64,
    /// Direction lag that snaps the direction limiter to the raw stick [rad].
    pub angle_reset_threshold_rad: f64,
    /// Linear speed slew limit below `low_battery_voltage` [1/s].
    pub low_battery_linear_speed_rate_limit: f64,
    /// Supply voltage under which the low-battery limit applies [V].
    pub low_battery_voltage: f64,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            linear_deadband: 0.1,
            angular_deadband: 0.13,
            linear_curve: ResponseCurve::Expo {
                gain: 4.5,
                linear_weight: 0.15,
            },
            angular_curve: ResponseCurve::Power { exponent: 2.0 },
            linear_multiplier: 7.0,
            angular_multiplier: 7.0,
            linear_speed_rate_limit: 5.0,
            linear_angle_rate_limit: 2.0,
            angular_rate_limit: 3.0,
            angle_reset_threshold_rad: FRAC_PI_2,
            low_battery_linear_speed_rate_limit: 2.0,
            low_battery_voltage: 11.0,
        }
    }
}

impl TeleopConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, d) in [
            ("teleop.linear_deadband", self.linear_deadband),
            ("teleop.angular_deadband", self.angular_deadband),
        ] {
            if !(0.0..1.0).contains(&d) {
                return Err(format!("{name} {d} out of range [0, 1)"));
            }
        }
        self.linear_curve.validate("teleop.linear_curve")?;
        self.angular_curve.validate("teleop.angular_curve")?;
        positive("teleop.linear_multiplier", self.linear_multiplier)?;
        positive("teleop.angular_multiplier", self.angular_multiplier)?;
        positive("teleop.linear_speed_rate_limit", self.linear_speed_rate_limit)?;
        positive("teleop.linear_angle_rate_limit", self.linear_angle_rate_limit)?;
        positive("teleop.angular_rate_limit", self.angular_rate_limit)?;
        positive("teleop.angle_reset_threshold_rad", self.angle_reset_threshold_rad)?;
        positive(
            "teleop.low_battery_linear_speed_rate_limit",
            self.low_battery_linear_speed_rate_limit,
        )?;
        positive("teleop.low_battery_voltage", self.low_battery_voltage)?;
        Ok(())
    }
}

// ─── Resolver ───────────────────────────────────────────────────────

/// Field thresholds for mode automation, in blue-alliance coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Start aiming below this x [m].
    pub auto_aim_x: f64,
    /// Start the amp handoff below this x [m].
    pub amp_handoff_x: f64,
    /// Align to the amp below this x [m] ...
    pub amp_align_x: f64,
    /// ... and below this y [m].
    pub amp_align_y: f64,
    /// Chassis x-velocity that switches the active intake [m/s].
    pub intake_switch_velocity: f64,
    /// Field length used for the red → blue flip [m].
    pub field_length_m: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            auto_aim_x: 5.0,
            amp_handoff_x: 5.0,
            amp_align_x: 3.0,
            amp_align_y: 3.0,
            intake_switch_velocity: 0.5,
            field_length_m: FIELD_LENGTH_M,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), String> {
        positive("resolver.intake_switch_velocity", self.intake_switch_velocity)?;
        positive("resolver.field_length_m", self.field_length_m)?;
        for (name, x) in [
            ("resolver.auto_aim_x", self.auto_aim_x),
            ("resolver.amp_handoff_x", self.amp_handoff_x),
            ("resolver.amp_align_x", self.amp_align_x),
        ] {
            if !(0.0..=self.field_length_m).contains(&x) {
                return Err(format!("{name} {x} outside the field"));
            }
        }
        Ok(())
    }
}

// ─── Mechanisms ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    /// Flywheel at-target band [rps].
    pub flywheel_tolerance_rps: f64,
    /// Fire automatically when aimed, aligned and at speed.
    pub auto_fire: bool,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            flywheel_tolerance_rps: 8.0,
            auto_fire: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Deploy arm at-target band [deg].
    pub deploy_tolerance_deg: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            deploy_tolerance_deg: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    /// At-target band [deg].
    pub tolerance_deg: f64,
    /// Commanded angles are clamped to [min_deg, max_deg].
    pub min_deg: f64,
    pub max_deg: f64,
    /// Offset rate at full manual jog [deg/s].
    pub jog_rate_deg_per_s: f64,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: 1.5,
            min_deg: 0.0,
            max_deg: 110.0,
            jog_rate_deg_per_s: 20.0,
        }
    }
}

impl PivotConfig {
    pub fn validate(&self) -> Result<(), String> {
        positive("pivot.tolerance_deg", self.tolerance_deg)?;
        positive("pivot.jog_rate_deg_per_s", self.jog_rate_deg_per_s)?;
        if self.min_deg >= self.max_deg {
            return Err(format!(
                "pivot.min_deg {} must be below pivot.max_deg {}",
                self.min_deg, self.max_deg
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiverterConfig {
    /// At-target band [m].
    pub tolerance_m: f64,
}

impl Default for DiverterConfig {
    fn default() -> Self {
        Self { tolerance_m: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimberConfig {
    /// At-target band [m].
    pub tolerance_m: f64,
    /// Offset rate at full manual jog [m/s].
    pub jog_rate_m_per_s: f64,
}

impl Default for ClimberConfig {
    fn default() -> Self {
        Self {
            tolerance_m: 0.01,
            jog_rate_m_per_s: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwerveConfig {
    /// Heading-lock at-target band [deg].
    pub heading_tolerance_deg: f64,
}

impl Default for SwerveConfig {
    fn default() -> Self {
        Self {
            heading_tolerance_deg: 3.0,
        }
    }
}
