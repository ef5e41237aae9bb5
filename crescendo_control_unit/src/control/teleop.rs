//! Drive teleoperation command.
//!
//! ```text
//! sticks ─► deadband ─► curve ─► slew (speed, direction, angular) ─► × multiplier
//!                                                   │
//!        wheel lock ◄─ auto heading ◄─ field ◄─ robot  (first match wins)
//! ```
//!
//! Translation is shaped in polar form: the magnitude goes through the
//! deadband, curve and speed limiter, the direction through its own
//! limiter. The speed limiter is held at zero while the stick rests in the
//! deadband. When the limited direction lags the raw one by more than the
//! reset threshold the direction limiter snaps to the raw stick. Below
//! `low_battery_voltage` the speed limiter switches to the softer
//! low-battery rate.

use crescendo_common::geometry::{Translation2d, normalize_degrees};
use crescendo_common::hal::driver::Drivebase;
use crescendo_common::hal::types::{DriveFrame, DriveRequest};
use crescendo_common::robot::config::TeleopConfig;
use crescendo_common::robot::input::DriveInputs;
use tracing::{info, warn};

use super::filters::{SlewRateLimiter, apply_curve, deadband};

pub struct TeleopDrive {
    config: TeleopConfig,
    dt_s: f64,
    speed: SlewRateLimiter,
    direction: SlewRateLimiter,
    angular: SlewRateLimiter,
    low_battery: bool,
}

impl TeleopDrive {
    /// `dt_s` is the tick period; per-second limits are scaled by it.
    pub fn new(config: &TeleopConfig, dt_s: f64) -> Self {
        Self {
            config: config.clone(),
            dt_s,
            speed: SlewRateLimiter::new(config.linear_speed_rate_limit),
            direction: SlewRateLimiter::new(config.linear_angle_rate_limit),
            angular: SlewRateLimiter::new(config.angular_rate_limit),
            low_battery: false,
        }
    }

    #[inline]
    pub const fn low_battery(&self) -> bool {
        self.low_battery
    }

    /// Pick the speed limit for the measured supply voltage. An unmeasured
    /// supply keeps the current limit.
    pub fn observe_battery(&mut self, voltage: Option<f64>) {
        let Some(volts) = voltage else {
            return;
        };
        let low = volts < self.config.low_battery_voltage;
        if low == self.low_battery {
            return;
        }
        if low {
            warn!(volts, "low battery: linear acceleration limited");
            self.speed.set_rate(self.config.low_battery_linear_speed_rate_limit);
        } else {
            info!(volts, "battery recovered: normal linear acceleration");
            self.speed.set_rate(self.config.linear_speed_rate_limit);
        }
        self.low_battery = low;
    }

    /// Shaped translation [m/s].
    pub fn shape_linear(&mut self, x: f64, y: f64) -> Translation2d {
        let raw = Translation2d::new(x, y);

        let magnitude = deadband(raw.norm(), self.config.linear_deadband);
        if magnitude == 0.0 {
            self.speed.reset(0.0);
        }
        let speed = self
            .speed
            .calculate(apply_curve(&self.config.linear_curve, magnitude), self.dt_s);

        let raw_angle = raw.angle();
        let mut angle = self.direction.calculate(raw_angle, self.dt_s);
        if (angle - raw_angle).abs() > self.config.angle_reset_threshold_rad {
            self.direction.reset(raw_angle);
            angle = raw_angle;
        }

        Translation2d::from_polar(speed * self.config.linear_multiplier, angle)
    }

    /// Shaped rotation [rad/s].
    pub fn shape_angular(&mut self, rotation: f64) -> f64 {
        let r = deadband(rotation, self.config.angular_deadband);
        let r = apply_curve(&self.config.angular_curve, r);
        self.angular.calculate(r, self.dt_s) * self.config.angular_multiplier
    }

    /// Build this tick's request.
    pub fn request(&mut self, inputs: &DriveInputs) -> DriveRequest {
        let v = self.shape_linear(inputs.x, inputs.y);
        let omega = self.shape_angular(inputs.rotation);
        let open_loop = inputs.open_loop;

        let frame = if inputs.wheel_lock && v.x == 0.0 && v.y == 0.0 && omega == 0.0 {
            DriveFrame::WheelLock
        } else if inputs.auto_heading {
            DriveFrame::FacingAngle {
                heading_deg: normalize_degrees(inputs.heading_deg),
            }
        } else if inputs.field_relative {
            DriveFrame::FieldCentric
        } else {
            DriveFrame::RobotCentric
        };

        match frame {
            DriveFrame::WheelLock => DriveRequest {
                frame,
                vx: 0.0,
                vy: 0.0,
                omega: 0.0,
                open_loop,
            },
            DriveFrame::FacingAngle { .. } => DriveRequest {
                frame,
                vx: v.x,
                vy: v.y,
                omega: 0.0,
                open_loop,
            },
            DriveFrame::FieldCentric | DriveFrame::RobotCentric => DriveRequest {
                frame,
                vx: v.x,
                vy: v.y,
                omega,
                open_loop,
            },
        }
    }

    /// Reset odometry if asked, then send exactly one request.
    pub fn execute(&mut self, inputs: &DriveInputs, drivebase: &mut dyn Drivebase) -> DriveRequest {
        self.observe_battery(drivebase.battery_voltage());
        if inputs.zero_odometry {
            info!("odometry heading zeroed");
            drivebase.reset_odometry();
        }
        let request = self.request(inputs);
        drivebase.apply(&request);
        request
    }
}
