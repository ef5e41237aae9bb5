//! Simulated holonomic drivebase.
//!
//! Integrates the requested chassis velocity directly into the pose.
//! `FacingAngle` turns toward the requested heading at the rotation
//! limit; `WheelLock` stops the robot.

use tracing::debug;

use crescendo_common::geometry::{ChassisSpeeds, Pose2d, Translation2d, normalize_degrees};
use crescendo_common::hal::driver::Drivebase;
use crescendo_common::hal::types::{DriveFrame, DriveRequest};

/// Maximum simulated rotation rate [deg/s].
const MAX_TURN_DEG_PER_S: f64 = 360.0;
/// Resting voltage of a charged battery [V].
const NOMINAL_BATTERY_V: f64 = 12.5;

/// Kinematic drivebase model.
#[derive(Debug, Clone)]
pub struct SimDrivebase {
    /// Fused pose.
    pub pose: Pose2d,
    /// Robot-relative velocity applied last tick.
    pub speeds: ChassisSpeeds,
    /// Most recent request.
    pub last_request: Option<DriveRequest>,
    /// Number of `apply` calls.
    pub requests: u64,
    /// Reported supply voltage [V].
    pub battery_voltage: f64,
    dt_s: f64,
}

impl SimDrivebase {
    /// Robot at the field origin facing +x.
    pub fn new(dt_s: f64) -> Self {
        Self {
            pose: Pose2d::default(),
            speeds: ChassisSpeeds::default(),
            last_request: None,
            requests: 0,
            battery_voltage: NOMINAL_BATTERY_V,
            dt_s,
        }
    }

    /// Robot placed at `pose`.
    pub fn at(pose: Pose2d, dt_s: f64) -> Self {
        Self {
            pose,
            ..Self::new(dt_s)
        }
    }

    fn robot_to_field(&self, vx: f64, vy: f64) -> Translation2d {
        Translation2d::new(vx, vy).rotate_by(self.pose.heading_deg.to_radians())
    }
}

impl Drivebase for SimDrivebase {
    fn apply(&mut self, request: &DriveRequest) {
        let dt = self.dt_s;
        let (v, omega_deg) = match request.frame {
            DriveFrame::WheelLock => (Translation2d::default(), 0.0),
            DriveFrame::FieldCentric => (
                Translation2d::new(request.vx, request.vy),
                request.omega.to_degrees(),
            ),
            DriveFrame::RobotCentric => (
                self.robot_to_field(request.vx, request.vy),
                request.omega.to_degrees(),
            ),
            DriveFrame::FacingAngle { heading_deg } => {
                let error = normalize_degrees(heading_deg - self.pose.heading_deg);
                let max = MAX_TURN_DEG_PER_S * dt;
                (
                    Translation2d::new(request.vx, request.vy),
                    error.clamp(-max, max) / dt,
                )
            }
        };

        // Kinematics report in the chassis frame of the heading the step began with.
        let chassis = v.rotate_by(-self.pose.heading_deg.to_radians());
        self.pose.x += v.x * dt;
        self.pose.y += v.y * dt;
        self.pose.heading_deg = normalize_degrees(self.pose.heading_deg + omega_deg * dt);
        self.speeds = ChassisSpeeds::new(chassis.x, chassis.y, omega_deg.to_radians());
        self.last_request = Some(*request);
        self.requests += 1;
    }

    fn reset_odometry(&mut self) {
        debug!(heading = self.pose.heading_deg, "sim drivebase: odometry heading zeroed");
        self.pose.heading_deg = 0.0;
    }

    fn pose(&self) -> Pose2d {
        self.pose
    }

    fn chassis_speeds(&self) -> ChassisSpeeds {
        self.speeds
    }

    fn battery_voltage(&self) -> Option<f64> {
        Some(self.battery_voltage)
    }
}
