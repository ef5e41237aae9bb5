//! Planar geometry used by the resolver, the aim planner and the drivebase.
//!
//! Field frame: origin at the blue alliance wall corner, +x toward the red
//! wall, +y to the left looking downfield, heading in degrees CCW from +x.

use serde::{Deserialize, Serialize};

use crate::consts::FIELD_LENGTH_M;

/// 2D vector [m] or [m/s] depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation2d {
    pub x: f64,
    pub y: f64,
}

impl Translation2d {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Build from magnitude and direction [rad].
    #[inline]
    pub fn from_polar(norm: f64, angle_rad: f64) -> Self {
        Self {
            x: norm * angle_rad.cos(),
            y: norm * angle_rad.sin(),
        }
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Direction [rad] in (-π, π]. Zero vector yields 0.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Rotate CCW by `angle_rad`.
    #[inline]
    pub fn rotate_by(&self, angle_rad: f64) -> Self {
        let (sin, cos) = angle_rad.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// Robot pose on the field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose2d {
    pub x: f64,
    pub y: f64,
    /// Heading [deg].
    pub heading_deg: f64,
}

impl Pose2d {
    #[inline]
    pub const fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self { x, y, heading_deg }
    }

    #[inline]
    pub const fn translation(&self) -> Translation2d {
        Translation2d::new(self.x, self.y)
    }

    /// Express this pose as if the robot were on the blue alliance.
    ///
    /// Blue poses pass through. Red poses are mirrored about the field's
    /// midline: `x' = L − x`, heading reflected about the y axis.
    pub fn to_blue_origin(&self, alliance: Alliance) -> Self {
        match alliance {
            Alliance::Blue => *self,
            Alliance::Red => Self {
                x: FIELD_LENGTH_M - self.x,
                y: self.y,
                heading_deg: normalize_degrees(180.0 - self.heading_deg),
            },
        }
    }
}

/// Chassis velocity, field-relative unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChassisSpeeds {
    /// [m/s]
    pub vx: f64,
    /// [m/s]
    pub vy: f64,
    /// [rad/s]
    pub omega: f64,
}

impl ChassisSpeeds {
    #[inline]
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }
}

/// Alliance colour reported by the driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Alliance {
    Blue = 0,
    Red = 1,
}

impl Default for Alliance {
    fn default() -> Self {
        Self::Blue
    }
}

/// Wrap an angle to [-180, 180] degrees (IEEE remainder).
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    deg - 360.0 * (deg / 360.0).round()
}

/// Wrap an angle to [-π, π] radians.
#[inline]
pub fn normalize_radians(rad: f64) -> f64 {
    use std::f64::consts::TAU;
    rad - TAU * (rad / TAU).round()
}
