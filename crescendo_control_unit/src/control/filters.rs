//! Stick conditioning filters.
//!
//! Deadband with slope correction, response curves and a slew-rate limiter.
//! Processing order: deadband → curve → slew limit.

use crescendo_common::robot::config::ResponseCurve;

// ─── Deadband ───────────────────────────────────────────────────────

/// Deadband that keeps full scale at full input.
///
/// ```text
/// |v| < d  →  0
/// else     →  (v − d·sign(v)) / (1 − d)
/// ```
///
/// `|v| == d` maps to exactly 0, `v == 1` to exactly 1.
#[inline]
pub fn deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() < deadband {
        return 0.0;
    }
    (value - deadband * value.signum()) / (1.0 - deadband)
}

// ─── Response curves ────────────────────────────────────────────────

/// Apply `curve` to `value`, preserving sign. Output magnitude is clamped to 1.
#[inline]
pub fn apply_curve(curve: &ResponseCurve, value: f64) -> f64 {
    let x = value.abs().min(1.0);
    let y = match *curve {
        ResponseCurve::Identity => x,
        ResponseCurve::Power { exponent } => x.powf(exponent),
        ResponseCurve::Expo {
            gain,
            linear_weight,
        } => {
            let expo = (gain * x).exp_m1() / gain.exp_m1();
            linear_weight * x + (1.0 - linear_weight) * expo
        }
    };
    y.clamp(0.0, 1.0).copysign(value)
}

// ─── Slew-rate limiter ──────────────────────────────────────────────

/// First-order rate limiter: the output moves toward the input by at most
/// `rate · dt` per call.
#[derive(Debug, Clone, Copy)]
pub struct SlewRateLimiter {
    /// Units per second.
    rate: f64,
    prev: f64,
}

impl SlewRateLimiter {
    pub const fn new(rate: f64) -> Self {
        Self { rate, prev: 0.0 }
    }

    /// Step toward `input`.
    #[inline]
    pub fn calculate(&mut self, input: f64, dt: f64) -> f64 {
        let max_step = self.rate * dt;
        self.prev += (input - self.prev).clamp(-max_step, max_step);
        self.prev
    }

    /// Change the limit; the current output is kept.
    #[inline]
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Jump to `value`.
    #[inline]
    pub fn reset(&mut self, value: f64) {
        self.prev = value;
    }

    #[inline]
    pub const fn last(&self) -> f64 {
        self.prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn deadband_edges() {
        for d in [0.0, 0.1, 0.13, 0.5, 0.99] {
            assert_eq!(deadband(d, d), 0.0, "d = {d}");
            assert!((deadband(1.0, d) - 1.0).abs() < EPS, "d = {d}");
            assert!((deadband(-1.0, d) + 1.0).abs() < EPS, "d = {d}");
        }
        assert_eq!(deadband(0.05, 0.1), 0.0);
        assert!((deadband(0.55, 0.1) - 0.5).abs() < EPS);
    }

    #[test]
    fn curves_keep_sign_and_endpoints() {
        let curves = [
            ResponseCurve::Identity,
            ResponseCurve::Power { exponent: 2.0 },
            ResponseCurve::Expo {
                gain: 4.5,
                linear_weight: 0.15,
            },
        ];
        for c in &curves {
            assert_eq!(apply_curve(c, 0.0), 0.0);
            assert!((apply_curve(c, 1.0) - 1.0).abs() < EPS);
            assert!((apply_curve(c, -1.0) + 1.0).abs() < EPS);
            assert!(apply_curve(c, -0.5) < 0.0);
        }
        assert!((apply_curve(&ResponseCurve::Power { exponent: 2.0 }, -0.5) + 0.25).abs() < EPS);
    }

    #[test]
    fn curve_clamps_overrange() {
        assert_eq!(apply_curve(&ResponseCurve::Identity, 1.7), 1.0);
        assert_eq!(apply_curve(&ResponseCurve::Power { exponent: 3.0 }, -2.0), -1.0);
    }

    #[test]
    fn expo_is_softer_near_zero() {
        let expo = ResponseCurve::Expo {
            gain: 4.5,
            linear_weight: 0.15,
        };
        assert!(apply_curve(&expo, 0.3) < 0.3);
    }

    #[test]
    fn slew_limits_step() {
        let mut l = SlewRateLimiter::new(5.0);
        assert!((l.calculate(1.0, 0.02) - 0.1).abs() < EPS);
        assert!((l.calculate(1.0, 0.02) - 0.2).abs() < EPS);
        assert!((l.calculate(-1.0, 0.02) - 0.1).abs() < EPS);
        l.reset(0.0);
        assert_eq!(l.last(), 0.0);
    }

    #[test]
    fn new_rate_applies_from_current_output() {
        let mut l = SlewRateLimiter::new(5.0);
        l.calculate(1.0, 0.02);
        l.set_rate(2.0);
        assert!((l.calculate(1.0, 0.02) - 0.14).abs() < EPS);
    }

    #[test]
    fn slew_does_not_overshoot() {
        let mut l = SlewRateLimiter::new(100.0);
        assert_eq!(l.calculate(0.3, 0.02), 0.3);
    }
}
