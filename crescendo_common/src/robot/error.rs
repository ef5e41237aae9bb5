//! Readiness flags reported by every mechanism machine.
//!
//! Nothing in the tick path fails. A mechanism that cannot follow its
//! target sets one of these flags and reports `transitioning() == true`.

use bitflags::bitflags;

bitflags! {
    /// Why a mechanism is not settled at its target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ReadinessFlags: u8 {
        /// Feedback is outside the state's tolerance band.
        const OUT_OF_TOLERANCE    = 0x01;
        /// `read()` returned no feedback this tick.
        const STALE_FEEDBACK      = 0x02;
        /// Dynamic setpoint requested but the planner has no target.
        const PLANNER_UNAVAILABLE = 0x04;
        /// The coordinator substituted an interim state.
        const INTERLOCKED         = 0x08;
    }
}

impl ReadinessFlags {
    /// Flags caused by missing data rather than motion in progress.
    pub const DEGRADED_MASK: Self = Self::from_bits_truncate(
        Self::STALE_FEEDBACK.bits() | Self::PLANNER_UNAVAILABLE.bits(),
    );

    /// Returns true if any degraded-data flag is set.
    #[inline]
    pub const fn is_degraded(&self) -> bool {
        self.intersects(Self::DEGRADED_MASK)
    }
}

impl Default for ReadinessFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ready() {
        assert!(ReadinessFlags::default().is_empty());
    }

    #[test]
    fn degraded_mask() {
        assert!(ReadinessFlags::STALE_FEEDBACK.is_degraded());
        assert!(ReadinessFlags::PLANNER_UNAVAILABLE.is_degraded());
        assert!(!ReadinessFlags::OUT_OF_TOLERANCE.is_degraded());
        assert!(!(ReadinessFlags::INTERLOCKED | ReadinessFlags::OUT_OF_TOLERANCE).is_degraded());
    }
}
