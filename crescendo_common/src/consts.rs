//! System-wide constants for the Crescendo workspace.
//!
//! Single source of truth for tick timing bounds and field geometry.

/// Default tick period in microseconds (100 Hz).
pub const TICK_PERIOD_US: u32 = 10_000;

/// Shortest accepted tick period [µs].
pub const TICK_PERIOD_US_MIN: u32 = 1_000;

/// Longest accepted tick period [µs].
pub const TICK_PERIOD_US_MAX: u32 = 100_000;

/// Field length along the alliance axis [m].
pub const FIELD_LENGTH_M: f64 = 16.54;

/// Field width [m].
pub const FIELD_WIDTH_M: f64 = 8.21;

/// Number of mechanisms owned by the robot coordinator.
pub const MECHANISM_COUNT: usize = 7;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/robot.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(TICK_PERIOD_US_MIN <= TICK_PERIOD_US);
        assert!(TICK_PERIOD_US <= TICK_PERIOD_US_MAX);
        assert!(FIELD_LENGTH_M > FIELD_WIDTH_M);
        assert!(MECHANISM_COUNT > 0);
    }
}
