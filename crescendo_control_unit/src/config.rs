//! TOML configuration loader with validation.
//!
//! Loads `RobotConfig` from one file (or string), then validates the shared
//! section and every parameter bound.

use std::path::Path;

use crescendo_common::config::{ConfigError, ConfigLoader};
use crescendo_common::robot::config::RobotConfig;
use tracing::debug;

/// Load and validate `robot.toml`.
pub fn load_config(path: &Path) -> Result<RobotConfig, ConfigError> {
    let config = RobotConfig::load(path)?;
    validate(&config)?;
    debug!(path = %path.display(), tick_period_us = config.tick_period_us, "configuration loaded");
    Ok(config)
}

/// Parse and validate TOML text.
pub fn load_config_from_str(content: &str) -> Result<RobotConfig, ConfigError> {
    let config = RobotConfig::parse(content)?;
    validate(&config)?;
    Ok(config)
}

/// Shared-section and parameter-bound checks.
pub fn validate(config: &RobotConfig) -> Result<(), ConfigError> {
    config.shared.validate()?;
    config.validate().map_err(ConfigError::ValidationError)
}
