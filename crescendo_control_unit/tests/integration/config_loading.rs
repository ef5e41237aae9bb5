//! Shipped configuration and scenario files.

use std::path::PathBuf;

use crescendo_common::config::{ConfigError, LogLevel};
use crescendo_common::robot::config::{ResponseCurve, RobotConfig};
use crescendo_control_unit::config::{load_config, load_config_from_str};
use crescendo_hal::ScriptedInputs;

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config").join(name)
}

#[test]
fn shipped_robot_toml_matches_defaults() {
    let config = load_config(&shipped("robot.toml")).unwrap();
    assert_eq!(config, RobotConfig::default());
    assert_eq!(config.shared.log_level, LogLevel::Info);
    assert_eq!(config.teleop.angular_curve, ResponseCurve::Power { exponent: 2.0 });
}

#[test]
fn shipped_scenario_parses() {
    let script = ScriptedInputs::load(&shipped("scenario.toml")).unwrap();
    assert_eq!(script.last_tick(), Some(650));
}

#[test]
fn empty_file_is_all_defaults() {
    assert_eq!(load_config_from_str("").unwrap(), RobotConfig::default());
}

#[test]
fn tick_period_out_of_range_is_rejected() {
    let err = load_config_from_str("tick_period_us = 10").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn unknown_curve_kind_is_a_parse_error() {
    let err = load_config_from_str("[teleop]\nlinear_curve = { kind = \"cubic\" }").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config = load_config_from_str("[resolver]\nauto_aim_x = 6.5").unwrap();
    assert_eq!(config.resolver.auto_aim_x, 6.5);
    assert_eq!(config.resolver.amp_handoff_x, 5.0);
    assert_eq!(config.teleop, RobotConfig::default().teleop);
}
