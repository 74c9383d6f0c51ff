//! Unit tests for configuration validation.

use fivebar_motion::config::{validate_config, SystemConfig};
use fivebar_motion::error::{ConfigError, Error};

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[geometry]
proximal_length_mm = 100.0
distal_length_mm = 150.0
base_separation_mm = 60.0

[joints.left]
name = "shoulder_left"
encoder_ppr = 100.0
gear_ratio = 50.0
max_rpm = 6000.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "pulse_frequency" }
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test that the empty configuration (reference hardware) is valid.
#[test]
fn test_empty_config_is_valid() {
    let config = SystemConfig::default();
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a reversed workspace x-range.
#[test]
fn test_reversed_workspace_x_rejected() {
    let toml_str = r#"
[safety]
fence_min_y_mm = 10.0
workspace_x_mm = [200.0, -200.0]
workspace_y_mm = [0.0, 280.0]
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidWorkspaceBounds { min, max }))
            if min == 200.0 && max == -200.0
    ));
}

/// Test validation fails for a collapsed workspace y-range (min == max).
#[test]
fn test_collapsed_workspace_y_rejected() {
    let toml_str = r#"
[safety]
fence_min_y_mm = 100.0
workspace_x_mm = [-200.0, 200.0]
workspace_y_mm = [100.0, 100.0]
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidWorkspaceBounds { .. }))
    ));
}

/// Test validation fails for a zero base separation.
#[test]
fn test_zero_base_separation_rejected() {
    let toml_str = r#"
[geometry]
proximal_length_mm = 100.0
distal_length_mm = 150.0
base_separation_mm = 0.0
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidBaseSeparation(_)))
    ));
}

/// Test validation fails for a zero max RPM.
#[test]
fn test_zero_max_rpm_rejected() {
    let toml_str = r#"
[joints.left]
name = "stalled"
encoder_ppr = 100.0
gear_ratio = 50.0
max_rpm = 0.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "duty_cycle" }
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidMaxRpm(_)))
    ));
}

/// Test validation fails for a negative shaper velocity limit.
#[test]
fn test_negative_max_velocity_rejected() {
    let toml_str = r#"
[joints.left]
name = "backwards"
encoder_ppr = 100.0
gear_ratio = 50.0
max_rpm = 6000.0
max_velocity = -360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "duty_cycle" }
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidMaxVelocity(_)))
    ));
}

/// Test validation fails for a zero shaper acceleration limit.
#[test]
fn test_zero_max_acceleration_rejected() {
    let toml_str = r#"
[joints.left]
name = "inertia_free"
encoder_ppr = 100.0
gear_ratio = 50.0
max_rpm = 6000.0
max_velocity = 360.0
max_acceleration = 0.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "duty_cycle" }
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidMaxAcceleration(_)))
    ));
}

/// Test validation fails for zero command pulses per revolution.
#[test]
fn test_zero_pulses_per_rev_rejected() {
    let toml_str = r#"
[joints.left]
name = "pulseless"
encoder_ppr = 100.0
gear_ratio = 50.0
max_rpm = 6000.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "pulse_frequency", pulses_per_rev = 0 }
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidPulsesPerRev(0)))
    ));
}

/// Test validation fails for a zero minimum pulse frequency.
#[test]
fn test_zero_min_frequency_rejected() {
    let toml_str = r#"
[joints.left]
name = "stalling_generator"
encoder_ppr = 100.0
gear_ratio = 50.0
max_rpm = 6000.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "pulse_frequency", min_frequency_hz = 0 }
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidMinFrequency(0)))
    ));
}

/// Test validation fails for a startup target that the links can reach but
/// the workspace rectangle excludes.
#[test]
fn test_target_outside_workspace_bounds_rejected() {
    let toml_str = r#"
[safety]
fence_min_y_mm = 10.0
workspace_x_mm = [-200.0, 200.0]
workspace_y_mm = [0.0, 120.0]

[arm]
initial_target_mm = [0.0, 150.0]
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let result = validate_config(&config);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::UnreachableInitialTarget { .. }))
    ));
}
