//! Unit tests for TOML configuration parsing.

use fivebar_motion::config::{DriveConfig, ElbowMode, SystemConfig};

/// Test parsing a fully specified joint from TOML.
#[test]
fn test_parse_full_joint_table() {
    let toml_str = r#"
[joints.left]
name = "shoulder_a"
encoder_ppr = 250.0
gear_ratio = 16.0
max_rpm = 4500.0
max_velocity = 240.0
max_acceleration = 1200.0
invert_direction = true
gains = { kp = 4.5, ki = 0.08, kd = 0.02, kv = 1.0, ka = 0.05, max_output = 2200.0 }
drive = { kind = "duty_cycle" }
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let joint = &config.joints.left;

    assert_eq!(joint.name.as_str(), "shoulder_a");
    assert_eq!(joint.encoder_ppr, 250.0);
    assert_eq!(joint.gear_ratio, 16.0);
    assert_eq!(joint.max_rpm.0, 4500.0);
    assert_eq!(joint.max_velocity.0, 240.0);
    assert_eq!(joint.max_acceleration.0, 1200.0);
    assert!(joint.invert_direction);
    assert_eq!(joint.gains.ki, 0.08);
    assert_eq!(joint.gains.max_output.0, 2200.0);
    assert_eq!(joint.drive, DriveConfig::DutyCycle);
}

/// Test parsing linkage geometry with the inward elbow solution.
#[test]
fn test_parse_geometry_with_inward_elbow() {
    let toml_str = r#"
[geometry]
proximal_length_mm = 90.0
distal_length_mm = 140.0
base_separation_mm = 55.0
elbow = "inward"
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.geometry.proximal_length.0, 90.0);
    assert_eq!(config.geometry.distal_length.0, 140.0);
    assert_eq!(config.geometry.base_separation.0, 55.0);
    assert_eq!(config.geometry.elbow, ElbowMode::Inward);
}

/// Test parsing the safety section's fence and range arrays.
#[test]
fn test_parse_safety_section() {
    let toml_str = r#"
[safety]
fence_min_y_mm = 25.0
workspace_x_mm = [-150.0, 150.0]
workspace_y_mm = [20.0, 240.0]
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.safety.fence_min_y.0, 25.0);
    assert_eq!(config.safety.workspace_x[0].0, -150.0);
    assert_eq!(config.safety.workspace_x[1].0, 150.0);
    assert_eq!(config.safety.workspace_y[0].0, 20.0);
    assert_eq!(config.safety.workspace_y[1].0, 240.0);
}

/// Test parsing the arm section's startup target.
#[test]
fn test_parse_arm_section() {
    let toml_str = r#"
[arm]
initial_target_mm = [-20.0, 175.0]
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");

    assert_eq!(config.arm.initial_target[0].0, -20.0);
    assert_eq!(config.arm.initial_target[1].0, 175.0);
}

/// Test that a joint missing a required field is rejected during parsing.
#[test]
fn test_missing_encoder_ppr_rejected() {
    let toml_str = r#"
[joints.left]
name = "incomplete"
max_rpm = 6000.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "duty_cycle" }
"#;

    let result: Result<SystemConfig, _> = toml::from_str(toml_str);
    assert!(result.is_err(), "Should reject a joint without encoder_ppr");
}

/// Test that an unknown drive kind is rejected during parsing.
#[test]
fn test_unknown_drive_kind_rejected() {
    let toml_str = r#"
[joints.left]
name = "bad_drive"
encoder_ppr = 100.0
max_rpm = 6000.0
max_velocity = 360.0
max_acceleration = 1800.0
gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }
drive = { kind = "step_dir" }
"#;

    let result: Result<SystemConfig, _> = toml::from_str(toml_str);
    assert!(result.is_err(), "Should reject an unknown drive kind");
}

/// Test that a type mismatch is rejected during parsing.
#[test]
fn test_type_mismatch_rejected() {
    let toml_str = r#"
[geometry]
proximal_length_mm = "long"
distal_length_mm = 150.0
base_separation_mm = 60.0
"#;

    let result: Result<SystemConfig, _> = toml::from_str(toml_str);
    assert!(result.is_err(), "Should reject a string where a length belongs");
}
