//! Configuration validation.
//!
//! Misconfiguration that would corrupt runtime math (zero PPR, zero gear
//! ratio, degenerate link lengths) is rejected here, at startup, so the
//! runtime guards never have to fire.

use crate::error::{ConfigError, Error, Result};
use crate::kinematics::{CartesianPoint, LinkageSolver};

use super::{JointConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Link lengths and base separation are positive
/// - Encoder PPR, gear ratio, and max RPM are positive for each joint
/// - Controller output ceiling is positive and within the motor's max RPM
/// - Shaper velocity/acceleration limits are positive
/// - Drive parameters are usable (pulse counts, minimum frequency)
/// - Workspace ranges are ordered and contain the fence and initial target
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    validate_geometry(config)?;
    validate_joint(&config.joints.left)?;
    validate_joint(&config.joints.right)?;
    validate_safety(config)?;
    validate_initial_target(config)?;
    Ok(())
}

fn validate_geometry(config: &SystemConfig) -> Result<()> {
    let geo = &config.geometry;

    if geo.proximal_length.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidLinkLength(
            geo.proximal_length.0,
        )));
    }

    if geo.distal_length.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidLinkLength(
            geo.distal_length.0,
        )));
    }

    if geo.base_separation.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidBaseSeparation(
            geo.base_separation.0,
        )));
    }

    Ok(())
}

fn validate_joint(config: &JointConfig) -> Result<()> {
    if config.encoder_ppr <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidEncoderPpr(
            config.encoder_ppr,
        )));
    }

    if config.gear_ratio <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidGearRatio(
            config.gear_ratio,
        )));
    }

    if config.max_rpm.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxRpm(config.max_rpm.0)));
    }

    let max_output = config.gains.max_output.0;
    if max_output <= 0.0 || max_output > config.max_rpm.0 {
        return Err(Error::Config(ConfigError::InvalidMaxOutput {
            output: max_output,
            max_rpm: config.max_rpm.0,
        }));
    }

    if config.max_velocity.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxVelocity(
            config.max_velocity.0,
        )));
    }

    if config.max_acceleration.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMaxAcceleration(
            config.max_acceleration.0,
        )));
    }

    if let super::DriveConfig::PulseFrequency {
        pulses_per_rev,
        min_frequency_hz,
    } = config.drive
    {
        if pulses_per_rev == 0 {
            return Err(Error::Config(ConfigError::InvalidPulsesPerRev(
                pulses_per_rev,
            )));
        }
        if min_frequency_hz == 0 {
            return Err(Error::Config(ConfigError::InvalidMinFrequency(
                min_frequency_hz,
            )));
        }
    }

    Ok(())
}

fn validate_safety(config: &SystemConfig) -> Result<()> {
    let safety = &config.safety;

    if safety.workspace_x[0].0 >= safety.workspace_x[1].0 {
        return Err(Error::Config(ConfigError::InvalidWorkspaceBounds {
            min: safety.workspace_x[0].0,
            max: safety.workspace_x[1].0,
        }));
    }

    if safety.workspace_y[0].0 >= safety.workspace_y[1].0 {
        return Err(Error::Config(ConfigError::InvalidWorkspaceBounds {
            min: safety.workspace_y[0].0,
            max: safety.workspace_y[1].0,
        }));
    }

    let fence = safety.fence_min_y.0;
    if fence < safety.workspace_y[0].0 || fence > safety.workspace_y[1].0 {
        return Err(Error::Config(ConfigError::FenceOutsideWorkspace {
            fence,
            min: safety.workspace_y[0].0,
            max: safety.workspace_y[1].0,
        }));
    }

    Ok(())
}

fn validate_initial_target(config: &SystemConfig) -> Result<()> {
    let solver = LinkageSolver::new(config.geometry);
    let [x, y] = config.arm.initial_target;
    let target = CartesianPoint::new(x.0, y.0);

    if !solver.is_in_workspace(target, &config.safety) {
        return Err(Error::Config(ConfigError::UnreachableInitialTarget {
            x: x.0,
            y: y.0,
        }));
    }

    Ok(())
}
