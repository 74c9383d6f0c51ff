//! Per-joint configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{DegreesPerSec, DegreesPerSecSquared, Rpm};

/// Identity of one of the arm's two joints.
///
/// The joint axes sit symmetrically about the workspace origin, separated
/// by the base separation along the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JointId {
    /// Joint on the -x side of the base line.
    Left,
    /// Joint on the +x side of the base line.
    Right,
}

/// PID and feedforward gains for one joint's position controller.
#[derive(Debug, Clone, Copy, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    /// Proportional gain (RPM per degree of error).
    pub kp: f32,

    /// Integral gain (RPM per degree-second of accumulated error).
    pub ki: f32,

    /// Derivative gain (RPM per degree-per-second of error rate).
    pub kd: f32,

    /// Velocity feedforward gain (unitless, nominally 1.0).
    pub kv: f32,

    /// Acceleration feedforward gain (empirical inertia compensation).
    pub ka: f32,

    /// Output ceiling in RPM; the command is clamped to +/- this value.
    pub max_output: Rpm,
}

impl PidGains {
    /// Create a new gain set.
    pub const fn new(kp: f32, ki: f32, kd: f32, kv: f32, ka: f32, max_output: Rpm) -> Self {
        Self {
            kp,
            ki,
            kd,
            kv,
            ka,
            max_output,
        }
    }
}

/// Drive strategy selection for one joint's motor.
///
/// The two supported motor families encode speed differently: one takes a
/// pulse train whose frequency is proportional to speed, the other an
/// inverted PWM duty cycle where full duty means stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriveConfig {
    /// Speed encoded as pulse frequency on a dedicated clock line.
    PulseFrequency {
        /// Command pulses per motor shaft revolution.
        #[serde(default = "default_pulses_per_rev")]
        pulses_per_rev: u32,

        /// Lowest frequency the generator is allowed to emit; commands
        /// below this are floored to keep the generator from stalling.
        #[serde(default = "default_min_frequency")]
        min_frequency_hz: u32,
    },
    /// Speed encoded as an inverted PWM duty cycle with a brake line.
    DutyCycle,
}

fn default_pulses_per_rev() -> u32 {
    400
}

fn default_min_frequency() -> u32 {
    100
}

/// Complete configuration for one joint: encoder, mechanics, gains, drive.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Encoder pulses per motor revolution before quadrature multiplication.
    pub encoder_ppr: f32,

    /// Gear ratio (output:input, e.g., 50.0 means 50:1 reduction).
    #[serde(default = "default_gear_ratio")]
    pub gear_ratio: f32,

    /// Motor's rated maximum speed.
    pub max_rpm: Rpm,

    /// Trajectory shaping velocity limit.
    pub max_velocity: DegreesPerSec,

    /// Trajectory shaping acceleration limit.
    pub max_acceleration: DegreesPerSecSquared,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Position controller gains.
    pub gains: PidGains,

    /// Drive strategy for this joint's motor.
    pub drive: DriveConfig,
}

fn default_gear_ratio() -> f32 {
    1.0
}

impl JointConfig {
    /// Encoder counts per motor shaft revolution after 4x quadrature decode.
    #[inline]
    pub fn pulses_per_motor_rev(&self) -> f32 {
        self.encoder_ppr * 4.0
    }

    /// Encoder counts per output shaft revolution.
    #[inline]
    pub fn pulses_per_output_rev(&self) -> f32 {
        self.pulses_per_motor_rev() * self.gear_ratio
    }

    /// Default left joint: the pulse-frequency driven motor.
    pub fn default_left() -> Self {
        Self {
            name: String::try_from("shoulder_left").unwrap_or_default(),
            encoder_ppr: 100.0,
            gear_ratio: 50.0,
            max_rpm: Rpm(6000.0),
            max_velocity: DegreesPerSec(360.0),
            max_acceleration: DegreesPerSecSquared(1800.0),
            invert_direction: false,
            gains: PidGains::new(5.0, 0.1, 0.0, 1.0, 0.1, Rpm(3000.0)),
            drive: DriveConfig::PulseFrequency {
                pulses_per_rev: 400,
                min_frequency_hz: 100,
            },
        }
    }

    /// Default right joint: the duty-cycle driven motor.
    pub fn default_right() -> Self {
        Self {
            name: String::try_from("shoulder_right").unwrap_or_default(),
            encoder_ppr: 100.0,
            gear_ratio: 30.0,
            max_rpm: Rpm(6300.0),
            max_velocity: DegreesPerSec(360.0),
            max_acceleration: DegreesPerSecSquared(1800.0),
            invert_direction: false,
            gains: PidGains::new(8.0, 0.2, 0.0, 1.0, 0.15, Rpm(4000.0)),
            drive: DriveConfig::DutyCycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulses_per_output_rev() {
        let config = JointConfig::default_left();
        // 100 PPR * 4 quadrature * 50:1 gear = 20000
        assert!((config.pulses_per_output_rev() - 20000.0).abs() < 0.001);
    }

    #[test]
    fn test_drive_config_from_toml() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            drive: DriveConfig,
        }

        let w: Wrapper =
            toml::from_str(r#"drive = { kind = "pulse_frequency", pulses_per_rev = 400 }"#)
                .unwrap();
        assert_eq!(
            w.drive,
            DriveConfig::PulseFrequency {
                pulses_per_rev: 400,
                min_frequency_hz: 100,
            }
        );

        let w: Wrapper = toml::from_str(r#"drive = { kind = "duty_cycle" }"#).unwrap();
        assert_eq!(w.drive, DriveConfig::DutyCycle);
    }

    #[test]
    fn test_gains_from_inline_table() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            gains: PidGains,
        }

        let w: Wrapper = toml::from_str(
            r#"gains = { kp = 5.0, ki = 0.1, kd = 0.0, kv = 1.0, ka = 0.1, max_output = 3000.0 }"#,
        )
        .unwrap();
        assert_eq!(w.gains.kp, 5.0);
        assert_eq!(w.gains.max_output.0, 3000.0);
    }
}
