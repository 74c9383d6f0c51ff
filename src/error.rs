//! Error types for fivebar-motion library.
//!
//! Provides unified error handling across configuration, kinematics, motor
//! control, and characterization.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all fivebar-motion operations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Kinematics solution error
    Kinematics(KinematicsError),
    /// Motor drive error
    Motor(MotorError),
    /// Characterization / tuning error
    Tuning(TuningError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid link length (must be > 0)
    InvalidLinkLength(f32),
    /// Invalid base separation (must be > 0)
    InvalidBaseSeparation(f32),
    /// Invalid encoder pulses-per-revolution (must be > 0)
    InvalidEncoderPpr(f32),
    /// Invalid gear ratio (must be > 0)
    InvalidGearRatio(f32),
    /// Invalid maximum motor speed (must be > 0)
    InvalidMaxRpm(f32),
    /// Controller output ceiling out of range (must be > 0 and <= max RPM)
    InvalidMaxOutput {
        /// Configured output ceiling in RPM
        output: f32,
        /// Motor's maximum RPM
        max_rpm: f32,
    },
    /// Invalid max velocity (must be > 0)
    InvalidMaxVelocity(f32),
    /// Invalid max acceleration (must be > 0)
    InvalidMaxAcceleration(f32),
    /// Invalid workspace bounds (min must be < max)
    InvalidWorkspaceBounds {
        /// Minimum bound value
        min: f32,
        /// Maximum bound value
        max: f32,
    },
    /// Safety fence lies outside the workspace y-range
    FenceOutsideWorkspace {
        /// Configured fence height
        fence: f32,
        /// Workspace minimum y
        min: f32,
        /// Workspace maximum y
        max: f32,
    },
    /// Invalid command pulses per motor revolution (must be > 0)
    InvalidPulsesPerRev(u32),
    /// Invalid minimum pulse frequency (must be > 0)
    InvalidMinFrequency(u32),
    /// Initial Cartesian target is outside the reachable workspace
    UnreachableInitialTarget {
        /// Target x in millimeters
        x: f32,
        /// Target y in millimeters
        y: f32,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Kinematics solution errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KinematicsError {
    /// Inverse kinematics has no solution: the target lies outside the
    /// annular region reachable by at least one joint.
    Unreachable {
        /// Target x in millimeters
        x: f32,
        /// Target y in millimeters
        y: f32,
    },
    /// Forward kinematics has no real solution: the distal circles around
    /// the two elbows do not intersect.
    Degenerate {
        /// Distance between the elbow centers in millimeters
        separation: f32,
    },
}

/// Motor drive errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Direction or enable line operation failed
    PinError,
    /// PWM or pulse-generator output operation failed
    OutputError,
}

/// Characterization and tuning errors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningError {
    /// Too few samples recorded to evaluate metrics (need at least 10)
    InsufficientSamples {
        /// Number of samples actually recorded
        got: usize,
    },
    /// Gain sweep range is unusable (needs at least 2 steps and start < end)
    InvalidSweepRange {
        /// Sweep start gain
        start: f32,
        /// Sweep end gain
        end: f32,
        /// Requested number of candidates
        steps: usize,
    },
    /// Gain sweep completed without finding a stable candidate
    NoStableCandidate,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Kinematics(e) => write!(f, "Kinematics error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Tuning(e) => write!(f, "Tuning error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidLinkLength(v) => {
                write!(f, "Invalid link length: {}. Must be > 0", v)
            }
            ConfigError::InvalidBaseSeparation(v) => {
                write!(f, "Invalid base separation: {}. Must be > 0", v)
            }
            ConfigError::InvalidEncoderPpr(v) => {
                write!(f, "Invalid encoder PPR: {}. Must be > 0", v)
            }
            ConfigError::InvalidGearRatio(v) => write!(f, "Invalid gear ratio: {}. Must be > 0", v),
            ConfigError::InvalidMaxRpm(v) => write!(f, "Invalid max RPM: {}. Must be > 0", v),
            ConfigError::InvalidMaxOutput { output, max_rpm } => {
                write!(f, "Invalid output ceiling: {}. Must be > 0 and <= max RPM ({})", output, max_rpm)
            }
            ConfigError::InvalidMaxVelocity(v) => write!(f, "Invalid max velocity: {}. Must be > 0", v),
            ConfigError::InvalidMaxAcceleration(v) => write!(f, "Invalid max acceleration: {}. Must be > 0", v),
            ConfigError::InvalidWorkspaceBounds { min, max } => {
                write!(f, "Invalid workspace bounds: min ({}) must be < max ({})", min, max)
            }
            ConfigError::FenceOutsideWorkspace { fence, min, max } => {
                write!(f, "Fence height {} outside workspace y-range [{}, {}]", fence, min, max)
            }
            ConfigError::InvalidPulsesPerRev(v) => {
                write!(f, "Invalid pulses per revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidMinFrequency(v) => {
                write!(f, "Invalid minimum pulse frequency: {}. Must be > 0", v)
            }
            ConfigError::UnreachableInitialTarget { x, y } => {
                write!(f, "Initial target ({}, {}) is outside the workspace", x, y)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::Unreachable { x, y } => {
                write!(f, "Target ({}, {}) is unreachable", x, y)
            }
            KinematicsError::Degenerate { separation } => {
                write!(f, "Degenerate pose: elbow separation {} has no intersection", separation)
            }
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::OutputError => write!(f, "Speed output operation failed"),
        }
    }
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::InsufficientSamples { got } => {
                write!(f, "Insufficient samples for evaluation: got {}, need 10", got)
            }
            TuningError::InvalidSweepRange { start, end, steps } => {
                write!(f, "Invalid sweep range [{}, {}] with {} steps", start, end, steps)
            }
            TuningError::NoStableCandidate => write!(f, "No stable gain candidate found"),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<KinematicsError> for Error {
    fn from(e: KinematicsError) -> Self {
        Error::Kinematics(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<TuningError> for Error {
    fn from(e: TuningError) -> Self {
        Error::Tuning(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for KinematicsError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for TuningError {}
