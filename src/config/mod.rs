//! Configuration module for fivebar-motion.
//!
//! Provides types for loading and validating the arm's geometry, safety,
//! and per-joint configurations from TOML files (with `std` feature) or
//! pre-parsed data.

mod geometry;
mod joint;
#[cfg(feature = "std")]
mod loader;
mod safety;
mod system;
pub mod units;
mod validation;

pub use geometry::{ElbowMode, LinkageGeometry};
pub use joint::{DriveConfig, JointConfig, JointId, PidGains};
pub use safety::SafetyConfig;
pub use system::{ArmConfig, JointsConfig, SystemConfig};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, DegreesPerSec, DegreesPerSecSquared, Millimeters, Rpm};
