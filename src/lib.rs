//! # fivebar-motion
//!
//! Configuration-driven motion control core for a two-joint five-bar
//! linkage arm with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Configuration-driven**: Geometry, safety fence, and per-joint tuning
//!   in TOML files
//! - **embedded-hal 1.0**: `OutputPin`/`SetDutyCycle` drives, `DelayNs`
//!   characterization timing
//! - **no_std compatible**: Core library works without standard library
//! - **Closed-loop Cartesian tracking**: Inverse kinematics, trajectory
//!   shaping, and PID with feedforward per joint
//! - **Safety fence**: Forward kinematics on the measured pose latches a
//!   stop below the configured height
//! - **Characterization**: Step/sine response capture, scoring, and gain
//!   sweeps against the live joint
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fivebar_motion::{ControlLoop, Millimeters};
//!
//! // Load configuration from TOML
//! let config = fivebar_motion::load_config("arm.toml")?;
//!
//! // Assemble the loop over the board's counters and drives
//! let mut arm = ControlLoop::new(&config, lc, ld, rc, rd)?;
//!
//! // Track a pen position; call tick() at the control rate
//! arm.set_target_position(Millimeters(0.0), Millimeters(150.0))?;
//! loop {
//!     arm.tick(0.001)?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod arm;
pub mod config;
pub mod control;
pub mod encoder;
pub mod error;
pub mod kinematics;
pub mod motor;
pub mod tuning;

// Re-exports for ergonomic API
pub use arm::{ArmState, ArmStatus, ControlLoop, JointStatus, TestHandle};
pub use config::{validate_config, ElbowMode, JointConfig, JointId, SystemConfig};
pub use error::{Error, Result};
pub use kinematics::{CartesianPoint, JointAngles, LinkageSolver};
pub use motor::{Direction, MotorChannel, MotorDrive};
pub use tuning::{CharacterizationHarness, PerformanceMetrics};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{Degrees, DegreesPerSec, DegreesPerSecSquared, Millimeters, Rpm};
