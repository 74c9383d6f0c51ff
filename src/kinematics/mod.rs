//! Kinematics module for fivebar-motion.
//!
//! Provides the pure-geometry solver for the planar five-bar linkage.

mod solver;

pub use solver::{CartesianPoint, JointAngles, LinkageSolver};
