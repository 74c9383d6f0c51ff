//! Arm orchestration.
//!
//! [`JointAxis`] bundles one joint's full control stack (encoder, trajectory
//! shaper, position controller, motor channel); [`ControlLoop`] owns both
//! axes plus the linkage solver and runs the fixed-rate state machine.

mod axis;
mod system;

pub use axis::JointAxis;
pub use system::{ArmState, ArmStatus, ControlLoop, JointStatus, TestHandle};
