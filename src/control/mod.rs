//! Per-joint trajectory shaping and closed-loop position control.

mod pid;
mod shaper;

pub use pid::PositionController;
pub use shaper::{Setpoint, TrajectoryShaper};
