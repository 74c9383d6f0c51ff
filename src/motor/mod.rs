//! Motor drive strategies and the per-joint command channel.
//!
//! Two velocity-mode drive families are supported behind the [`MotorDrive`]
//! trait: pulse-frequency drives (speed encoded as a clock frequency) and
//! inverted duty-cycle drives (speed encoded as PWM duty, full duty = stop).

mod channel;
mod duty;
mod frequency;

pub use channel::MotorChannel;
pub use duty::DutyCycleDrive;
pub use frequency::{FrequencyDrive, PulseTrain};

use crate::config::units::Rpm;
use crate::error::MotorError;

/// Direction of motor rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Clockwise (positive velocity command).
    Clockwise,
    /// Counter-clockwise (negative velocity command).
    CounterClockwise,
}

impl Direction {
    /// Get direction from a signed velocity.
    #[inline]
    pub fn from_velocity(rpm: f32) -> Self {
        if rpm >= 0.0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}

/// One joint's velocity-mode drive electronics.
///
/// Implementations clamp the command magnitude to their rated maximum
/// before converting it to the family's wire encoding. Pin and output
/// failures surface as [`MotorError`].
pub trait MotorDrive {
    /// Convert a signed velocity command to the drive's wire encoding.
    fn apply(&mut self, rpm: Rpm) -> Result<(), MotorError>;

    /// Assert or release the drive's enable encoding.
    ///
    /// Disabling must bring the commanded velocity to zero through the
    /// family's idle encoding; issuing a nonzero command on a disabled
    /// drive is a defect.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), MotorError>;

    /// Rated maximum speed commands are clamped to.
    fn max_rpm(&self) -> Rpm;
}
